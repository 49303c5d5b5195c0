use super::{Kdf, precheck};
use crate::{cost::CostParams, error::KdfError};

// scrypt::Params carries an output length for its PHC string API, which
// scrypt::scrypt ignores. It still has to be within 10..=64.
const PARAMS_LEN: usize = 32;

/// scrypt from the RustCrypto `scrypt` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct RustCrypto;

impl Kdf for RustCrypto {
    fn derive(
        &self,
        password: &[u8],
        salt: &[u8],
        cost: &CostParams,
        key_len: usize,
    ) -> Result<Vec<u8>, KdfError> {
        let log_n = precheck(cost, key_len)?;
        let params = scrypt::Params::new(log_n, cost.r, cost.p, PARAMS_LEN)
            .map_err(|_| KdfError::Backend("scrypt crate rejected N, r, p"))?;
        let mut output = vec![0u8; key_len];
        scrypt::scrypt(password, salt, &params, &mut output)
            .map_err(|_| KdfError::InvalidOutputLen(key_len))?;
        Ok(output)
    }
}
