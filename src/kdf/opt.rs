use core::num::NonZeroU8;

use super::{Kdf, precheck};
use crate::{cost::CostParams, error::KdfError};

/// scrypt from the `scrypt-opt` crate.
///
/// Only r in 1..=16, 32 and 64 is supported, other values fail with
/// [`KdfError::Backend`].
#[derive(Debug, Default, Clone, Copy)]
pub struct ScryptOpt;

impl Kdf for ScryptOpt {
    fn derive(
        &self,
        password: &[u8],
        salt: &[u8],
        cost: &CostParams,
        key_len: usize,
    ) -> Result<Vec<u8>, KdfError> {
        let log_n = NonZeroU8::new(precheck(cost, key_len)?).ok_or(KdfError::InvalidN(cost.n))?;
        let mut output = vec![0u8; key_len];
        if !scrypt_opt::compat::scrypt(password, salt, log_n, cost.r, cost.p, &mut output) {
            return Err(KdfError::Backend("unsupported r value"));
        }
        Ok(output)
    }
}
