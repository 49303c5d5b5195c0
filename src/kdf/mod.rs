//! The scrypt primitive behind a trait.
//!
//! Everything above this module treats scrypt as an opaque, deterministic
//! function of `(password, salt, N, r, p, key_len)`. Two backends are
//! provided:
//!
//! - [`RustCrypto`]: the pure Rust `scrypt` crate (default)
//! - [`ScryptOpt`]: the SIMD `scrypt-opt` crate (feature `opt`)

use crate::{cost::CostParams, error::KdfError};

mod rustcrypto;
pub use rustcrypto::RustCrypto;

#[cfg(feature = "opt")]
mod opt;
#[cfg(feature = "opt")]
pub use opt::ScryptOpt;

cfg_if::cfg_if! {
    if #[cfg(feature = "opt")] {
        /// The backend used when none is chosen explicitly
        pub type DefaultKdf = ScryptOpt;
    } else {
        /// The backend used when none is chosen explicitly
        pub type DefaultKdf = RustCrypto;
    }
}

/// Longest output scrypt can produce: (2^32 - 1) * 32 bytes.
pub const MAX_OUTPUT_LEN: u64 = (u32::MAX as u64) * 32;

/// A scrypt implementation.
pub trait Kdf {
    /// Derive `key_len` bytes from `password` and `salt`.
    ///
    /// Must be deterministic and must refuse parameters scrypt does not
    /// define (see [`CostParams::validate`]).
    fn derive(
        &self,
        password: &[u8],
        salt: &[u8],
        cost: &CostParams,
        key_len: usize,
    ) -> Result<Vec<u8>, KdfError>;
}

impl<K: Kdf + ?Sized> Kdf for &K {
    fn derive(
        &self,
        password: &[u8],
        salt: &[u8],
        cost: &CostParams,
        key_len: usize,
    ) -> Result<Vec<u8>, KdfError> {
        (**self).derive(password, salt, cost, key_len)
    }
}

impl<K: Kdf + ?Sized> Kdf for Box<K> {
    fn derive(
        &self,
        password: &[u8],
        salt: &[u8],
        cost: &CostParams,
        key_len: usize,
    ) -> Result<Vec<u8>, KdfError> {
        (**self).derive(password, salt, cost, key_len)
    }
}

/// Checks shared by all backends, returns log2(N).
pub(crate) fn precheck(cost: &CostParams, key_len: usize) -> Result<u8, KdfError> {
    cost.validate()?;
    if key_len == 0 || key_len as u64 > MAX_OUTPUT_LEN {
        return Err(KdfError::InvalidOutputLen(key_len));
    }
    cost.log2_n().ok_or(KdfError::InvalidN(cost.n))
}
