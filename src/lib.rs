#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Error types
pub mod error;

/// The (N, r, p) cost triple
pub mod cost;

/// Memory utilities
pub mod memory;

/// scrypt backends
pub mod kdf;

pub mod calibrate;

pub mod config;

/// Password input
pub mod secret;

pub mod salt;

pub mod hash;

/// Constant time comparison and verification
pub mod verify;

mod hasher;


pub use config::{CalibrationBudget, HashOptions, default_cost, set_default_cost};
pub use cost::CostParams;
pub use error::{Error, KdfError, Result};
pub use hash::{PasswordHash, parse_hash};
pub use hasher::Hasher;
pub use kdf::{DefaultKdf, Kdf, RustCrypto};
pub use salt::{Format, Salt, parse_salt};
pub use secret::Secret;
pub use verify::secure_compare;

#[cfg(feature = "opt")]
pub use kdf::ScryptOpt;

/// Hash `password` with a fresh salt using the default backend.
///
/// Without an explicit cost in `options` the process default cost is used,
/// calibrating it on first use.
pub fn hash_password<P: Secret + ?Sized>(password: &P, options: &HashOptions) -> Result<PasswordHash> {
    Hasher::new().hash_password(password, options)
}

/// Check `password` against a stored `N$r$p$saltHex$digestHex` string.
///
/// A malformed hash is [`Error::InvalidHash`]. A mismatch is `Ok(false)`.
///
/// The hash's own cost decides the memory scrypt allocates, and a
/// well-formed cost can ask for more than the host has. `hash` must come
/// from a trusted store.
pub fn verify_password<P: Secret + ?Sized>(password: &P, hash: &str) -> Result<bool> {
    let hash: PasswordHash = hash.parse()?;
    Hasher::new().verify(password, &hash)
}

/// Calibrate a cost for this host without touching the process default.
pub fn calibrate(budget: &CalibrationBudget) -> Result<CostParams> {
    Hasher::new().calibrate(budget)
}

/// Calibrate and store the result as the process default cost.
pub fn calibrate_default_cost(budget: &CalibrationBudget) -> Result<CostParams> {
    Hasher::new().calibrate_default_cost(budget)
}
