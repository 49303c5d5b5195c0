use thiserror::Error;

/// Errors returned by hashing, parsing and verification.
#[derive(Debug, Error)]
pub enum Error {
    /// The stored hash does not match `N$r$p$salt$digest`.
    #[error("invalid hash")]
    InvalidHash,
    /// The salt string does not match `N$r$p$salt`.
    #[error("invalid salt")]
    InvalidSalt,
    /// The cost string does not match `N$r$p$`.
    #[error("invalid cost")]
    InvalidCost,
    /// The password could not be turned into bytes.
    #[error("invalid secret")]
    InvalidSecret,
    /// The key derivation function refused to run.
    #[error("scrypt failed: {0}")]
    Kdf(#[from] KdfError),
}

/// Failures of a [`Kdf`](crate::kdf::Kdf) backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KdfError {
    /// N must be a power of two greater than one.
    #[error("N={0} is not a power of two greater than 1")]
    InvalidN(u64),
    /// r and p must be non-zero.
    #[error("r and p must be non-zero (r={r}, p={p})")]
    ZeroParameter {
        /// block size
        r: u32,
        /// parallelization
        p: u32,
    },
    /// log2(N) must be less than 16 * r.
    #[error("N={n} is too large for r={r}, log2(N) must be less than 16 * r")]
    CostTooLarge {
        /// cost factor
        n: u64,
        /// block size
        r: u32,
    },
    /// r * p must stay below 2^30.
    #[error("r * p must be less than 2^30 (r={r}, p={p})")]
    ParallelismTooLarge {
        /// block size
        r: u32,
        /// parallelization
        p: u32,
    },
    /// 128 * N * r does not fit in the address space.
    #[error("memory required by N={n}, r={r} exceeds platform limits")]
    MemoryLimit {
        /// cost factor
        n: u64,
        /// block size
        r: u32,
    },
    /// The requested key length is zero or too long for scrypt.
    #[error("invalid output length {0}")]
    InvalidOutputLen(usize),
    /// The backend rejected the parameters.
    #[error("backend rejected parameters: {0}")]
    Backend(&'static str),
}

/// Result alias for this crate.
pub type Result<T, E = Error> = core::result::Result<T, E>;
