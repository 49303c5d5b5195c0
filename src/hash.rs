//! The stored `N$r$p$saltHex$digestHex` string and digest derivation.

use core::{fmt, str::FromStr};

use sha1::{Digest, Sha1};

use crate::{
    config::clamp_key_len,
    cost::CostParams,
    error::Error,
    kdf::Kdf,
    salt::{Format, Salt},
};

/// scrypt output length of the legacy format before SHA-1
pub const LEGACY_KDF_LEN: usize = 256;
/// Shortest accepted digest hex
pub const MIN_DIGEST_HEX_LEN: usize = 32;
/// Longest accepted digest hex
pub const MAX_DIGEST_HEX_LEN: usize = 1024;

/// A parsed password hash.
///
/// Displays back exactly as it was parsed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PasswordHash {
    salt: Salt,
    digest: String,
}

impl PasswordHash {
    pub(crate) fn from_parts(salt: Salt, digest: String) -> Self {
        Self { salt, digest }
    }

    /// The cost triple
    pub fn cost(&self) -> CostParams {
        self.salt.cost()
    }

    /// The `N$r$p$saltHex` part
    pub fn salt(&self) -> &Salt {
        &self.salt
    }

    /// The salt hex segment
    pub fn salt_hex(&self) -> &str {
        self.salt.salt_hex()
    }

    /// The digest hex segment
    pub fn digest_hex(&self) -> &str {
        &self.digest
    }

    /// Legacy or current
    pub fn format(&self) -> Format {
        self.salt.format()
    }

    /// Key length a re-derivation has to use
    pub fn key_len(&self) -> usize {
        self.digest.len() / 2
    }

    /// Check `password` against this hash with the default backend.
    ///
    /// Allocates what the stored cost asks for, see [`crate::verify::verify`].
    pub fn is_password<P: crate::Secret + ?Sized>(&self, password: &P) -> Result<bool, Error> {
        crate::verify::verify(&crate::kdf::DefaultKdf::default(), password, self)
    }
}

/// `[A-Za-z0-9]{32,1024}`
pub(crate) fn is_digest_hex(s: &str) -> bool {
    (MIN_DIGEST_HEX_LEN..=MAX_DIGEST_HEX_LEN).contains(&s.len())
        && s.bytes().all(|b| b.is_ascii_alphanumeric())
}

/// Derive the digest hex for `password` under `salt`.
///
/// Legacy salts run scrypt over the whole salt string for 256 bytes and hash
/// that with SHA-1, ignoring `key_len`. Current salts run scrypt over the
/// decoded salt for `key_len` (clamped to 16..=512) bytes.
pub(crate) fn derive_digest<K: Kdf + ?Sized>(
    kdf: &K,
    password: &[u8],
    salt: &Salt,
    key_len: usize,
) -> Result<String, Error> {
    let cost = salt.cost();
    match salt.format() {
        Format::Legacy => {
            log::trace!("deriving legacy digest for {}", salt.cost_str());
            let raw = kdf.derive(password, &salt.kdf_salt(), &cost, LEGACY_KDF_LEN)?;
            Ok(hex::encode(Sha1::digest(&raw)))
        }
        Format::Current => {
            let key_len = clamp_key_len(key_len);
            log::trace!("deriving {key_len} byte digest for {}", salt.cost_str());
            let raw = kdf.derive(password, &salt.kdf_salt(), &cost, key_len)?;
            let digest = hex::encode(raw);
            Ok(format!("{digest:0>width$}", width = key_len * 2))
        }
    }
}

impl fmt::Display for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}${}", self.salt, self.digest)
    }
}

impl FromStr for PasswordHash {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut segments = s.split('$');
        let (Some(n), Some(r), Some(p), Some(salt_hex), Some(digest), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(Error::InvalidHash);
        };

        if !is_digest_hex(digest) {
            return Err(Error::InvalidHash);
        }
        let salt = Salt::from_segments(n, r, p, salt_hex).ok_or(Error::InvalidHash)?;
        Ok(Self::from_parts(salt, digest.to_owned()))
    }
}

/// Parse a `N$r$p$saltHex$digestHex` string.
pub fn parse_hash(s: &str) -> Result<PasswordHash, Error> {
    s.parse()
}
