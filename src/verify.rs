use crate::{
    error::Error,
    hash::{PasswordHash, derive_digest},
    kdf::Kdf,
    secret::Secret,
};

/// Compare two byte strings in time independent of where they differ.
///
/// Lengths are not secret and are compared up front. Equal length inputs
/// are always walked to the end.
pub fn secure_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    accumulate_difference(a.iter().copied().zip(b.iter().copied())) == 0
}

/// OR of `x ^ y` over every pair, no early exit.
#[inline(never)]
pub(crate) fn accumulate_difference<I: IntoIterator<Item = (u8, u8)>>(pairs: I) -> u8 {
    let mut acc = 0u8;
    for (x, y) in pairs {
        acc |= x ^ y;
    }
    core::hint::black_box(acc)
}

/// Re-derive `hash`'s digest from `password` and compare.
///
/// The stored cost text and salt are reused as is, the key length comes from
/// the stored digest.
///
/// The stored cost is used as is, so N and r decide how much memory this
/// allocates. Only verify hashes from a trusted store.
pub fn verify<K: Kdf + ?Sized, P: Secret + ?Sized>(
    kdf: &K,
    password: &P,
    hash: &PasswordHash,
) -> Result<bool, Error> {
    let password = password.secret_bytes()?;
    let digest = derive_digest(kdf, password, hash.salt(), hash.key_len())?;
    Ok(secure_compare(
        digest.as_bytes(),
        hash.digest_hex().as_bytes(),
    ))
}
