use crate::{
    calibrate::calibrate_with,
    config::{self, CalibrationBudget, HashOptions, clamp_key_len},
    cost::CostParams,
    error::Error,
    hash::{PasswordHash, derive_digest},
    kdf::{DefaultKdf, Kdf},
    memory,
    salt::Salt,
    secret::Secret,
    verify,
};

/// Hashing and verification over a chosen scrypt backend.
///
/// The free functions of this crate use `Hasher<DefaultKdf>`.
#[derive(Debug, Default, Clone)]
pub struct Hasher<K = DefaultKdf> {
    kdf: K,
}

impl Hasher<DefaultKdf> {
    /// A hasher over the default backend
    pub fn new() -> Self {
        Self::default()
    }
}

impl<K: Kdf> Hasher<K> {
    /// A hasher over `kdf`
    pub const fn with_kdf(kdf: K) -> Self {
        Self { kdf }
    }

    /// The backend
    pub fn kdf(&self) -> &K {
        &self.kdf
    }

    /// Calibrate a cost for this host with this backend.
    pub fn calibrate(&self, budget: &CalibrationBudget) -> Result<CostParams, Error> {
        Ok(calibrate_with(&self.kdf, budget, memory::free_memory())?)
    }

    /// Calibrate and make the result the process-wide default cost.
    pub fn calibrate_default_cost(&self, budget: &CalibrationBudget) -> Result<CostParams, Error> {
        let cost = self.calibrate(budget)?;
        config::set_default_cost(Some(cost));
        Ok(cost)
    }

    /// Explicit cost, else the process default, else calibrate.
    ///
    /// A calibration against the default budget becomes the process default.
    fn resolve_cost(&self, options: &HashOptions) -> Result<CostParams, Error> {
        if let Some(cost) = options.cost {
            return Ok(cost);
        }
        if let Some(cost) = config::default_cost() {
            return Ok(cost);
        }
        let cost = self.calibrate(&options.budget)?;
        if options.budget == CalibrationBudget::DEFAULT {
            return Ok(config::init_default_cost(cost));
        }
        Ok(cost)
    }

    /// A fresh random salt under the cost `options` resolve to.
    pub fn generate_salt(&self, options: &HashOptions) -> Result<Salt, Error> {
        let cost = self.resolve_cost(options)?;
        Ok(Salt::generate(cost, options.salt_size))
    }

    /// Hash `password` under an existing salt string.
    ///
    /// Fails with [`Error::InvalidSalt`] before looking at the password.
    pub fn hash_secret<P: Secret + ?Sized>(
        &self,
        password: &P,
        salt: &str,
        key_len: usize,
    ) -> Result<PasswordHash, Error> {
        let salt: Salt = salt.parse()?;
        self.create_hash(password, &salt, key_len)
    }

    /// Hash `password` under `salt`.
    pub fn create_hash<P: Secret + ?Sized>(
        &self,
        password: &P,
        salt: &Salt,
        key_len: usize,
    ) -> Result<PasswordHash, Error> {
        let password = password.secret_bytes()?;
        let digest = derive_digest(&self.kdf, password, salt, clamp_key_len(key_len))?;
        Ok(PasswordHash::from_parts(salt.clone(), digest))
    }

    /// Hash `password` with a new salt.
    pub fn hash_password<P: Secret + ?Sized>(
        &self,
        password: &P,
        options: &HashOptions,
    ) -> Result<PasswordHash, Error> {
        // reject the secret before spending time on calibration
        password.secret_bytes()?;
        let salt = self.generate_salt(options)?;
        self.create_hash(password, &salt, options.key_len)
    }

    /// Check `password` against `hash`.
    ///
    /// Allocates what `hash`'s cost asks for, see [`verify::verify`].
    pub fn verify<P: Secret + ?Sized>(
        &self,
        password: &P,
        hash: &PasswordHash,
    ) -> Result<bool, Error> {
        verify::verify(&self.kdf, password, hash)
    }
}
