//! Argon2id password hashing.
//!
//! Hashes are PHC strings (`$argon2id$v=19$m=...`), so the parameters travel
//! with each digest and verification keeps working after the cost is tuned.

use anyhow::{Context, Result, anyhow};
use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordVerifier, Version,
    password_hash::{self, PasswordHasher as _, SaltString},
};
use rand::rngs::OsRng;
use secrecy::{ExposeSecret, SecretString};

#[derive(Clone, Debug)]
pub struct PasswordHasher {
    params: Params,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self {
            params: Params::default(),
        }
    }
}

impl PasswordHasher {
    /// Build a hasher with explicit Argon2 cost parameters.
    ///
    /// # Errors
    /// Returns an error if the parameters are outside the ranges Argon2 accepts.
    pub fn new(memory_kib: u32, iterations: u32, parallelism: u32) -> Result<Self> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| anyhow!("invalid argon2 parameters: {e}"))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash a plaintext password with a fresh random salt.
    ///
    /// # Errors
    /// Returns an error if hashing fails.
    pub fn hash(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow!("failed to hash password: {e}"))?;
        Ok(hash.to_string())
    }

    /// Check a plaintext password against a stored PHC string.
    ///
    /// # Errors
    /// Returns an error if the stored hash cannot be parsed; a mismatch is `Ok(false)`.
    pub fn verify(&self, password: &str, stored_hash: &str) -> Result<bool> {
        let parsed =
            PasswordHash::new(stored_hash).map_err(|e| anyhow!("malformed password hash: {e}"))?;
        match self.argon2().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(anyhow!("failed to verify password: {e}")),
        }
    }

    /// [`Self::hash`] on the blocking thread pool.
    ///
    /// # Errors
    /// Returns an error if hashing fails or the blocking task panics.
    pub async fn hash_blocking(&self, password: &SecretString) -> Result<String> {
        let hasher = self.clone();
        let password = SecretString::from(password.expose_secret());
        tokio::task::spawn_blocking(move || hasher.hash(password.expose_secret()))
            .await
            .context("password hashing task failed")?
    }

    /// [`Self::verify`] on the blocking thread pool.
    ///
    /// # Errors
    /// Returns an error if the stored hash is malformed or the blocking task panics.
    pub async fn verify_blocking(&self, password: &SecretString, stored_hash: &str) -> Result<bool> {
        let hasher = self.clone();
        let password = SecretString::from(password.expose_secret());
        let stored_hash = stored_hash.to_string();
        tokio::task::spawn_blocking(move || hasher.verify(password.expose_secret(), &stored_hash))
            .await
            .context("password verification task failed")?
    }
}
