use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use serde::{Serialize, Serializer};
use std::fmt;

/// Submitted password. Debug output is redacted.
#[derive(Clone)]
pub struct Password(String);

impl Password {
    pub fn new(password: impl Into<String>) -> Self {
        Self(password.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

/// Validation errors carry the offending value as a param; never the secret.
impl Serialize for Password {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str("***")
    }
}

/// Why a stored hash did not accept a password.
#[derive(Debug, PartialEq, Eq)]
pub enum VerifyError {
    /// Well-formed hash, wrong password.
    Mismatch,
    /// Stored value is not a PHC string.
    MalformedHash,
}

/// Hash with Argon2id and a random salt, producing a PHC string.
pub fn hash_password(password: &Password) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_str().as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))
}

/// Constant-time check of `password` against a stored PHC string.
pub fn verify_password(password: &Password, password_hash: &str) -> Result<(), VerifyError> {
    let parsed_hash = PasswordHash::new(password_hash).map_err(|_| VerifyError::MalformedHash)?;

    Argon2::default()
        .verify_password(password.as_str().as_bytes(), &parsed_hash)
        .map_err(|_| VerifyError::Mismatch)
}
