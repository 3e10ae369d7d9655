use std::{fmt, sync::Arc};

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use rand::rngs::OsRng;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("Invalid password hashing parameters: {0}")]
    InvalidParams(String),
    #[error("Failed to hash password: {0}")]
    Hashing(String),
}

/// Turns a password into an opaque digest and checks candidates against it.
/// Only the boolean match result leaves this boundary.
pub trait SecretHasher {
    fn hash(&self, secret: &str) -> Result<String, CredentialError>;

    fn verify(&self, secret: &str, digest: &str) -> bool;
}

/// Argon2id with a fresh random salt per digest, stored as a PHC string.
pub struct Argon2Hasher {
    argon2: Argon2<'static>,
}

impl Argon2Hasher {
    pub fn with_params(memory_kib: u32, iterations: u32) -> Result<Self, CredentialError> {
        let params = Params::new(memory_kib, iterations, 1, None)
            .map_err(|err| CredentialError::InvalidParams(err.to_string()))?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }
}

impl SecretHasher for Argon2Hasher {
    fn hash(&self, secret: &str) -> Result<String, CredentialError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(secret.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|err| CredentialError::Hashing(err.to_string()))
    }

    fn verify(&self, secret: &str, digest: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(digest) else {
            return false;
        };
        self.argon2
            .verify_password(secret.as_bytes(), &parsed)
            .is_ok()
    }
}

/// A stored password digest together with the hasher able to check it.
#[derive(Clone)]
pub struct Credential {
    digest: String,
    hasher: Arc<dyn SecretHasher>,
}

impl Credential {
    pub fn new(secret: &str, hasher: Arc<dyn SecretHasher>) -> Result<Self, CredentialError> {
        Ok(Self {
            digest: hasher.hash(secret)?,
            hasher,
        })
    }

    pub fn matches(&self, candidate: &str) -> bool {
        self.hasher.verify(candidate, &self.digest)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}
