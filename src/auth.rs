//! Password hashing.
//!
//! Credentials are Argon2id PHC strings with a per-user random salt. They
//! live in their own collection so user records never carry hash material.

use crate::error::{AuthError, AuthResult};
use crate::types::UserId;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Stored credential for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    pub user_id: UserId,
    /// Argon2id PHC string.
    pub password_hash: String,
}

impl Credential {
    /// Hash `password` for `user_id` with a fresh salt.
    pub fn new(user_id: UserId, password: &str) -> AuthResult<Self> {
        Ok(Self {
            user_id,
            password_hash: hash_password(password)?,
        })
    }

    /// Check `password` against this credential.
    pub fn verify(&self, password: &str) -> AuthResult<bool> {
        verify_password(password, &self.password_hash)
    }
}

/// Hash a password into a PHC string.
pub fn hash_password(password: &str) -> AuthResult<String> {
    let mut salt = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut salt);
    let salt = SaltString::encode_b64(&salt).map_err(|e| AuthError::HashFailed(e.to_string()))?;

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::HashFailed(e.to_string()))
}

/// Verify a password against a PHC string.
///
/// A mismatch is `Ok(false)`; only a malformed hash is an error.
pub fn verify_password(password: &str, phc: &str) -> AuthResult<bool> {
    let parsed = PasswordHash::new(phc).map_err(|e| AuthError::MalformedHash(e.to_string()))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AuthError::MalformedHash(e.to_string())),
    }
}
