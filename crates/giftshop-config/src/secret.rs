//! Admin password handling.
//!
//! The shared password is hashed once when configuration loads; requests are
//! checked against the stored PHC string, so the plaintext never lives in
//! application state.

use std::fmt;

use argon2::Argon2;
use argon2::password_hash::{
    PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
};

use crate::error::{ConfigError, ConfigResult};

/// Argon2 hash of the shared admin password.
#[derive(Clone)]
pub struct AdminSecret {
    hash: String,
}

impl AdminSecret {
    /// Hash a plaintext password with a fresh random salt.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::SecretHash`] when Argon2 rejects the input.
    pub fn from_plaintext(password: &str) -> ConfigResult<Self> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|detail| ConfigError::SecretHash { detail })?
            .to_string();
        Ok(Self { hash })
    }

    /// Check a candidate password. Empty candidates never match.
    #[must_use]
    pub fn verify(&self, candidate: &str) -> bool {
        if candidate.is_empty() {
            return false;
        }
        PasswordHash::new(&self.hash).is_ok_and(|parsed| {
            Argon2::default()
                .verify_password(candidate.as_bytes(), &parsed)
                .is_ok()
        })
    }
}

impl fmt::Debug for AdminSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AdminSecret(<redacted>)")
    }
}
