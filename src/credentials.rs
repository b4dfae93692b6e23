//! Password hashing and opaque token generation.
//!
//! Passwords are hashed with Argon2id. A fresh salt is drawn from the OS
//! random source before hashing and the resulting PHC string (algorithm,
//! parameters, salt and digest) is the only thing persisted.
//!
//! Session and update tokens are the hex-encoded SHA-256 digest of 64 bytes
//! read from the OS random source.

use argon2::{
    password_hash::{
        rand_core::OsRng as SaltRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
    },
    Argon2,
};
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::config::HashingConfig;
use crate::error::StoreResult;

const TOKEN_SEED_BYTES: usize = 64;

/// Hashes `password` with a newly generated salt. Returns a PHC-format string.
pub fn hash_password(password: &str, config: &HashingConfig) -> StoreResult<String> {
    let salt = SaltString::generate(&mut SaltRng);
    let digest = config.hasher()?.hash_password(password.as_bytes(), &salt)?;
    Ok(digest.to_string())
}

/// Checks `candidate` against a stored PHC digest.
///
/// A digest that cannot be parsed never verifies.
pub fn verify_password(candidate: &str, digest: &str) -> bool {
    let parsed = match PasswordHash::new(digest) {
        Ok(parsed) => parsed,
        Err(err) => {
            warn!(error = %err, "stored password digest is malformed");
            return false;
        }
    };
    Argon2::default()
        .verify_password(candidate.as_bytes(), &parsed)
        .is_ok()
}

/// Generates a new opaque token: 64 hex characters.
pub fn generate_token() -> String {
    let mut seed = [0u8; TOKEN_SEED_BYTES];
    OsRng.fill_bytes(&mut seed);
    hex::encode(Sha256::digest(seed))
}

/// Compares two tokens without short-circuiting on the first differing byte.
pub(crate) fn tokens_match(candidate: &str, stored: &str) -> bool {
    let (a, b) = (candidate.as_bytes(), stored.as_bytes());
    if a.len() != b.len() || b.is_empty() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
