//! Error types shared by every repository in the crate.

use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// Result alias used throughout the crate.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced to the route layer.
///
/// Failed authentication is not an error: password and token checks return
/// `bool` or `Option`, since a wrong password is an expected outcome.
///
/// # Error Mapping
///
/// * Unique and foreign-key violations reported by the database → [`StoreError::Integrity`]
/// * Every other Sea-ORM error → [`StoreError::Db`]
#[derive(Debug, Error)]
pub enum StoreError {
    /// A required field was missing or blank.
    #[error("validation error: {0}")]
    Validation(String),

    /// No row with the given primary key.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i32 },

    /// A unique or foreign-key constraint rejected the write.
    #[error("integrity error: {0}")]
    Integrity(String),

    /// Password hashing failed or the hashing parameters are invalid.
    #[error("password hashing failed: {0}")]
    Hashing(String),

    /// Missing or malformed configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// A serialized view could not be produced.
    #[error("encode error: {0}")]
    Encode(#[from] serde_json::Error),

    #[error(transparent)]
    Db(DbErr),
}

impl StoreError {
    pub(crate) fn not_found(entity: &'static str, id: i32) -> Self {
        Self::NotFound { entity, id }
    }

    pub(crate) fn missing(field: &str) -> Self {
        Self::Validation(format!("`{field}` is required"))
    }
}

impl From<DbErr> for StoreError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(msg)) => Self::Integrity(msg),
            Some(SqlErr::ForeignKeyConstraintViolation(msg)) => Self::Integrity(msg),
            _ => Self::Db(err),
        }
    }
}

impl From<argon2::password_hash::Error> for StoreError {
    fn from(err: argon2::password_hash::Error) -> Self {
        Self::Hashing(err.to_string())
    }
}

impl From<argon2::Error> for StoreError {
    fn from(err: argon2::Error) -> Self {
        Self::Hashing(err.to_string())
    }
}

/// Rejects empty or whitespace-only required text fields.
pub(crate) fn require(field: &str, value: &str) -> StoreResult<()> {
    if value.trim().is_empty() {
        return Err(StoreError::missing(field));
    }
    Ok(())
}
