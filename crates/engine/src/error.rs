//! The module contains the error the engine can throw.
//!
//! The errors fall in a few families:
//!
//! - [`KeyNotFound`] thrown when an id does not resolve to a stored row.
//! - [`Forbidden`] thrown when the row exists but belongs to someone else.
//! - [`ExistingKey`] thrown when a unique key (budget period, email,
//!   category name) is already taken.
//! - the `Invalid*` variants, thrown for malformed input.
//! - [`Database`] wraps any storage failure; the surrounding DB transaction
//!   is rolled back before it reaches the caller.
//!
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`Forbidden`]: EngineError::Forbidden
//!  [`ExistingKey`]: EngineError::ExistingKey
//!  [`Database`]: EngineError::Database
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("Access denied: {0}")]
    Forbidden(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid transaction type: {0}")]
    InvalidKind(String),
    #[error("Invalid month: {0}")]
    InvalidMonth(String),
    #[error("Invalid name: {0}")]
    InvalidName(String),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Invalid currency: {0}")]
    InvalidCurrency(String),
    #[error("Invalid id: {0}")]
    InvalidId(String),
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl EngineError {
    /// Returns `true` for errors caused by malformed caller input.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidAmount(_)
                | Self::InvalidKind(_)
                | Self::InvalidMonth(_)
                | Self::InvalidName(_)
                | Self::InvalidDate(_)
                | Self::InvalidCurrency(_)
                | Self::InvalidId(_)
        )
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::Forbidden(a), Self::Forbidden(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidKind(a), Self::InvalidKind(b)) => a == b,
            (Self::InvalidMonth(a), Self::InvalidMonth(b)) => a == b,
            (Self::InvalidName(a), Self::InvalidName(b)) => a == b,
            (Self::InvalidDate(a), Self::InvalidDate(b)) => a == b,
            (Self::InvalidCurrency(a), Self::InvalidCurrency(b)) => a == b,
            (Self::InvalidId(a), Self::InvalidId(b)) => a == b,
            (Self::InvalidCredentials(a), Self::InvalidCredentials(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
