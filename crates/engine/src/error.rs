//! The module contains the error the engine can throw.
//!
//! The pure balance/settlement functions never fail; every variant here comes
//! from entity validation or from the record store.
//!
//! - [`InvalidName`] thrown when a user/activity name or an expense
//!   description is too short.
//! - [`KeyNotFound`] thrown when an item is not found.
//! - [`UserHasExpenses`] thrown when deleting a user still referenced by
//!   expenses.
//!
//!  [`InvalidName`]: EngineError::InvalidName
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`UserHasExpenses`]: EngineError::UserHasExpenses
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid name: {0}")]
    InvalidName(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid participants: {0}")]
    InvalidParticipants(String),
    #[error("Invalid id: {0}")]
    InvalidId(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Cannot delete {name}: {count} expense(s) still reference them")]
    UserHasExpenses { name: String, count: usize },
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidName(a), Self::InvalidName(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidParticipants(a), Self::InvalidParticipants(b)) => a == b,
            (Self::InvalidId(a), Self::InvalidId(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (
                Self::UserHasExpenses { name: a, count: x },
                Self::UserHasExpenses { name: b, count: y },
            ) => a == b && x == y,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
