//! The module contains the errors the engine can throw.

use thiserror::Error;

use crate::backend::BackendError;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid date range: {0}")]
    InvalidDateRange(String),
    #[error("Missing field: {0}")]
    MissingField(String),
    #[error("Unknown kind: {0}")]
    UnknownKind(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("No active session")]
    NoSession,
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidDateRange(a), Self::InvalidDateRange(b)) => a == b,
            (Self::MissingField(a), Self::MissingField(b)) => a == b,
            (Self::UnknownKind(a), Self::UnknownKind(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::NoSession, Self::NoSession) => true,
            (Self::Backend(a), Self::Backend(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
