//! Engine error types.

use crate::store::{StoreError, ValidationError};

/// Errors surfaced by engine operations.
///
/// A message with no matching entry is not an error; it gets a fallback reply.
#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    /// Question or answer was empty.
    #[error(transparent)]
    Validation(ValidationError),

    /// The backing store failed.
    #[error("Knowledge store unavailable: {0}")]
    Store(#[source] StoreError),
}

impl EngineError {
    /// Whether the caller sent bad input, as opposed to a storage failure.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<ValidationError> for EngineError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err)
    }
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Validation(v) => Self::Validation(v),
            other => Self::Store(other),
        }
    }
}
