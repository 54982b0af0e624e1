//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic failures (payload shape, invariants,
/// missing entities). Storage failures belong to the infra layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A payload failed schema validation (missing field, wrong JSON type).
    ///
    /// The message is shown to API callers as-is.
    #[error("{0}")]
    Validation(String),

    /// A cross-field rule was violated (e.g. repeated question ids).
    #[error("{0}")]
    InvariantViolation(String),

    /// A keyed lookup found nothing. Carries the entity name.
    #[error("{0} not found")]
    NotFound(&'static str),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn not_found(entity: &'static str) -> Self {
        Self::NotFound(entity)
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        Self::Validation(err.to_string())
    }
}
