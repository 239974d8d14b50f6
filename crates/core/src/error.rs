//! Domain error model.

use thiserror::Error;

/// Result type used across the pure layers of the shell.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic failures such as validation and
/// malformed ids. Provider and runtime failures have their own error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier was invalid.
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    /// Human-readable message without the category prefix.
    ///
    /// Forms show this text next to the offending field.
    pub fn message(&self) -> &str {
        match self {
            Self::Validation(m) | Self::InvalidId(m) => m,
        }
    }
}
