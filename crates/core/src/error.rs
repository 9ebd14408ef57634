//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic failures of domain primitives
/// (malformed identifiers, impossible dates). Catalog validation and storage
/// failures have their own error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// An identifier was invalid (e.g. empty gid, parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A YYYYMMDD integer did not name a real calendar day.
    #[error("invalid calendar date: {0}")]
    InvalidDate(u32),
}

impl DomainError {
    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }
}
