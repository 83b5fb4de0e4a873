//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Every validation/business failure an operation can surface maps onto one
/// of these variants; the HTTP layer translates them to status codes and a
/// structured `{severity, summary, detail}` body. Storage failures are folded
/// into `Internal` at the orchestration boundary so raw driver errors never
/// leak to callers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Malformed input: unknown enum value, empty item list, bad id.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A referenced entity does not exist (order, user, address, product).
    #[error("not found: {0}")]
    NotFound(String),

    /// The caller is not allowed to act on this entity.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The operation conflicts with existing state (e.g. duplicate open order).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The entity is in a state that does not permit the operation
    /// (terminal order, expired edit window).
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Persistence or collaborator failure; details are logged, not exposed.
    #[error("internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
