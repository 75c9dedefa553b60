use crate::types::DbId;

/// Domain error taxonomy shared by every crate in the workspace.
///
/// The split between [`Validation`](CoreError::Validation),
/// [`InvalidState`](CoreError::InvalidState) and
/// [`Conflict`](CoreError::Conflict) matters for callers: validation errors
/// mean the request itself was bad, invalid-state errors mean the operation
/// is not legal for the session right now, and conflicts are retryable after
/// re-reading state.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// An invitation token that does not resolve to any invitation.
    /// Deliberately carries no detail: token lookups must not leak whether
    /// a near-miss token exists.
    #[error("Invitation not found")]
    TokenNotFound,

    #[error("Invitation expired: {0}")]
    Expired(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    /// The operation is not permitted in the session's current state
    /// (completed run, step index out of range, attempts exhausted).
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Lost-update guard tripped; the caller should re-read and resubmit.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
