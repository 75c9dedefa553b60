//! Invitation model and DTOs.

use photoproof_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// An invitation row from the `invitations` table.
///
/// The token is a capability: anyone holding it may run the survey, so it
/// is only ever serialized in responses to the admin who created it.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Invitation {
    pub id: DbId,
    pub survey_id: DbId,
    pub token: String,
    pub email: String,
    pub is_completed: bool,
    pub completed_at: Option<Timestamp>,
    pub expires_at: Timestamp,
    pub created_at: Timestamp,
}

/// DTO for creating a new invitation. Token and expiry are generated by the
/// caller from the core policy.
#[derive(Debug)]
pub struct CreateInvitation {
    pub survey_id: DbId,
    pub token: String,
    pub email: String,
    pub expires_at: Timestamp,
}
