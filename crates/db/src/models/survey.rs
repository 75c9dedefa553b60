//! Survey template model and DTOs.

use photoproof_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A survey row from the `surveys` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Survey {
    pub id: DbId,
    pub owner_id: DbId,
    pub title: String,
    pub description: String,
    pub company: String,
    pub is_active: bool,
    #[serde(skip_serializing)]
    pub is_deleted: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new survey.
#[derive(Debug)]
pub struct CreateSurvey {
    pub owner_id: DbId,
    pub title: String,
    pub description: String,
    pub company: String,
}

/// DTO for updating a survey. All fields are optional.
#[derive(Debug, Deserialize)]
pub struct UpdateSurvey {
    pub title: Option<String>,
    pub description: Option<String>,
    pub company: Option<String>,
    pub is_active: Option<bool>,
}
