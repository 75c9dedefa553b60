//! Attempt ledger models.

use photoproof_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;

/// A full attempt row, including the stored image bytes.
#[derive(Debug, Clone, FromRow)]
pub struct Attempt {
    pub id: DbId,
    pub session_id: DbId,
    pub step_id: DbId,
    pub attempt_number: i32,
    pub image_data: Vec<u8>,
    /// Tri-state: `Some(true)` accepted, `Some(false)` rejected, `None`
    /// never judged.
    pub verification_result: Option<bool>,
    pub confidence: Option<f64>,
    pub detected_labels: Json<Vec<String>>,
    pub error_message: Option<String>,
    pub created_at: Timestamp,
}

/// Ledger view without the image payload, for audit listings.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AttemptSummary {
    pub id: DbId,
    pub session_id: DbId,
    pub step_id: DbId,
    pub attempt_number: i32,
    pub verification_result: Option<bool>,
    pub confidence: Option<f64>,
    pub detected_labels: Json<Vec<String>>,
    pub error_message: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for appending one ledger row.
#[derive(Debug)]
pub struct NewAttempt {
    pub session_id: DbId,
    pub step_id: DbId,
    pub attempt_number: i32,
    pub image_data: Vec<u8>,
    pub verification_result: Option<bool>,
    pub confidence: Option<f64>,
    pub detected_labels: Vec<String>,
    pub error_message: Option<String>,
}
