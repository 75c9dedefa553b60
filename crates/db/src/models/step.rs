//! Step model, DTOs, and the per-session snapshot projection.

use photoproof_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

/// A step row from the `steps` table.
///
/// `step_order` is 1-based and unique within the survey; ascending order is
/// the only valid traversal sequence.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Step {
    pub id: DbId,
    pub survey_id: DbId,
    pub step_order: i32,
    pub title: String,
    pub description: String,
    pub expected_object: String,
    pub tips: Json<Vec<String>>,
    pub is_required: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new step.
#[derive(Debug)]
pub struct CreateStep {
    pub survey_id: DbId,
    pub step_order: i32,
    pub title: String,
    pub description: String,
    pub expected_object: String,
    pub tips: Vec<String>,
    pub is_required: bool,
}

/// DTO for updating a step. All fields are optional; `step_order` is fixed
/// after creation so reordering cannot invalidate in-flight runs.
#[derive(Debug, Deserialize)]
pub struct UpdateStep {
    pub title: Option<String>,
    pub description: Option<String>,
    pub expected_object: Option<String>,
    pub tips: Option<Vec<String>>,
    pub is_required: Option<bool>,
}

/// The immutable projection of a step stored on a session at start().
///
/// Sessions read their steps from this snapshot, never from the live
/// `steps` table, so a survey edit mid-run cannot change the meaning of a
/// step the user already photographed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StepSnapshot {
    pub step_id: DbId,
    pub step_order: i32,
    pub title: String,
    pub description: String,
    pub expected_object: String,
    pub tips: Vec<String>,
    pub is_required: bool,
}

impl From<&Step> for StepSnapshot {
    fn from(step: &Step) -> Self {
        Self {
            step_id: step.id,
            step_order: step.step_order,
            title: step.title.clone(),
            description: step.description.clone(),
            expected_object: step.expected_object.clone(),
            tips: step.tips.0.clone(),
            is_required: step.is_required,
        }
    }
}
