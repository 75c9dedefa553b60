//! Survey session model: one user's live run of an invitation.

use photoproof_core::session::SessionView;
use photoproof_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;

use crate::models::step::StepSnapshot;

/// A session row from the `survey_sessions` table.
///
/// `version` is the optimistic-lock counter: every mutation is a
/// compare-and-swap against it, so two concurrent submissions can never
/// both reserve the same attempt slot.
#[derive(Debug, Clone, FromRow)]
pub struct SurveySession {
    pub id: DbId,
    pub invitation_id: DbId,
    pub survey_id: DbId,
    pub current_step_index: i32,
    pub attempt_count: i32,
    pub steps_snapshot: Json<Vec<StepSnapshot>>,
    pub is_completed: bool,
    pub completed_at: Option<Timestamp>,
    pub version: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl SurveySession {
    /// Project the fields the core transition policy needs.
    pub fn view(&self) -> SessionView {
        SessionView {
            current_step_index: self.current_step_index,
            attempt_count: self.attempt_count,
            total_steps: self.steps_snapshot.0.len() as i32,
            is_completed: self.is_completed,
        }
    }

    /// The snapshot step at the session's current position, if in range.
    pub fn current_step(&self) -> Option<&StepSnapshot> {
        usize::try_from(self.current_step_index)
            .ok()
            .and_then(|i| self.steps_snapshot.0.get(i))
    }
}

/// DTO for creating a new session at step 0, attempt 0.
#[derive(Debug)]
pub struct CreateSurveySession {
    pub invitation_id: DbId,
    pub survey_id: DbId,
    pub steps_snapshot: Vec<StepSnapshot>,
}

/// Progress summary returned by the read-only progress endpoint.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SessionProgress {
    pub session_id: DbId,
    pub current_step_index: i32,
    pub attempt_count: i32,
    pub total_steps: i32,
    pub is_completed: bool,
}

impl From<&SurveySession> for SessionProgress {
    fn from(session: &SurveySession) -> Self {
        Self {
            session_id: session.id,
            current_step_index: session.current_step_index,
            attempt_count: session.attempt_count,
            total_steps: session.steps_snapshot.0.len() as i32,
            is_completed: session.is_completed,
        }
    }
}
