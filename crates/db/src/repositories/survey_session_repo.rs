//! Repository for the `survey_sessions` table.
//!
//! Every mutation here is a guarded UPDATE: the attempt reservation is a
//! compare-and-swap on `version` (the lost-update guard for the attempt
//! counter), and the advance/complete transitions are guarded on the step
//! index that was judged so a stale verdict can never move a session twice.

use photoproof_core::types::DbId;
use sqlx::types::Json;
use sqlx::{PgConnection, PgPool};

use crate::models::survey_session::{CreateSurveySession, SurveySession};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, invitation_id, survey_id, current_step_index, attempt_count, \
                        steps_snapshot, is_completed, completed_at, version, created_at, updated_at";

/// Provides operations for survey sessions.
pub struct SurveySessionRepo;

impl SurveySessionRepo {
    /// Insert a new session at step 0, attempt 0, with the steps snapshot.
    ///
    /// The `uq_survey_sessions_invitation` constraint rejects a second
    /// session for the same invitation.
    pub async fn create(
        pool: &PgPool,
        input: &CreateSurveySession,
    ) -> Result<SurveySession, sqlx::Error> {
        let query = format!(
            "INSERT INTO survey_sessions (invitation_id, survey_id, steps_snapshot)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SurveySession>(&query)
            .bind(input.invitation_id)
            .bind(input.survey_id)
            .bind(Json(&input.steps_snapshot))
            .fetch_one(pool)
            .await
    }

    /// Find a session by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<SurveySession>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM survey_sessions WHERE id = $1");
        sqlx::query_as::<_, SurveySession>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find the session belonging to an invitation, if one exists.
    pub async fn find_by_invitation(
        pool: &PgPool,
        invitation_id: DbId,
    ) -> Result<Option<SurveySession>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM survey_sessions WHERE invitation_id = $1");
        sqlx::query_as::<_, SurveySession>(&query)
            .bind(invitation_id)
            .fetch_optional(pool)
            .await
    }

    /// Reserve the next attempt slot: increment `attempt_count` if and only
    /// if the session still has the version the caller read.
    ///
    /// Returns the updated row, or `None` when the compare-and-swap missed
    /// (a concurrent submission got there first) -- the caller maps that to
    /// a retryable conflict. Runs against the pool, before the verifier
    /// call, so no lock is held across the network round-trip.
    pub async fn reserve_attempt(
        pool: &PgPool,
        id: DbId,
        expected_version: i64,
    ) -> Result<Option<SurveySession>, sqlx::Error> {
        let query = format!(
            "UPDATE survey_sessions SET
                attempt_count = attempt_count + 1,
                version = version + 1,
                updated_at = NOW()
             WHERE id = $1 AND version = $2 AND is_completed = false
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SurveySession>(&query)
            .bind(id)
            .bind(expected_version)
            .fetch_optional(pool)
            .await
    }

    /// Advance past `judged_step_index`: step index +1, attempt counter
    /// reset to 0.
    ///
    /// Guarded on the judged index so the transition applies at most once.
    /// Returns `None` when the session already moved on.
    pub async fn advance_step(
        conn: &mut PgConnection,
        id: DbId,
        judged_step_index: i32,
    ) -> Result<Option<SurveySession>, sqlx::Error> {
        let query = format!(
            "UPDATE survey_sessions SET
                current_step_index = current_step_index + 1,
                attempt_count = 0,
                version = version + 1,
                updated_at = NOW()
             WHERE id = $1 AND current_step_index = $2 AND is_completed = false
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SurveySession>(&query)
            .bind(id)
            .bind(judged_step_index)
            .fetch_optional(conn)
            .await
    }

    /// Complete the session after its final step passed (or was overridden).
    ///
    /// Same at-most-once guard as [`advance_step`](Self::advance_step).
    pub async fn complete(
        conn: &mut PgConnection,
        id: DbId,
        judged_step_index: i32,
    ) -> Result<Option<SurveySession>, sqlx::Error> {
        let query = format!(
            "UPDATE survey_sessions SET
                current_step_index = current_step_index + 1,
                attempt_count = 0,
                is_completed = true,
                completed_at = NOW(),
                version = version + 1,
                updated_at = NOW()
             WHERE id = $1 AND current_step_index = $2 AND is_completed = false
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SurveySession>(&query)
            .bind(id)
            .bind(judged_step_index)
            .fetch_optional(conn)
            .await
    }
}
