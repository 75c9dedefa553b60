//! Repository for the `attempts` ledger.
//!
//! Append-only by contract: this module exposes insert and query, nothing
//! else. Corrections are new rows, never mutations, so the ledger remains
//! an honest audit trail of every submission including failed and
//! overridden ones.

use photoproof_core::types::DbId;
use sqlx::types::Json;
use sqlx::{PgConnection, PgPool};

use crate::models::attempt::{AttemptSummary, NewAttempt};

/// Ledger columns without the image payload.
const SUMMARY_COLUMNS: &str = "id, session_id, step_id, attempt_number, verification_result, \
                                confidence, detected_labels, error_message, created_at";

/// Provides append and query operations for the attempt ledger.
pub struct AttemptRepo;

impl AttemptRepo {
    /// Append one ledger row. Participates in the verdict transaction so a
    /// submission produces exactly one row or none at all.
    pub async fn record(
        conn: &mut PgConnection,
        input: &NewAttempt,
    ) -> Result<AttemptSummary, sqlx::Error> {
        let query = format!(
            "INSERT INTO attempts (session_id, step_id, attempt_number, image_data,
                                   verification_result, confidence, detected_labels, error_message)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {SUMMARY_COLUMNS}"
        );
        sqlx::query_as::<_, AttemptSummary>(&query)
            .bind(input.session_id)
            .bind(input.step_id)
            .bind(input.attempt_number)
            .bind(&input.image_data)
            .bind(input.verification_result)
            .bind(input.confidence)
            .bind(Json(&input.detected_labels))
            .bind(&input.error_message)
            .fetch_one(conn)
            .await
    }

    /// List a session's ledger in creation order, optionally narrowed to
    /// one step.
    pub async fn query(
        pool: &PgPool,
        session_id: DbId,
        step_id: Option<DbId>,
    ) -> Result<Vec<AttemptSummary>, sqlx::Error> {
        let query = format!(
            "SELECT {SUMMARY_COLUMNS} FROM attempts
             WHERE session_id = $1 AND ($2::BIGINT IS NULL OR step_id = $2)
             ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, AttemptSummary>(&query)
            .bind(session_id)
            .bind(step_id)
            .fetch_all(pool)
            .await
    }
}
