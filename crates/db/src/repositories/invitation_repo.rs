//! Repository for the `invitations` table.

use photoproof_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::invitation::{CreateInvitation, Invitation};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, survey_id, token, email, is_completed, completed_at, expires_at, created_at";

/// Provides operations for invitations.
pub struct InvitationRepo;

impl InvitationRepo {
    /// Insert a new invitation, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateInvitation) -> Result<Invitation, sqlx::Error> {
        let query = format!(
            "INSERT INTO invitations (survey_id, token, email, expires_at)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Invitation>(&query)
            .bind(input.survey_id)
            .bind(&input.token)
            .bind(&input.email)
            .bind(input.expires_at)
            .fetch_one(pool)
            .await
    }

    /// Resolve a token by exact equality. Expiry is the caller's concern:
    /// it is a policy check evaluated on every resolution, not a query
    /// filter.
    pub async fn find_by_token(
        pool: &PgPool,
        token: &str,
    ) -> Result<Option<Invitation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM invitations WHERE token = $1");
        sqlx::query_as::<_, Invitation>(&query)
            .bind(token)
            .fetch_optional(pool)
            .await
    }

    /// List a survey's invitations, newest first.
    pub async fn list_for_survey(
        pool: &PgPool,
        survey_id: DbId,
    ) -> Result<Vec<Invitation>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM invitations WHERE survey_id = $1 ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Invitation>(&query)
            .bind(survey_id)
            .fetch_all(pool)
            .await
    }

    /// Stamp an invitation completed. Participates in the session-completion
    /// transaction. Returns `true` if the row was updated.
    pub async fn mark_completed(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE invitations SET is_completed = true, completed_at = NOW()
             WHERE id = $1 AND is_completed = false",
        )
        .bind(id)
        .execute(conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
