//! Repository for the `surveys` table.

use photoproof_core::types::DbId;
use sqlx::PgPool;

use crate::models::survey::{CreateSurvey, Survey, UpdateSurvey};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, owner_id, title, description, company, is_active, is_deleted, created_at, updated_at";

/// Provides CRUD operations for surveys. Deletion is logical only.
pub struct SurveyRepo;

impl SurveyRepo {
    /// Insert a new survey, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateSurvey) -> Result<Survey, sqlx::Error> {
        let query = format!(
            "INSERT INTO surveys (owner_id, title, description, company)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Survey>(&query)
            .bind(input.owner_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.company)
            .fetch_one(pool)
            .await
    }

    /// Find a non-deleted survey by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Survey>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM surveys WHERE id = $1 AND is_deleted = false");
        sqlx::query_as::<_, Survey>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List an owner's non-deleted surveys, newest first.
    pub async fn list_for_owner(pool: &PgPool, owner_id: DbId) -> Result<Vec<Survey>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM surveys
             WHERE owner_id = $1 AND is_deleted = false
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Survey>(&query)
            .bind(owner_id)
            .fetch_all(pool)
            .await
    }

    /// Update a survey. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no non-deleted row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateSurvey,
    ) -> Result<Option<Survey>, sqlx::Error> {
        let query = format!(
            "UPDATE surveys SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                company = COALESCE($4, company),
                is_active = COALESCE($5, is_active),
                updated_at = NOW()
             WHERE id = $1 AND is_deleted = false
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Survey>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.company)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Logically delete a survey. Returns `true` if the row was updated.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE surveys SET is_deleted = true, updated_at = NOW()
             WHERE id = $1 AND is_deleted = false",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
