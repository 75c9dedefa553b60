//! Repository for the `steps` table.

use photoproof_core::types::DbId;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::step::{CreateStep, Step, UpdateStep};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, survey_id, step_order, title, description, expected_object, \
                        tips, is_required, created_at, updated_at";

/// Provides CRUD operations for survey steps.
pub struct StepRepo;

impl StepRepo {
    /// Insert a new step, returning the created row.
    ///
    /// The `uq_steps_survey_order` constraint rejects a duplicate order
    /// within the survey.
    pub async fn create(pool: &PgPool, input: &CreateStep) -> Result<Step, sqlx::Error> {
        let query = format!(
            "INSERT INTO steps (survey_id, step_order, title, description, expected_object, tips, is_required)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Step>(&query)
            .bind(input.survey_id)
            .bind(input.step_order)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.expected_object)
            .bind(Json(&input.tips))
            .bind(input.is_required)
            .fetch_one(pool)
            .await
    }

    /// Find a step by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Step>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM steps WHERE id = $1");
        sqlx::query_as::<_, Step>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a survey's steps in traversal order (ascending `step_order`).
    pub async fn list_for_survey(pool: &PgPool, survey_id: DbId) -> Result<Vec<Step>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM steps WHERE survey_id = $1 ORDER BY step_order ASC"
        );
        sqlx::query_as::<_, Step>(&query)
            .bind(survey_id)
            .fetch_all(pool)
            .await
    }

    /// Update a step. Only non-`None` fields in `input` are applied;
    /// `step_order` is immutable.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateStep,
    ) -> Result<Option<Step>, sqlx::Error> {
        let query = format!(
            "UPDATE steps SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                expected_object = COALESCE($4, expected_object),
                tips = COALESCE($5, tips),
                is_required = COALESCE($6, is_required),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Step>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.expected_object)
            .bind(input.tips.as_ref().map(Json))
            .bind(input.is_required)
            .fetch_optional(pool)
            .await
    }

    /// Delete a step. Returns `true` if a row was removed.
    ///
    /// Running sessions are unaffected: they read from their snapshot.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM steps WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
