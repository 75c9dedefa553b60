//! Handlers for survey steps.
//!
//! `step_order` is assigned at creation and immutable afterwards, so a
//! reorder cannot change what a running session's indices point at. Edits
//! and deletes never touch running sessions either: those read from their
//! snapshot.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use photoproof_core::error::CoreError;
use photoproof_core::types::DbId;
use photoproof_db::models::step::{CreateStep, Step, UpdateStep};
use photoproof_db::repositories::StepRepo;
use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::handlers::surveys::require_owned_survey;
use crate::handlers::validate_input;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /surveys/{id}/steps`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateStepRequest {
    #[validate(range(min = 1, message = "step_order must be at least 1"))]
    pub step_order: i32,
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub title: String,
    #[validate(length(max = 2000, message = "description must be at most 2000 characters"))]
    #[serde(default)]
    pub description: String,
    #[validate(length(min = 1, max = 200, message = "expected_object must be 1-200 characters"))]
    pub expected_object: String,
    #[serde(default)]
    pub tips: Vec<String>,
    #[serde(default = "default_required")]
    pub is_required: bool,
}

fn default_required() -> bool {
    true
}

/// Request body for `PUT /steps/{id}`. `step_order` is not editable.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateStepRequest {
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub title: Option<String>,
    #[validate(length(max = 2000, message = "description must be at most 2000 characters"))]
    pub description: Option<String>,
    #[validate(length(min = 1, max = 200, message = "expected_object must be 1-200 characters"))]
    pub expected_object: Option<String>,
    pub tips: Option<Vec<String>>,
    pub is_required: Option<bool>,
}

/// GET /api/v1/surveys/{id}/steps
///
/// List a survey's steps in traversal order.
pub async fn list_steps(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(survey_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    require_owned_survey(&state, survey_id, &auth).await?;
    let steps = StepRepo::list_for_survey(&state.pool, survey_id).await?;
    Ok(Json(DataResponse { data: steps }))
}

/// POST /api/v1/surveys/{id}/steps
///
/// A duplicate `step_order` within the survey surfaces as a 409.
pub async fn create_step(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(survey_id): Path<DbId>,
    Json(input): Json<CreateStepRequest>,
) -> AppResult<impl IntoResponse> {
    validate_input(&input)?;
    require_owned_survey(&state, survey_id, &auth).await?;

    let step = StepRepo::create(
        &state.pool,
        &CreateStep {
            survey_id,
            step_order: input.step_order,
            title: input.title,
            description: input.description,
            expected_object: input.expected_object,
            tips: input.tips,
            is_required: input.is_required,
        },
    )
    .await?;

    tracing::info!(step_id = step.id, survey_id, "Step created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: step })))
}

/// PUT /api/v1/steps/{id}
pub async fn update_step(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateStepRequest>,
) -> AppResult<impl IntoResponse> {
    validate_input(&input)?;
    require_owned_step(&state, id, &auth).await?;

    let step = StepRepo::update(
        &state.pool,
        id,
        &UpdateStep {
            title: input.title,
            description: input.description,
            expected_object: input.expected_object,
            tips: input.tips,
            is_required: input.is_required,
        },
    )
    .await?
    .ok_or(AppError::Core(CoreError::NotFound { entity: "Step", id }))?;

    Ok(Json(DataResponse { data: step }))
}

/// DELETE /api/v1/steps/{id}
///
/// Returns 204 No Content.
pub async fn delete_step(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    require_owned_step(&state, id, &auth).await?;

    let deleted = StepRepo::delete(&state.pool, id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound { entity: "Step", id }));
    }

    tracing::info!(step_id = id, "Step deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Load a step and enforce that the caller owns its survey.
async fn require_owned_step(state: &AppState, id: DbId, auth: &AuthUser) -> AppResult<Step> {
    let step = StepRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Step", id }))?;

    require_owned_survey(state, step.survey_id, auth).await?;
    Ok(step)
}
