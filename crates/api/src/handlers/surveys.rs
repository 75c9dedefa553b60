//! Handlers for the `/surveys` resource (admin CRUD).
//!
//! Deletion is logical: the row survives for running sessions that still
//! reference it through their snapshot.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use photoproof_core::error::CoreError;
use photoproof_core::types::DbId;
use photoproof_db::models::survey::{CreateSurvey, Survey, UpdateSurvey};
use photoproof_db::repositories::SurveyRepo;
use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::handlers::validate_input;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /surveys`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateSurveyRequest {
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub title: String,
    #[validate(length(max = 2000, message = "description must be at most 2000 characters"))]
    #[serde(default)]
    pub description: String,
    #[validate(length(max = 200, message = "company must be at most 200 characters"))]
    #[serde(default)]
    pub company: String,
}

/// Request body for `PUT /surveys/{id}`.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateSurveyRequest {
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub title: Option<String>,
    #[validate(length(max = 2000, message = "description must be at most 2000 characters"))]
    pub description: Option<String>,
    #[validate(length(max = 200, message = "company must be at most 200 characters"))]
    pub company: Option<String>,
    pub is_active: Option<bool>,
}

/// GET /api/v1/surveys
///
/// List the authenticated admin's surveys, newest first.
pub async fn list_surveys(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let surveys = SurveyRepo::list_for_owner(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse { data: surveys }))
}

/// POST /api/v1/surveys
pub async fn create_survey(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateSurveyRequest>,
) -> AppResult<impl IntoResponse> {
    validate_input(&input)?;

    let survey = SurveyRepo::create(
        &state.pool,
        &CreateSurvey {
            owner_id: auth.user_id,
            title: input.title,
            description: input.description,
            company: input.company,
        },
    )
    .await?;

    tracing::info!(survey_id = survey.id, owner_id = auth.user_id, "Survey created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: survey })))
}

/// GET /api/v1/surveys/{id}
pub async fn get_survey(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let survey = require_owned_survey(&state, id, &auth).await?;
    Ok(Json(DataResponse { data: survey }))
}

/// PUT /api/v1/surveys/{id}
pub async fn update_survey(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateSurveyRequest>,
) -> AppResult<impl IntoResponse> {
    validate_input(&input)?;
    require_owned_survey(&state, id, &auth).await?;

    let survey = SurveyRepo::update(
        &state.pool,
        id,
        &UpdateSurvey {
            title: input.title,
            description: input.description,
            company: input.company,
            is_active: input.is_active,
        },
    )
    .await?
    .ok_or(AppError::Core(CoreError::NotFound {
        entity: "Survey",
        id,
    }))?;

    Ok(Json(DataResponse { data: survey }))
}

/// DELETE /api/v1/surveys/{id}
///
/// Logical delete. Returns 204 No Content.
pub async fn delete_survey(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    require_owned_survey(&state, id, &auth).await?;

    let deleted = SurveyRepo::soft_delete(&state.pool, id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Survey",
            id,
        }));
    }

    tracing::info!(survey_id = id, "Survey deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Load a survey and enforce that the caller owns it.
pub(crate) async fn require_owned_survey(
    state: &AppState,
    id: DbId,
    auth: &AuthUser,
) -> AppResult<Survey> {
    let survey = SurveyRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Survey",
            id,
        }))?;

    if survey.owner_id != auth.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Survey belongs to another user".into(),
        )));
    }

    Ok(survey)
}
