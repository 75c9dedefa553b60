//! Public run endpoints, gated by the invitation token in the path.
//!
//! No login here: the token is the capability. Every handler resolves it
//! fresh, so expiry is re-evaluated on each call and a token that stopped
//! working mid-run fails with a typed condition rather than a stale view.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use photoproof_core::photo::PhotoPayload;
use photoproof_core::types::{DbId, Timestamp};
use photoproof_db::models::step::Step;
use photoproof_db::models::survey_session::SessionProgress;
use photoproof_db::repositories::SurveySessionRepo;
use serde::{Deserialize, Serialize};

use crate::engine::session as engine;
use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /run/{token}/attempts`.
///
/// `attempt_number` is advisory display data from the client; the server
/// derives the real attempt number from its own reservation and never
/// trusts this field for gating.
#[derive(Debug, Deserialize)]
pub struct SubmitAttemptRequest {
    /// The photo as a base64 data-URI (bare base64 accepted).
    pub image: String,
    #[serde(default)]
    #[allow(dead_code)]
    pub attempt_number: Option<i32>,
}

/// Public projection of a survey. Owner and lifecycle flags stay private.
#[derive(Debug, Serialize)]
pub struct RunSurvey {
    pub title: String,
    pub description: String,
    pub company: String,
}

/// Public projection of a step.
#[derive(Debug, Serialize)]
pub struct RunStep {
    pub id: DbId,
    pub step_order: i32,
    pub title: String,
    pub description: String,
    pub expected_object: String,
    pub tips: Vec<String>,
    pub is_required: bool,
}

impl From<Step> for RunStep {
    fn from(step: Step) -> Self {
        Self {
            id: step.id,
            step_order: step.step_order,
            title: step.title,
            description: step.description,
            expected_object: step.expected_object,
            tips: step.tips.0,
            is_required: step.is_required,
        }
    }
}

/// Invitation status as shown to the person running the survey.
#[derive(Debug, Serialize)]
pub struct RunInvitation {
    pub is_completed: bool,
    pub expires_at: Timestamp,
}

/// Response for `GET /run/{token}`.
#[derive(Debug, Serialize)]
pub struct RunOverview {
    pub survey: RunSurvey,
    pub steps: Vec<RunStep>,
    pub invitation: RunInvitation,
    /// Present once the session has been started.
    pub progress: Option<SessionProgress>,
}

/// GET /run/{token}
///
/// Resolve the token to the survey, its ordered steps, and the invitation
/// status. Includes progress when a session already exists.
pub async fn get_run(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> AppResult<impl IntoResponse> {
    let access = engine::resolve_access(&state.pool, &token).await?;

    let progress = SurveySessionRepo::find_by_invitation(&state.pool, access.invitation.id)
        .await?
        .as_ref()
        .map(SessionProgress::from);

    let overview = RunOverview {
        survey: RunSurvey {
            title: access.survey.title,
            description: access.survey.description,
            company: access.survey.company,
        },
        steps: access.steps.into_iter().map(RunStep::from).collect(),
        invitation: RunInvitation {
            is_completed: access.invitation.is_completed,
            expires_at: access.invitation.expires_at,
        },
        progress,
    };

    Ok(Json(DataResponse { data: overview }))
}

/// POST /run/{token}/start
///
/// Start the session, or resume the existing one. Idempotent from the
/// client's point of view.
pub async fn start_run(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> AppResult<impl IntoResponse> {
    let session = engine::start_session(&state.pool, &token).await?;
    let progress = SessionProgress::from(&session);
    Ok((StatusCode::CREATED, Json(DataResponse { data: progress })))
}

/// POST /run/{token}/attempts
///
/// Submit one photo for the current step.
pub async fn submit_attempt(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(input): Json<SubmitAttemptRequest>,
) -> AppResult<impl IntoResponse> {
    let photo = PhotoPayload::from_data_uri(&input.image).map_err(AppError::Core)?;

    let result =
        engine::submit_photo(&state.pool, state.verifier.as_ref(), &token, photo).await?;

    Ok(Json(DataResponse { data: result }))
}

/// POST /run/{token}/override
///
/// "Use photo anyway": advance past the current step after its attempts
/// are exhausted. Exhaustion is verified server-side.
pub async fn override_step(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> AppResult<impl IntoResponse> {
    let result = engine::override_step(&state.pool, &token).await?;
    Ok(Json(DataResponse { data: result }))
}

/// GET /run/{token}/progress
///
/// Pure read of the session's position. Never mutates.
pub async fn get_progress(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> AppResult<impl IntoResponse> {
    let progress = engine::get_progress(&state.pool, &token).await?;
    Ok(Json(DataResponse { data: progress }))
}
