//! Admin audit view over survey sessions and their attempt ledger.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use photoproof_core::error::CoreError;
use photoproof_core::types::DbId;
use photoproof_db::repositories::{AttemptRepo, SurveySessionRepo};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::handlers::surveys::require_owned_survey;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for the attempt ledger.
#[derive(Debug, Deserialize)]
pub struct AttemptQuery {
    /// Narrow the ledger to one step.
    pub step_id: Option<DbId>,
}

/// GET /api/v1/sessions/{id}/attempts
///
/// The full ledger for a session in creation order, rejected and overridden
/// attempts included. Rows are never rewritten, so this is the audit trail.
pub async fn list_attempts(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(session_id): Path<DbId>,
    Query(params): Query<AttemptQuery>,
) -> AppResult<impl IntoResponse> {
    let session = SurveySessionRepo::find_by_id(&state.pool, session_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Session",
            id: session_id,
        }))?;

    require_owned_survey(&state, session.survey_id, &auth).await?;

    let attempts = AttemptRepo::query(&state.pool, session_id, params.step_id).await?;
    Ok(Json(DataResponse { data: attempts }))
}
