//! Handlers for survey invitations.
//!
//! No email is sent. The response carries the token and a share path; how
//! it reaches the recipient is the admin's problem.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use photoproof_core::invitation as invitation_policy;
use photoproof_core::types::DbId;
use photoproof_db::models::invitation::{CreateInvitation, Invitation};
use photoproof_db::repositories::InvitationRepo;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::AppResult;
use crate::handlers::surveys::require_owned_survey;
use crate::handlers::validate_input;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /surveys/{id}/invitations`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateInvitationRequest {
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
}

/// Invitation plus the path a recipient uses to open the run.
#[derive(Debug, Serialize)]
pub struct InvitationResponse {
    #[serde(flatten)]
    pub invitation: Invitation,
    pub share_path: String,
}

impl From<Invitation> for InvitationResponse {
    fn from(invitation: Invitation) -> Self {
        let share_path = format!("/run/{}", invitation.token);
        Self {
            invitation,
            share_path,
        }
    }
}

/// POST /api/v1/surveys/{id}/invitations
///
/// Generates the token and the 30-day expiry.
pub async fn create_invitation(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(survey_id): Path<DbId>,
    Json(input): Json<CreateInvitationRequest>,
) -> AppResult<impl IntoResponse> {
    validate_input(&input)?;
    require_owned_survey(&state, survey_id, &auth).await?;

    let invitation = InvitationRepo::create(
        &state.pool,
        &CreateInvitation {
            survey_id,
            token: invitation_policy::generate_token(),
            email: input.email,
            expires_at: invitation_policy::default_expiry(chrono::Utc::now()),
        },
    )
    .await?;

    tracing::info!(
        invitation_id = invitation.id,
        survey_id,
        "Invitation created"
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: InvitationResponse::from(invitation),
        }),
    ))
}

/// GET /api/v1/surveys/{id}/invitations
pub async fn list_invitations(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(survey_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    require_owned_survey(&state, survey_id, &auth).await?;

    let invitations = InvitationRepo::list_for_survey(&state.pool, survey_id).await?;
    let data: Vec<InvitationResponse> = invitations
        .into_iter()
        .map(InvitationResponse::from)
        .collect();

    Ok(Json(DataResponse { data }))
}
