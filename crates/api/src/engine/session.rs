//! The survey run engine: token resolution, session lifecycle, and the
//! photo submission pipeline.
//!
//! The submission pipeline runs in three phases:
//!
//! 1. **Validate** -- token resolution, expiry, payload decoding, and the
//!    state-machine guard. Any failure here has no side effects: no attempt
//!    slot is reserved and no ledger row is written.
//! 2. **Reserve** -- a compare-and-swap on the session row increments the
//!    attempt counter. This is the single enforcement point against the
//!    lost-update race; a missed swap surfaces as a retryable conflict.
//! 3. **Verify and apply** -- the verifier round-trip happens with no lock
//!    or transaction held. The verdict is then applied in one transaction:
//!    exactly one ledger row plus the session transition, or a clean
//!    rollback.

use photoproof_core::error::CoreError;
use photoproof_core::photo::PhotoPayload;
use photoproof_core::verification::VerificationOutcome;
use photoproof_core::{invitation as invitation_policy, session as policy};
use photoproof_db::models::attempt::{AttemptSummary, NewAttempt};
use photoproof_db::models::invitation::Invitation;
use photoproof_db::models::step::{Step, StepSnapshot};
use photoproof_db::models::survey::Survey;
use photoproof_db::models::survey_session::{
    CreateSurveySession, SessionProgress, SurveySession,
};
use photoproof_db::repositories::{
    AttemptRepo, InvitationRepo, StepRepo, SurveyRepo, SurveySessionRepo,
};
use photoproof_db::DbPool;
use photoproof_vision::ObjectVerifier;
use serde::Serialize;

use crate::error::{AppError, AppResult};

/// Everything the Access Gate resolves for a token.
pub struct ResolvedAccess {
    pub invitation: Invitation,
    pub survey: Survey,
    pub steps: Vec<Step>,
}

/// Transition result serialized to the client after a submission or
/// override.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TransitionStatus {
    Advanced,
    Completed,
    Retry,
    AttemptsExhausted,
}

impl From<policy::Transition> for TransitionStatus {
    fn from(transition: policy::Transition) -> Self {
        match transition {
            policy::Transition::Advanced { .. } => Self::Advanced,
            policy::Transition::Completed => Self::Completed,
            policy::Transition::Retry { .. } => Self::Retry,
            policy::Transition::AttemptsExhausted => Self::AttemptsExhausted,
        }
    }
}

/// Response payload for a photo submission.
#[derive(Debug, Serialize)]
pub struct SubmitResult {
    pub attempt: AttemptSummary,
    pub outcome: VerificationOutcome,
    pub transition: TransitionStatus,
    pub progress: SessionProgress,
}

/// Response payload for an override.
#[derive(Debug, Serialize)]
pub struct OverrideResult {
    pub transition: TransitionStatus,
    pub progress: SessionProgress,
}

/// Resolve a token to its invitation, survey, and ordered step list.
///
/// Expiry is evaluated here, on every resolution. An unknown token and a
/// token for a deleted survey are indistinguishable to the caller.
pub async fn resolve_access(pool: &DbPool, token: &str) -> AppResult<ResolvedAccess> {
    let invitation = InvitationRepo::find_by_token(pool, token)
        .await?
        .ok_or(AppError::Core(CoreError::TokenNotFound))?;

    invitation_policy::ensure_usable(invitation.expires_at, chrono::Utc::now())
        .map_err(AppError::Core)?;

    let survey = SurveyRepo::find_by_id(pool, invitation.survey_id)
        .await?
        .ok_or(AppError::Core(CoreError::TokenNotFound))?;

    let steps = StepRepo::list_for_survey(pool, survey.id).await?;

    Ok(ResolvedAccess {
        invitation,
        survey,
        steps,
    })
}

/// Start a session for a token, or resume the existing one.
///
/// A new session captures the step list as an immutable snapshot; survey
/// edits after this point do not alter the run.
pub async fn start_session(pool: &DbPool, token: &str) -> AppResult<SurveySession> {
    let access = resolve_access(pool, token).await?;

    if let Some(existing) = SurveySessionRepo::find_by_invitation(pool, access.invitation.id).await?
    {
        tracing::debug!(session_id = existing.id, "Resuming existing session");
        return Ok(existing);
    }

    if access.steps.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Survey has no steps".into(),
        )));
    }

    let snapshot: Vec<StepSnapshot> = access.steps.iter().map(StepSnapshot::from).collect();
    let session = SurveySessionRepo::create(
        pool,
        &CreateSurveySession {
            invitation_id: access.invitation.id,
            survey_id: access.survey.id,
            steps_snapshot: snapshot,
        },
    )
    .await?;

    tracing::info!(
        session_id = session.id,
        survey_id = session.survey_id,
        total_steps = session.steps_snapshot.0.len(),
        "Session started"
    );
    Ok(session)
}

/// Look up the session for a token. The token must have been started.
async fn require_session(pool: &DbPool, token: &str) -> AppResult<SurveySession> {
    let access = resolve_access(pool, token).await?;
    SurveySessionRepo::find_by_invitation(pool, access.invitation.id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Session",
            id: access.invitation.id,
        }))
}

/// Pure read of the session's position. Never mutates.
pub async fn get_progress(pool: &DbPool, token: &str) -> AppResult<SessionProgress> {
    let session = require_session(pool, token).await?;
    Ok(SessionProgress::from(&session))
}

/// Submit one photo for the session's current step.
pub async fn submit_photo(
    pool: &DbPool,
    verifier: &dyn ObjectVerifier,
    token: &str,
    photo: PhotoPayload,
) -> AppResult<SubmitResult> {
    let session = require_session(pool, token).await?;

    // Phase 1: guard before any side effect.
    policy::ensure_submittable(&session.view()).map_err(AppError::Core)?;

    let step = session
        .current_step()
        .cloned()
        .ok_or_else(|| AppError::Core(CoreError::InvalidState("No step at current index".into())))?;

    // Phase 2: reserve the attempt slot. The CAS on `version` makes two
    // racing submissions impossible to both count as the same attempt.
    let reserved = SurveySessionRepo::reserve_attempt(pool, session.id, session.version)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(
                "Another submission is in flight for this session; re-read progress and retry"
                    .into(),
            ))
        })?;
    let attempt_number = reserved.attempt_count;

    // Phase 3: verifier round-trip with nothing held. The verifier never
    // errors; unreachable upstreams come back as ordinary rejections.
    let outcome = verifier
        .verify(&photo.to_data_uri(), &step.expected_object)
        .await;

    tracing::info!(
        session_id = session.id,
        step_id = step.step_id,
        attempt_number,
        accepted = outcome.accepted,
        confidence = outcome.confidence,
        "Photo verified"
    );

    let transition = policy::apply_verdict(&reserved.view(), attempt_number, outcome.accepted);

    // Ledger row + transition in one transaction.
    let mut tx = pool.begin().await?;

    let attempt = AttemptRepo::record(
        &mut *tx,
        &NewAttempt {
            session_id: session.id,
            step_id: step.step_id,
            attempt_number,
            image_data: photo.into_bytes(),
            verification_result: Some(outcome.accepted),
            confidence: Some(outcome.confidence),
            detected_labels: outcome.detected_labels.clone(),
            error_message: outcome.rejection_reason.clone(),
        },
    )
    .await?;

    let current = apply_transition(&mut tx, &reserved, transition).await?;

    tx.commit().await?;

    Ok(SubmitResult {
        attempt,
        outcome,
        transition: transition.into(),
        progress: SessionProgress::from(&current),
    })
}

/// "Use photo anyway": force-advance after attempts are exhausted.
///
/// The server checks exhaustion itself; a client cannot skip verification
/// by calling this early. The ledger is left untouched -- the stored
/// attempt rows keep their rejected verdicts.
pub async fn override_step(pool: &DbPool, token: &str) -> AppResult<OverrideResult> {
    let session = require_session(pool, token).await?;

    policy::ensure_overridable(&session.view()).map_err(AppError::Core)?;

    let transition = policy::advance(&session.view());

    tracing::info!(
        session_id = session.id,
        step_index = session.current_step_index,
        "Step overridden after exhausted attempts"
    );

    let mut tx = pool.begin().await?;
    let current = apply_transition(&mut tx, &session, transition).await?;
    tx.commit().await?;

    Ok(OverrideResult {
        transition: transition.into(),
        progress: SessionProgress::from(&current),
    })
}

/// Apply a decided transition inside an open transaction.
///
/// Advance and complete are guarded on the judged step index; a miss means
/// the session moved underneath us and the whole transaction rolls back as
/// a retryable conflict. Retry and exhaustion leave the session row alone
/// (the reservation already bumped the counter).
async fn apply_transition(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    session: &SurveySession,
    transition: policy::Transition,
) -> AppResult<SurveySession> {
    let stale = || {
        AppError::Core(CoreError::Conflict(
            "Session changed while the verdict was pending; re-read progress and retry".into(),
        ))
    };

    match transition {
        policy::Transition::Advanced { .. } => {
            SurveySessionRepo::advance_step(&mut **tx, session.id, session.current_step_index)
                .await?
                .ok_or_else(stale)
        }
        policy::Transition::Completed => {
            let completed =
                SurveySessionRepo::complete(&mut **tx, session.id, session.current_step_index)
                    .await?
                    .ok_or_else(stale)?;
            InvitationRepo::mark_completed(&mut **tx, session.invitation_id).await?;
            tracing::info!(session_id = session.id, "Session completed");
            Ok(completed)
        }
        policy::Transition::Retry { .. } | policy::Transition::AttemptsExhausted => {
            Ok(session.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_status_maps_every_variant() {
        assert_eq!(
            TransitionStatus::from(policy::Transition::Advanced { next_step_index: 1 }),
            TransitionStatus::Advanced
        );
        assert_eq!(
            TransitionStatus::from(policy::Transition::Completed),
            TransitionStatus::Completed
        );
        assert_eq!(
            TransitionStatus::from(policy::Transition::Retry { attempts_used: 1 }),
            TransitionStatus::Retry
        );
        assert_eq!(
            TransitionStatus::from(policy::Transition::AttemptsExhausted),
            TransitionStatus::AttemptsExhausted
        );
    }

    #[test]
    fn transition_status_serializes_snake_case() {
        let json = serde_json::to_string(&TransitionStatus::AttemptsExhausted).unwrap();
        assert_eq!(json, "\"attempts_exhausted\"");
    }
}
