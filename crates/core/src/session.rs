//! Session state machine: transition policy for a user's run through an
//! ordered step list.
//!
//! A session moves through its survey's steps strictly in order. Each step
//! grants [`MAX_ATTEMPTS_PER_STEP`] photo submissions; a passing verdict
//! advances the session, and once the attempts are exhausted the only
//! forward action is the explicit "use photo anyway" override, which
//! advances exactly like a pass but leaves the ledger untouched.
//!
//! This module is pure policy. It decides transitions from a
//! [`SessionView`]; reading and writing the session row (including the
//! optimistic-lock reservation of an attempt slot) is the `db` and `api`
//! crates' job.

use crate::error::CoreError;

/// Ordinary photo submissions allowed per step before the override becomes
/// the only way forward.
pub const MAX_ATTEMPTS_PER_STEP: i32 = 2;

/// The facts the transition policy needs about a session.
///
/// `current_step_index` is 0-based and monotonically non-decreasing;
/// `attempt_count` counts submissions made on the current step and resets
/// to 0 the moment the session advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionView {
    pub current_step_index: i32,
    pub attempt_count: i32,
    pub total_steps: i32,
    pub is_completed: bool,
}

/// Outcome of applying a verification verdict (or an override) to a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The step passed; the session moved to `next_step_index` with a fresh
    /// attempt counter.
    Advanced { next_step_index: i32 },
    /// The final step passed; the session is complete.
    Completed,
    /// The step was rejected and attempts remain; the caller should retry.
    Retry { attempts_used: i32 },
    /// The step was rejected and no ordinary attempts remain; only the
    /// override may move the session forward.
    AttemptsExhausted,
}

/// Check that an ordinary photo submission is legal for this session.
///
/// Returns `InvalidState` for a completed session, an out-of-range step
/// index (a programming-contract violation by the caller), or a step whose
/// attempts are already exhausted. A rejection here must happen *before*
/// any attempt slot is reserved, so no ledger row is ever written for an
/// illegal submission.
pub fn ensure_submittable(view: &SessionView) -> Result<(), CoreError> {
    if view.is_completed {
        return Err(CoreError::InvalidState(
            "Session is already completed".into(),
        ));
    }
    if view.current_step_index >= view.total_steps || view.current_step_index < 0 {
        return Err(CoreError::InvalidState(format!(
            "Step index {} is out of range for {} steps",
            view.current_step_index, view.total_steps
        )));
    }
    if view.attempt_count >= MAX_ATTEMPTS_PER_STEP {
        return Err(CoreError::InvalidState(format!(
            "All {MAX_ATTEMPTS_PER_STEP} attempts used for this step; \
             accept the photo explicitly to continue"
        )));
    }
    Ok(())
}

/// Check that the "use photo anyway" override is legal for this session.
///
/// The server verifies exhaustion independently of anything the client
/// claims: an override is only honored after every ordinary attempt on the
/// current step was used and rejected.
pub fn ensure_overridable(view: &SessionView) -> Result<(), CoreError> {
    if view.is_completed {
        return Err(CoreError::InvalidState(
            "Session is already completed".into(),
        ));
    }
    if view.current_step_index >= view.total_steps || view.current_step_index < 0 {
        return Err(CoreError::InvalidState(format!(
            "Step index {} is out of range for {} steps",
            view.current_step_index, view.total_steps
        )));
    }
    if view.attempt_count < MAX_ATTEMPTS_PER_STEP {
        return Err(CoreError::InvalidState(format!(
            "Override requires all {MAX_ATTEMPTS_PER_STEP} attempts to be used; \
             {} used so far",
            view.attempt_count
        )));
    }
    Ok(())
}

/// The forward move shared by the accepted branch and the override.
pub fn advance(view: &SessionView) -> Transition {
    let next = view.current_step_index + 1;
    if next >= view.total_steps {
        Transition::Completed
    } else {
        Transition::Advanced {
            next_step_index: next,
        }
    }
}

/// Decide the transition after a verification verdict.
///
/// `attempt_number` is the 1-based number of the submission that was just
/// judged — the value the reservation returned, not anything the client
/// sent.
pub fn apply_verdict(view: &SessionView, attempt_number: i32, accepted: bool) -> Transition {
    if accepted {
        return advance(view);
    }
    if attempt_number < MAX_ATTEMPTS_PER_STEP {
        Transition::Retry {
            attempts_used: attempt_number,
        }
    } else {
        Transition::AttemptsExhausted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh(total_steps: i32) -> SessionView {
        SessionView {
            current_step_index: 0,
            attempt_count: 0,
            total_steps,
            is_completed: false,
        }
    }

    // -- ensure_submittable ---------------------------------------------------

    #[test]
    fn fresh_session_is_submittable() {
        assert!(ensure_submittable(&fresh(3)).is_ok());
    }

    #[test]
    fn completed_session_rejects_submission() {
        let view = SessionView {
            is_completed: true,
            ..fresh(3)
        };
        let err = ensure_submittable(&view).unwrap_err();
        assert!(matches!(err, CoreError::InvalidState(_)));
    }

    #[test]
    fn out_of_range_step_rejects_submission() {
        let view = SessionView {
            current_step_index: 3,
            ..fresh(3)
        };
        assert!(matches!(
            ensure_submittable(&view),
            Err(CoreError::InvalidState(_))
        ));
    }

    #[test]
    fn exhausted_step_rejects_ordinary_submission() {
        // Two rejections already recorded: the third ordinary submission is
        // structurally disallowed.
        let view = SessionView {
            attempt_count: MAX_ATTEMPTS_PER_STEP,
            ..fresh(3)
        };
        assert!(matches!(
            ensure_submittable(&view),
            Err(CoreError::InvalidState(_))
        ));
    }

    #[test]
    fn one_attempt_used_still_submittable() {
        let view = SessionView {
            attempt_count: 1,
            ..fresh(3)
        };
        assert!(ensure_submittable(&view).is_ok());
    }

    // -- apply_verdict --------------------------------------------------------

    #[test]
    fn accepted_photo_advances() {
        // Scenario: fresh session, step 0, accepted verdict.
        let view = fresh(3);
        assert_eq!(
            apply_verdict(&view, 1, true),
            Transition::Advanced { next_step_index: 1 }
        );
    }

    #[test]
    fn accepted_photo_on_last_step_completes() {
        let view = SessionView {
            current_step_index: 2,
            ..fresh(3)
        };
        assert_eq!(apply_verdict(&view, 1, true), Transition::Completed);
    }

    #[test]
    fn accepted_photo_on_single_step_survey_completes() {
        assert_eq!(apply_verdict(&fresh(1), 1, true), Transition::Completed);
    }

    #[test]
    fn first_rejection_allows_retry() {
        let view = fresh(3);
        assert_eq!(
            apply_verdict(&view, 1, false),
            Transition::Retry { attempts_used: 1 }
        );
    }

    #[test]
    fn final_rejection_exhausts_attempts() {
        let view = SessionView {
            attempt_count: MAX_ATTEMPTS_PER_STEP,
            ..fresh(3)
        };
        assert_eq!(
            apply_verdict(&view, MAX_ATTEMPTS_PER_STEP, false),
            Transition::AttemptsExhausted
        );
    }

    #[test]
    fn second_attempt_acceptance_still_advances() {
        let view = SessionView {
            attempt_count: MAX_ATTEMPTS_PER_STEP,
            ..fresh(3)
        };
        assert_eq!(
            apply_verdict(&view, 2, true),
            Transition::Advanced { next_step_index: 1 }
        );
    }

    // -- override gating ------------------------------------------------------

    #[test]
    fn override_requires_exhaustion() {
        // One rejection is not enough: a malicious client must not skip
        // verification on attempt 1.
        let view = SessionView {
            attempt_count: 1,
            ..fresh(3)
        };
        assert!(matches!(
            ensure_overridable(&view),
            Err(CoreError::InvalidState(_))
        ));
    }

    #[test]
    fn override_allowed_after_exhaustion() {
        let view = SessionView {
            attempt_count: MAX_ATTEMPTS_PER_STEP,
            ..fresh(3)
        };
        assert!(ensure_overridable(&view).is_ok());
    }

    #[test]
    fn override_rejected_on_completed_session() {
        let view = SessionView {
            is_completed: true,
            attempt_count: MAX_ATTEMPTS_PER_STEP,
            ..fresh(3)
        };
        assert!(matches!(
            ensure_overridable(&view),
            Err(CoreError::InvalidState(_))
        ));
    }

    #[test]
    fn override_advances_like_an_accepted_photo() {
        let mid = SessionView {
            current_step_index: 1,
            attempt_count: MAX_ATTEMPTS_PER_STEP,
            ..fresh(3)
        };
        assert_eq!(advance(&mid), Transition::Advanced { next_step_index: 2 });

        let last = SessionView {
            current_step_index: 2,
            attempt_count: MAX_ATTEMPTS_PER_STEP,
            ..fresh(3)
        };
        assert_eq!(advance(&last), Transition::Completed);
    }

    // -- walk-through properties ----------------------------------------------

    /// Drive a three-step survey to completion, asserting the invariants
    /// the ledger depends on: the step index never decreases, attempt
    /// numbers are 1-based and contiguous per step, and the counter resets
    /// on every advance.
    #[test]
    fn full_run_preserves_counter_invariants() {
        let total_steps = 3;
        let mut view = fresh(total_steps);

        for step in 0..total_steps {
            assert_eq!(view.current_step_index, step);
            assert_eq!(view.attempt_count, 0);

            // First submission is rejected, second passes.
            assert!(ensure_submittable(&view).is_ok());
            view.attempt_count += 1;
            assert_eq!(view.attempt_count, 1);
            assert_eq!(
                apply_verdict(&view, view.attempt_count, false),
                Transition::Retry { attempts_used: 1 }
            );

            assert!(ensure_submittable(&view).is_ok());
            view.attempt_count += 1;
            assert_eq!(view.attempt_count, 2);
            match apply_verdict(&view, view.attempt_count, true) {
                Transition::Advanced { next_step_index } => {
                    assert_eq!(next_step_index, step + 1);
                    view.current_step_index = next_step_index;
                    view.attempt_count = 0;
                }
                Transition::Completed => {
                    assert_eq!(step, total_steps - 1);
                    view.is_completed = true;
                }
                other => panic!("unexpected transition: {other:?}"),
            }
        }

        assert!(view.is_completed);
        assert!(ensure_submittable(&view).is_err());
    }

    /// Two rejections, then the override, matching the documented retry
    /// flow: the third ordinary submission is disallowed and the override
    /// advances without touching the ledger.
    #[test]
    fn exhaustion_then_override_flow() {
        let mut view = fresh(2);

        for expected_attempt in 1..=MAX_ATTEMPTS_PER_STEP {
            assert!(ensure_submittable(&view).is_ok());
            view.attempt_count += 1;
            let transition = apply_verdict(&view, expected_attempt, false);
            if expected_attempt < MAX_ATTEMPTS_PER_STEP {
                assert_eq!(
                    transition,
                    Transition::Retry {
                        attempts_used: expected_attempt
                    }
                );
            } else {
                assert_eq!(transition, Transition::AttemptsExhausted);
            }
        }

        // Third ordinary submission is structurally disallowed.
        assert!(matches!(
            ensure_submittable(&view),
            Err(CoreError::InvalidState(_))
        ));

        // Override advances to step 1 with a fresh counter.
        assert!(ensure_overridable(&view).is_ok());
        assert_eq!(advance(&view), Transition::Advanced { next_step_index: 1 });
        view.current_step_index = 1;
        view.attempt_count = 0;
        assert!(ensure_submittable(&view).is_ok());
    }
}
