//! The normalized result of asking a vision model whether a photo shows the
//! expected object.
//!
//! Verification failure is a normal outcome, not an error channel: the
//! client that talks to the upstream model degrades every transport or
//! parsing problem into [`VerificationOutcome::unavailable`] so the session
//! layer handles "the model was unreachable" and "the model said no" through
//! the same retry/override path. Only the stored rejection reason tells the
//! two apart for audit purposes.

use serde::{Deserialize, Serialize};

/// Rejection reason used whenever the upstream model could not be consulted.
pub const VERIFICATION_UNAVAILABLE: &str = "Failed to analyze image. Please try again.";

/// Normalized verdict for one photo submission.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VerificationOutcome {
    /// Whether the expected object is the clear main subject of the photo.
    pub accepted: bool,
    /// Model confidence, clamped into `[0, 1]`.
    pub confidence: f64,
    /// Objects the model reported seeing, in the order it reported them.
    pub detected_labels: Vec<String>,
    /// Present only on rejection or upstream failure.
    pub rejection_reason: Option<String>,
}

impl VerificationOutcome {
    /// Build an outcome from raw upstream fields, clamping confidence.
    pub fn new(
        accepted: bool,
        confidence: f64,
        detected_labels: Vec<String>,
        rejection_reason: Option<String>,
    ) -> Self {
        Self {
            accepted,
            confidence: clamp_confidence(confidence),
            detected_labels,
            rejection_reason,
        }
    }

    /// The canonical negative outcome for any transport, parsing, or
    /// upstream error.
    pub fn unavailable() -> Self {
        Self {
            accepted: false,
            confidence: 0.0,
            detected_labels: Vec::new(),
            rejection_reason: Some(VERIFICATION_UNAVAILABLE.to_string()),
        }
    }
}

/// Clamp an upstream-reported confidence into `[0, 1]`.
///
/// The upstream model is untrusted; out-of-range values and NaN both
/// collapse to the nearest valid value (NaN becomes 0).
pub fn clamp_confidence(confidence: f64) -> f64 {
    if confidence.is_nan() {
        return 0.0;
    }
    confidence.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_passes_in_range_values() {
        assert_eq!(clamp_confidence(0.0), 0.0);
        assert_eq!(clamp_confidence(0.42), 0.42);
        assert_eq!(clamp_confidence(1.0), 1.0);
    }

    #[test]
    fn clamp_bounds_out_of_range_values() {
        assert_eq!(clamp_confidence(1.7), 1.0);
        assert_eq!(clamp_confidence(-0.3), 0.0);
    }

    #[test]
    fn clamp_collapses_nan_to_zero() {
        assert_eq!(clamp_confidence(f64::NAN), 0.0);
    }

    #[test]
    fn new_clamps_confidence() {
        let outcome = VerificationOutcome::new(true, 3.0, vec!["phone".into()], None);
        assert_eq!(outcome.confidence, 1.0);
    }

    #[test]
    fn unavailable_is_a_plain_rejection() {
        let outcome = VerificationOutcome::unavailable();
        assert!(!outcome.accepted);
        assert_eq!(outcome.confidence, 0.0);
        assert!(outcome.detected_labels.is_empty());
        assert_eq!(
            outcome.rejection_reason.as_deref(),
            Some(VERIFICATION_UNAVAILABLE)
        );
    }
}
