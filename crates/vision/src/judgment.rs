//! Prompt construction and judgment parsing for the vision model.

use photoproof_core::verification::{clamp_confidence, VerificationOutcome};
use serde::Deserialize;

/// Build the instruction text for one verification request.
///
/// The contract with the model: the expected object must be the clear main
/// subject of the photo, lexical synonyms are acceptable, and the answer is
/// strict JSON so it can be parsed mechanically.
pub fn build_instructions(expected_object: &str) -> String {
    format!(
        "You are verifying a photo for a field survey. Determine whether the image \
         clearly shows this object as its main subject: \"{expected_object}\".\n\
         Be strict: the object must be the primary subject of the photo, not \
         incidental background. Treat lexical synonyms as a match (for example \
         \"cell phone\" and \"smartphone\" refer to the same object).\n\
         Respond with JSON only, no prose, in exactly this shape:\n\
         {{\"isCorrectObject\": true or false, \"confidence\": number between 0 and 1, \
         \"detectedObjects\": [\"list\", \"of\", \"objects\", \"you\", \"see\"], \
         \"reasoning\": \"one short sentence\"}}"
    )
}

/// The JSON shape the model is instructed to return.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Judgment {
    is_correct_object: bool,
    #[serde(default)]
    confidence: f64,
    #[serde(default)]
    detected_objects: Vec<String>,
    #[serde(default)]
    reasoning: String,
}

/// Parse the model's message content into an outcome.
///
/// Returns `None` when the content is not a usable judgment; the caller
/// degrades that to [`VerificationOutcome::unavailable`].
pub fn parse_judgment(content: &str) -> Option<VerificationOutcome> {
    let stripped = strip_code_fences(content);
    let judgment: Judgment = serde_json::from_str(stripped.trim()).ok()?;

    let rejection_reason = if judgment.is_correct_object {
        None
    } else if judgment.reasoning.is_empty() {
        Some("The expected object was not the main subject of the photo".to_string())
    } else {
        Some(judgment.reasoning)
    };

    Some(VerificationOutcome {
        accepted: judgment.is_correct_object,
        confidence: clamp_confidence(judgment.confidence),
        detected_labels: judgment.detected_objects,
        rejection_reason,
    })
}

/// Remove a surrounding Markdown code fence, if present.
///
/// Models routinely wrap JSON in ```json ... ``` despite instructions not
/// to.
fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop an optional language tag after the opening fence.
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use photoproof_core::verification::VERIFICATION_UNAVAILABLE;

    #[test]
    fn parses_an_accepting_judgment() {
        let content = r#"{"isCorrectObject": true, "confidence": 0.93,
            "detectedObjects": ["smartphone", "hand"], "reasoning": "A phone fills the frame."}"#;
        let outcome = parse_judgment(content).unwrap();
        assert!(outcome.accepted);
        assert_eq!(outcome.confidence, 0.93);
        assert_eq!(outcome.detected_labels, vec!["smartphone", "hand"]);
        assert_eq!(outcome.rejection_reason, None);
    }

    #[test]
    fn parses_a_rejecting_judgment_with_reason() {
        let content = r#"{"isCorrectObject": false, "confidence": 0.2,
            "detectedObjects": ["mug"], "reasoning": "The photo shows a mug, not a phone."}"#;
        let outcome = parse_judgment(content).unwrap();
        assert!(!outcome.accepted);
        assert_eq!(
            outcome.rejection_reason.as_deref(),
            Some("The photo shows a mug, not a phone.")
        );
    }

    #[test]
    fn rejection_without_reasoning_gets_a_default_reason() {
        let content = r#"{"isCorrectObject": false, "confidence": 0.1}"#;
        let outcome = parse_judgment(content).unwrap();
        assert!(outcome.rejection_reason.is_some());
    }

    #[test]
    fn clamps_out_of_range_confidence() {
        let content = r#"{"isCorrectObject": true, "confidence": 42.0, "detectedObjects": []}"#;
        let outcome = parse_judgment(content).unwrap();
        assert_eq!(outcome.confidence, 1.0);
    }

    #[test]
    fn strips_a_json_code_fence() {
        let content = "```json\n{\"isCorrectObject\": true, \"confidence\": 0.8}\n```";
        let outcome = parse_judgment(content).unwrap();
        assert!(outcome.accepted);
    }

    #[test]
    fn strips_a_bare_code_fence() {
        let content = "```\n{\"isCorrectObject\": false, \"confidence\": 0.5}\n```";
        assert!(parse_judgment(content).is_some());
    }

    #[test]
    fn malformed_content_is_not_a_judgment() {
        assert!(parse_judgment("I think that's a phone!").is_none());
        assert!(parse_judgment("").is_none());
        assert!(parse_judgment("{\"isCorrectObject\": \"maybe\"}").is_none());
    }

    #[test]
    fn unparseable_content_degrades_to_the_canonical_failure() {
        let outcome = parse_judgment("not json")
            .unwrap_or_else(VerificationOutcome::unavailable);
        assert!(!outcome.accepted);
        assert_eq!(
            outcome.rejection_reason.as_deref(),
            Some(VERIFICATION_UNAVAILABLE)
        );
    }

    #[test]
    fn instructions_name_the_expected_object() {
        let text = build_instructions("fire extinguisher");
        assert!(text.contains("\"fire extinguisher\""));
        assert!(text.contains("isCorrectObject"));
    }
}
