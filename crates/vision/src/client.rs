//! HTTP client for an OpenAI-compatible vision chat-completions endpoint.

use std::time::Duration;

use async_trait::async_trait;
use photoproof_core::verification::VerificationOutcome;
use serde::Deserialize;
use serde_json::json;

use crate::judgment::{build_instructions, parse_judgment};

/// Default model when `VISION_MODEL` is unset.
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Default upstream timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for the vision endpoint, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct VisionConfig {
    /// Base URL of the OpenAI-compatible API (e.g. `https://api.openai.com/v1`).
    pub api_url: String,
    /// Bearer token for the endpoint.
    pub api_key: String,
    /// Model name sent with every request.
    pub model: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl VisionConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var               | Default                      |
    /// |-----------------------|------------------------------|
    /// | `VISION_API_URL`      | `https://api.openai.com/v1`  |
    /// | `VISION_API_KEY`      | (required)                   |
    /// | `VISION_MODEL`        | `gpt-4o-mini`                |
    /// | `VISION_TIMEOUT_SECS` | `30`                         |
    pub fn from_env() -> Self {
        let api_url = std::env::var("VISION_API_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1".into());
        let api_key = std::env::var("VISION_API_KEY").expect("VISION_API_KEY must be set");
        let model = std::env::var("VISION_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into());
        let timeout_secs: u64 = std::env::var("VISION_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_TIMEOUT_SECS.to_string())
            .parse()
            .expect("VISION_TIMEOUT_SECS must be a valid u64");

        Self {
            api_url,
            api_key,
            model,
            timeout_secs,
        }
    }
}

/// The seam the session engine verifies photos through.
///
/// Infallible by contract: implementations must degrade every failure to
/// [`VerificationOutcome::unavailable`] rather than returning an error.
#[async_trait]
pub trait ObjectVerifier: Send + Sync {
    /// Judge whether `photo_data_uri` shows `expected_object` as its main
    /// subject.
    async fn verify(&self, photo_data_uri: &str, expected_object: &str) -> VerificationOutcome;
}

/// Internal error detail, used only for log granularity -- never surfaced
/// to callers.
#[derive(Debug, thiserror::Error)]
enum VisionError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Vision API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Response contained no message content")]
    MissingContent,

    #[error("Model content was not a parseable judgment")]
    MalformedJudgment,
}

/// Response shape of the `/chat/completions` endpoint, reduced to the
/// fields this client reads.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    content: Option<String>,
}

/// Client for the vision endpoint.
pub struct VisionClient {
    client: reqwest::Client,
    config: VisionConfig,
}

impl VisionClient {
    /// Create a client with its own connection pool and the configured
    /// timeout.
    pub fn new(config: VisionConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();
        Self { client, config }
    }

    /// The fallible request path; [`ObjectVerifier::verify`] flattens its
    /// errors.
    async fn request_judgment(
        &self,
        photo_data_uri: &str,
        expected_object: &str,
    ) -> Result<VerificationOutcome, VisionError> {
        let body = json!({
            "model": self.config.model,
            "messages": [{
                "role": "user",
                "content": [
                    { "type": "text", "text": build_instructions(expected_object) },
                    { "type": "image_url", "image_url": { "url": photo_data_uri } },
                ],
            }],
            "max_tokens": 500,
            "response_format": { "type": "json_object" },
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.api_url))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(VisionError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response.json().await?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(VisionError::MissingContent)?;

        parse_judgment(&content).ok_or(VisionError::MalformedJudgment)
    }
}

#[async_trait]
impl ObjectVerifier for VisionClient {
    async fn verify(&self, photo_data_uri: &str, expected_object: &str) -> VerificationOutcome {
        match self.request_judgment(photo_data_uri, expected_object).await {
            Ok(outcome) => outcome,
            Err(err) => {
                // Upstream failure is a normal negative outcome for the
                // caller; the detail lives only in the logs.
                tracing::warn!(error = %err, expected_object, "Vision verification failed");
                VerificationOutcome::unavailable()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use photoproof_core::verification::VERIFICATION_UNAVAILABLE;

    /// A stub verifier other crates' tests also reimplement; here it pins
    /// down the trait-object ergonomics.
    struct AlwaysNo;

    #[async_trait]
    impl ObjectVerifier for AlwaysNo {
        async fn verify(&self, _photo: &str, _expected: &str) -> VerificationOutcome {
            VerificationOutcome::unavailable()
        }
    }

    #[tokio::test]
    async fn trait_object_dispatch_works() {
        let verifier: std::sync::Arc<dyn ObjectVerifier> = std::sync::Arc::new(AlwaysNo);
        let outcome = verifier.verify("data:image/png;base64,AAAA", "phone").await;
        assert!(!outcome.accepted);
        assert_eq!(
            outcome.rejection_reason.as_deref(),
            Some(VERIFICATION_UNAVAILABLE)
        );
    }

    #[tokio::test]
    async fn unreachable_endpoint_degrades_to_unavailable() {
        // Reserved TEST-NET address: the connection fails fast and must be
        // swallowed into the canonical negative outcome.
        let client = VisionClient::new(VisionConfig {
            api_url: "http://192.0.2.1:9".into(),
            api_key: "test-key".into(),
            model: "test-model".into(),
            timeout_secs: 1,
        });
        let outcome = client.verify("data:image/png;base64,AAAA", "phone").await;
        assert!(!outcome.accepted);
        assert_eq!(outcome.confidence, 0.0);
        assert!(outcome.detected_labels.is_empty());
        assert_eq!(
            outcome.rejection_reason.as_deref(),
            Some(VERIFICATION_UNAVAILABLE)
        );
    }

    #[test]
    fn chat_response_shape_parses() {
        let raw = r#"{"choices":[{"message":{"content":"{\"isCorrectObject\":true,\"confidence\":0.9}"}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(raw).unwrap();
        let content = parsed.choices[0].message.content.as_deref().unwrap();
        assert!(parse_judgment(content).unwrap().accepted);
    }
}
