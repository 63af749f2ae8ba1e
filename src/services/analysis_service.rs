use std::future::Future;
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use thiserror::Error;
use tracing::{info, warn};

use crate::api::ollama::model_available;
use crate::api::{ModelClient, ModelError};
use crate::models::{AnalysisMode, AnalysisRequest, ModelRouting};
use crate::utils::retry::{retry_with_sleep, RetryPolicy};
use crate::utils::TempArtifact;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Model call failed after {attempts} attempt(s): {source}")]
    ModelCall {
        attempts: u32,
        #[source]
        source: ModelError,
    },
    #[error("Failed to read chart snapshot: {0}")]
    Snapshot(#[from] std::io::Error),
    #[error("Chart snapshot is empty")]
    EmptyImage,
}

/// Base64 (standard alphabet, padded) for the text-only request payload
pub fn encode_image(bytes: &[u8]) -> String {
    BASE64.encode(bytes)
}

/// Pair the mode's fixed prompt with the encoded image for the mode's model
pub fn build_request(image: &[u8], mode: AnalysisMode, routing: &ModelRouting) -> AnalysisRequest {
    AnalysisRequest {
        model: routing.model_for(mode).to_string(),
        prompt_text: mode.prompt().to_string(),
        encoded_image: encode_image(image),
    }
}

/// Send the chart image to the model and return its text unmodified.
///
/// Every failure is retried under `policy`; the last one is returned.
pub async fn analyze(
    client: &dyn ModelClient,
    image: &[u8],
    mode: AnalysisMode,
    routing: &ModelRouting,
    policy: &RetryPolicy,
) -> Result<String, AnalysisError> {
    analyze_with_sleep(client, image, mode, routing, policy, tokio::time::sleep).await
}

async fn analyze_with_sleep<S, SFut>(
    client: &dyn ModelClient,
    image: &[u8],
    mode: AnalysisMode,
    routing: &ModelRouting,
    policy: &RetryPolicy,
    sleep: S,
) -> Result<String, AnalysisError>
where
    S: FnMut(Duration) -> SFut,
    SFut: Future<Output = ()>,
{
    if image.is_empty() {
        return Err(AnalysisError::EmptyImage);
    }

    let request = build_request(image, mode, routing);
    info!(
        "Requesting {} analysis from {} ({} byte image)",
        mode,
        request.model,
        image.len()
    );

    retry_with_sleep(policy, "Model analysis", |_| client.chat(&request), sleep)
        .await
        .map_err(|source| AnalysisError::ModelCall {
            attempts: policy.max_attempts.max(1),
            source,
        })
}

/// Analyze a rasterized chart file, consuming it.
///
/// The file is removed when this returns, whatever the outcome.
pub async fn analyze_snapshot(
    client: &dyn ModelClient,
    snapshot: TempArtifact,
    mode: AnalysisMode,
    routing: &ModelRouting,
    policy: &RetryPolicy,
) -> Result<String, AnalysisError> {
    let bytes = snapshot.read()?;
    analyze(client, &bytes, mode, routing, policy).await
}

/// Start-up check against the model catalog.
///
/// An unreachable server is an error. A configured model that is missing only
/// produces a warning; the names of missing models are returned.
pub async fn preflight(client: &dyn ModelClient, routing: &ModelRouting) -> Result<Vec<String>, ModelError> {
    let catalog = client.list_models().await?;
    info!("Model server reachable, {} model(s) available", catalog.len());

    let missing: Vec<String> = routing
        .distinct_models()
        .into_iter()
        .filter(|m| !model_available(&catalog, m))
        .map(str::to_string)
        .collect();

    for model in &missing {
        warn!("{} model not found on the model server. Please pull it first.", model);
    }

    Ok(missing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays scripted replies and records every request
    struct ScriptedClient {
        replies: Mutex<VecDeque<Result<String, ModelError>>>,
        requests: Mutex<Vec<AnalysisRequest>>,
        catalog: Result<Vec<String>, ModelError>,
    }

    impl ScriptedClient {
        fn new(replies: Vec<Result<String, ModelError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                requests: Mutex::new(Vec::new()),
                catalog: Ok(vec!["llama3.2-vision:latest".to_string()]),
            }
        }

        fn calls(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ModelClient for ScriptedClient {
        async fn list_models(&self) -> Result<Vec<String>, ModelError> {
            self.catalog.clone()
        }

        async fn chat(&self, request: &AnalysisRequest) -> Result<String, ModelError> {
            self.requests.lock().unwrap().push(request.clone());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ModelError::RequestError("no scripted reply".into())))
        }
    }

    fn unavailable() -> ModelError {
        ModelError::RequestError("connection refused".into())
    }

    fn routing() -> ModelRouting {
        ModelRouting::single("llama3.2-vision")
    }

    #[test]
    fn test_build_request_encodes_image_and_picks_model() {
        let routing = ModelRouting {
            basic: "basic-model".into(),
            advanced: "pattern-model".into(),
        };
        let request = build_request(b"hello", AnalysisMode::AdvancedPattern, &routing);

        assert_eq!(request.encoded_image, "aGVsbG8=");
        assert_eq!(request.model, "pattern-model");
        assert_eq!(request.prompt_text, AnalysisMode::AdvancedPattern.prompt());
    }

    #[tokio::test]
    async fn test_succeeds_on_third_attempt() {
        let client = ScriptedClient::new(vec![
            Err(unavailable()),
            Err(ModelError::ServerError(500, "loading".into())),
            Ok("Recommendation: BUY".into()),
        ]);
        let mut delays = Vec::new();

        let result = analyze_with_sleep(
            &client,
            b"png",
            AnalysisMode::Basic,
            &routing(),
            &RetryPolicy::default(),
            |d| {
                delays.push(d);
                std::future::ready(())
            },
        )
        .await;

        assert_eq!(result.unwrap(), "Recommendation: BUY");
        assert_eq!(client.calls(), 3);
        assert_eq!(delays, vec![Duration::from_secs(2); 2]);
    }

    #[tokio::test]
    async fn test_three_failures_propagate() {
        let client = ScriptedClient::new(vec![Err(unavailable()), Err(unavailable()), Err(unavailable())]);
        let mut delay_count = 0;

        let result = analyze_with_sleep(
            &client,
            b"png",
            AnalysisMode::Basic,
            &routing(),
            &RetryPolicy::default(),
            |_| {
                delay_count += 1;
                std::future::ready(())
            },
        )
        .await;

        assert!(matches!(result, Err(AnalysisError::ModelCall { attempts: 3, .. })));
        assert_eq!(client.calls(), 3);
        assert_eq!(delay_count, 2);
    }

    #[tokio::test]
    async fn test_zero_attempt_policy_reports_single_call() {
        let client = ScriptedClient::new(vec![Err(unavailable())]);
        let policy = RetryPolicy {
            max_attempts: 0,
            delay: Duration::ZERO,
        };

        let result = analyze(&client, b"png", AnalysisMode::Basic, &routing(), &policy).await;

        assert!(matches!(result, Err(AnalysisError::ModelCall { attempts: 1, .. })));
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test]
    async fn test_content_returned_unmodified() {
        let text = "  **HOLD**\n\n- RSI neutral\n";
        let client = ScriptedClient::new(vec![Ok(text.into())]);
        let policy = RetryPolicy::new(3, Duration::ZERO);

        let result = analyze(&client, b"png", AnalysisMode::Basic, &routing(), &policy).await;
        assert_eq!(result.unwrap(), text);
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test]
    async fn test_empty_image_never_calls_model() {
        let client = ScriptedClient::new(vec![Ok("unused".into())]);
        let policy = RetryPolicy::new(3, Duration::ZERO);

        let result = analyze(&client, &[], AnalysisMode::Basic, &routing(), &policy).await;
        assert!(matches!(result, Err(AnalysisError::EmptyImage)));
        assert_eq!(client.calls(), 0);
    }

    #[tokio::test]
    async fn test_snapshot_removed_after_success() {
        let client = ScriptedClient::new(vec![Ok("SELL".into())]);
        let snapshot = TempArtifact::with_bytes("test_chart", "png", b"\x89PNG fake").unwrap();
        let path = snapshot.path().to_path_buf();
        let policy = RetryPolicy::new(3, Duration::ZERO);

        let result = analyze_snapshot(&client, snapshot, AnalysisMode::Basic, &routing(), &policy).await;

        assert_eq!(result.unwrap(), "SELL");
        assert!(!path.exists());
        let sent = client.requests.lock().unwrap();
        assert_eq!(sent[0].encoded_image, encode_image(b"\x89PNG fake"));
    }

    #[tokio::test]
    async fn test_snapshot_removed_after_failure() {
        let client = ScriptedClient::new(vec![]);
        let snapshot = TempArtifact::with_bytes("test_chart", "png", b"\x89PNG fake").unwrap();
        let path = snapshot.path().to_path_buf();
        let policy = RetryPolicy::new(3, Duration::ZERO);

        let result = analyze_snapshot(&client, snapshot, AnalysisMode::Basic, &routing(), &policy).await;

        assert!(result.is_err());
        assert_eq!(client.calls(), 3);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_preflight_reports_missing_models() {
        let client = ScriptedClient::new(vec![]);
        let routing = ModelRouting {
            basic: "llama3.2-vision".into(),
            advanced: "llava:34b".into(),
        };

        let missing = preflight(&client, &routing).await.unwrap();
        assert_eq!(missing, vec!["llava:34b".to_string()]);
    }

    #[tokio::test]
    async fn test_preflight_fails_when_unreachable() {
        let mut client = ScriptedClient::new(vec![]);
        client.catalog = Err(unavailable());

        assert!(preflight(&client, &routing()).await.is_err());
    }
}
