use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use tracing::{debug, warn};

use super::models::{ChatMessage, ChatRequest, ChatResponse, ErrorResponse, TagsResponse};
use crate::api::{ModelClient, ModelError};
use crate::models::AnalysisRequest;

/// Client for a local Ollama server
pub struct OllamaClient {
    http_client: HttpClient,
    host: String,
}

impl OllamaClient {
    pub const DEFAULT_HOST: &'static str = "http://localhost:11434";

    pub fn new(host: &str, timeout: Duration) -> Result<Self, ModelError> {
        let http_client = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ModelError::RequestError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            host: host.trim_end_matches('/').to_string(),
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Parse error response based on HTTP status code
    async fn handle_error_response(status: reqwest::StatusCode, response: reqwest::Response) -> ModelError {
        let status_code = status.as_u16();
        let body_text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&body_text)
            .map(|e| e.error)
            .unwrap_or(body_text);

        match status_code {
            400 => ModelError::BadRequest(message),
            404 => ModelError::ModelNotFound(message),
            500..=599 => {
                warn!("Model server error {}: {}", status_code, message);
                ModelError::ServerError(status_code, message)
            }
            _ => ModelError::HttpError(status_code, message),
        }
    }

    /// Wire body for one analysis request: a single user message with the image attached
    pub fn chat_body(request: &AnalysisRequest) -> ChatRequest {
        ChatRequest {
            model: request.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: request.prompt_text.clone(),
                images: vec![request.encoded_image.clone()],
            }],
            stream: false,
        }
    }
}

#[async_trait]
impl ModelClient for OllamaClient {
    /// GET /api/tags
    async fn list_models(&self) -> Result<Vec<String>, ModelError> {
        let url = format!("{}/api/tags", self.host);

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| ModelError::RequestError(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(Self::handle_error_response(status, response).await);
        }

        let tags = response
            .json::<TagsResponse>()
            .await
            .map_err(|e| ModelError::DeserializationError(format!("Failed to parse response: {}", e)))?;

        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    /// POST /api/chat
    ///
    /// The reply's `message.content` is returned untouched.
    async fn chat(&self, request: &AnalysisRequest) -> Result<String, ModelError> {
        let url = format!("{}/api/chat", self.host);
        let body = Self::chat_body(request);
        debug!(
            "POST {} (model: {}, image: {} base64 chars)",
            url,
            request.model,
            request.encoded_image.len()
        );

        let response = self
            .http_client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ModelError::RequestError(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(Self::handle_error_response(status, response).await);
        }

        response
            .json::<ChatResponse>()
            .await
            .map(|r| r.message.content)
            .map_err(|e| ModelError::DeserializationError(format!("Failed to parse response: {}", e)))
    }
}

/// Whether `wanted` is in the catalog, accepting a tag suffix
/// (`llama3.2-vision:latest` satisfies `llama3.2-vision`)
pub fn model_available(catalog: &[String], wanted: &str) -> bool {
    catalog.iter().any(|name| {
        name == wanted
            || name
                .strip_prefix(wanted)
                .is_some_and(|rest| rest.starts_with(':'))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_available_matches_tags() {
        let catalog = vec!["llama3.2-vision:latest".to_string(), "llava:13b".to_string()];
        assert!(model_available(&catalog, "llama3.2-vision"));
        assert!(model_available(&catalog, "llava:13b"));
        assert!(!model_available(&catalog, "llama3.2"));
        assert!(!model_available(&catalog, "llava:7b"));
    }

    #[test]
    fn test_chat_body_shape() {
        let request = AnalysisRequest {
            model: "llama3.2-vision".into(),
            prompt_text: "Analyze".into(),
            encoded_image: "aGVsbG8=".into(),
        };
        let json = serde_json::to_value(OllamaClient::chat_body(&request)).unwrap();

        assert_eq!(json["model"], "llama3.2-vision");
        assert_eq!(json["stream"], false);
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "Analyze");
        assert_eq!(json["messages"][0]["images"][0], "aGVsbG8=");
    }

    #[test]
    fn test_chat_response_parses() {
        let body = r#"{"model":"llama3.2-vision","created_at":"2024-12-14T10:00:00Z",
            "message":{"role":"assistant","content":"**Recommendation: Hold**"},"done":true}"#;
        let parsed: ChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.message.content, "**Recommendation: Hold**");
        assert!(parsed.message.images.is_empty());
    }

    #[test]
    fn test_host_trailing_slash_trimmed() {
        let client = OllamaClient::new("http://localhost:11434/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.host(), "http://localhost:11434");
    }
}
