//! Gemini API HTTP Client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::config::GeminiConfig;
use crate::error::{Error, Result};

use super::types::*;

/// Remote generative-language capability
///
/// Given a full request (history, new turn, configuration) produce a reply
/// or fail. Implemented by [`GeminiClient`]; tests substitute their own.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn generate_content(&self, request: &GenerateContentRequest) -> Result<GenerateContentResponse>;
}

/// Gemini REST API client
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    /// Create a new client for the configured model
    pub fn new(config: &GeminiConfig, api_key: impl Into<String>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().map_err(Error::Http)?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Get the model name
    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl ChatBackend for GeminiClient {
    async fn generate_content(&self, request: &GenerateContentRequest) -> Result<GenerateContentResponse> {
        let url = self.endpoint();

        debug!("Sending request to Gemini API: {} ({} turns)", url, request.contents.len());

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| Error::Backend(e.to_string()))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| Error::Backend(e.to_string()))?;

        if !status.is_success() {
            warn!("Gemini API error: {} - {}", status, body);
            return Err(Error::Backend(format!("{}: {}", status, error_message(&body))));
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body)
            .map_err(|e| Error::Backend(format!("Failed to parse response: {} - {}", e, body)))?;

        info!(
            "Gemini API response: candidates={}, tokens={}",
            parsed.candidates.len(),
            parsed
                .usage_metadata
                .as_ref()
                .map(|u| u.candidates_token_count)
                .unwrap_or(0)
        );

        Ok(parsed)
    }
}

/// Pull the human readable message out of an API error body
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorWrapper>(body)
        .ok()
        .and_then(|wrapper| {
            let message = wrapper.error.message?;
            Some(match wrapper.error.status {
                Some(status) if !status.is_empty() => format!("{}: {}", status, message),
                _ => message,
            })
        })
        .unwrap_or_else(|| body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> GeminiClient {
        client_with_timeout(server, None)
    }

    fn client_with_timeout(server: &MockServer, timeout_secs: Option<u64>) -> GeminiClient {
        let config = GeminiConfig {
            base_url: server.uri(),
            timeout_secs,
            ..GeminiConfig::default()
        };
        GeminiClient::new(&config, "test-key").unwrap()
    }

    fn request() -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content::user("Is my door locked?")],
            system_instruction: Some(Content::instruction("Home security only")),
            generation_config: Some(GenerationConfig::chat_defaults()),
        }
    }

    #[tokio::test]
    async fn test_generate_content_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.0-flash:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_partial_json(json!({
                "contents": [{"role": "user", "parts": [{"text": "Is my door locked?"}]}],
                "generationConfig": {"topK": 40}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"role": "model", "parts": [{"text": "Yes."}]}}],
                "usageMetadata": {"candidatesTokenCount": 2}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response = client_for(&server).generate_content(&request()).await.unwrap();
        assert_eq!(response.first_text(), Some("Yes."));
    }

    #[tokio::test]
    async fn test_generate_content_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": {"code": 400, "message": "API key not valid", "status": "INVALID_ARGUMENT"}
            })))
            .mount(&server)
            .await;

        let err = client_for(&server).generate_content(&request()).await.unwrap_err();
        match err {
            Error::Backend(msg) => {
                assert!(msg.contains("400"));
                assert!(msg.contains("INVALID_ARGUMENT: API key not valid"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_generate_content_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = client_for(&server).generate_content(&request()).await.unwrap_err();
        assert!(matches!(err, Error::Backend(_)));
    }

    #[tokio::test]
    async fn test_generate_content_empty_candidates() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
            .mount(&server)
            .await;

        let response = client_for(&server).generate_content(&request()).await.unwrap();
        assert!(response.first_text().is_none());
    }

    #[tokio::test]
    async fn test_slow_reply_without_timeout_succeeds() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(Duration::from_millis(1500))
                    .set_body_json(json!({"candidates": [{"content": {"parts": [{"text": "Done."}]}}]})),
            )
            .mount(&server)
            .await;

        let response = client_for(&server).generate_content(&request()).await.unwrap();
        assert_eq!(response.first_text(), Some("Done."));
    }

    #[tokio::test]
    async fn test_configured_timeout_cuts_off_slow_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(Duration::from_secs(3))
                    .set_body_json(json!({"candidates": []})),
            )
            .mount(&server)
            .await;

        let err = client_with_timeout(&server, Some(1))
            .generate_content(&request())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Backend(_)));
    }

    #[test]
    fn test_error_message_plain_body() {
        assert_eq!(error_message("upstream down"), "upstream down");
    }
}
