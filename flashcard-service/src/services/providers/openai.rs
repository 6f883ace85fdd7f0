//! OpenAI chat-completions provider.
//!
//! Sends one non-streaming `POST {base_url}/chat/completions` per call and
//! returns the content of the first choice.

use super::{CompletionProvider, CompletionRequest, ProviderError};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Upper bound on how much of an upstream error body is kept in messages.
const MAX_ERROR_BODY_CHARS: usize = 500;

/// OpenAI provider configuration.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// Absent keys are reported on the first call, not at construction.
    pub api_key: Option<Secret<String>>,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

/// OpenAI chat-completion provider.
pub struct OpenAiProvider {
    config: OpenAiConfig,
    client: Client,
}

impl OpenAiProvider {
    pub fn new(config: OpenAiConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                ProviderError::NotConfigured(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { config, client })
    }

    fn api_url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    fn api_key(&self) -> Result<&Secret<String>, ProviderError> {
        self.config
            .api_key
            .as_ref()
            .ok_or_else(|| ProviderError::NotConfigured("OPENAI_API_KEY is not set".to_string()))
    }
}

fn transport_error(err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout
    } else {
        ProviderError::NetworkError(err.to_string())
    }
}

/// Prefer the structured `error.message` field, falling back to the raw body.
fn error_detail(body: &str) -> String {
    let detail = serde_json::from_str::<ApiErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| body.trim().to_string());
    detail.chars().take(MAX_ERROR_BODY_CHARS).collect()
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        let api_key = self.api_key()?;

        let body = ChatCompletionRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.prompt,
                },
            ],
            temperature: request.temperature,
        };

        tracing::debug!(
            model = %self.config.model,
            prompt_len = request.prompt.len(),
            temperature = request.temperature,
            "Sending request to OpenAI API"
        );

        let response = self
            .client
            .post(self.api_url())
            .bearer_auth(api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let detail = error_detail(&error_text);

            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    ProviderError::Unauthorized(detail)
                }
                StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimited,
                _ => ProviderError::ApiError(format!("OpenAI API error {}: {}", status, detail)),
            });
        }

        let api_response: ChatCompletionResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::Timeout
            } else {
                ProviderError::ApiError(format!("Failed to parse response: {}", e))
            }
        })?;

        let text = api_response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(ProviderError::EmptyResponse)?;

        tracing::debug!(
            model = %self.config.model,
            response_len = text.len(),
            "Received completion from OpenAI API"
        );

        Ok(text)
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        self.api_key().map(|_| ())
    }

    fn name(&self) -> &'static str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

// ============================================================================
// OpenAI API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(api_key: Option<&str>, base_url: &str) -> OpenAiConfig {
        OpenAiConfig {
            api_key: api_key.map(|k| Secret::new(k.to_string())),
            base_url: base_url.to_string(),
            model: "gpt-3.5-turbo".to_string(),
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn api_url_tolerates_trailing_slash() {
        let provider = OpenAiProvider::new(config(None, "https://api.openai.com/v1/")).unwrap();
        assert_eq!(
            provider.api_url(),
            "https://api.openai.com/v1/chat/completions"
        );
    }

    #[test]
    fn error_detail_prefers_structured_message() {
        let body = r#"{"error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}}"#;
        assert_eq!(error_detail(body), "Incorrect API key provided");
        assert_eq!(error_detail("  gateway exploded \n"), "gateway exploded");
    }

    #[test]
    fn error_detail_is_truncated() {
        let body = "x".repeat(2 * MAX_ERROR_BODY_CHARS);
        assert_eq!(error_detail(&body).len(), MAX_ERROR_BODY_CHARS);
    }

    #[test]
    fn request_body_matches_chat_completions_shape() {
        let body = ChatCompletionRequest {
            model: "gpt-3.5-turbo",
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: "sys",
                },
                ChatMessage {
                    role: "user",
                    content: "hi",
                },
            ],
            temperature: 0.5,
        };

        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({
                "model": "gpt-3.5-turbo",
                "messages": [
                    { "role": "system", "content": "sys" },
                    { "role": "user", "content": "hi" }
                ],
                "temperature": 0.5
            })
        );
    }

    #[tokio::test]
    async fn health_check_reports_missing_key() {
        let provider = OpenAiProvider::new(config(None, "http://localhost")).unwrap();
        assert!(matches!(
            provider.health_check().await,
            Err(ProviderError::NotConfigured(_))
        ));

        let provider = OpenAiProvider::new(config(Some("sk-test"), "http://localhost")).unwrap();
        assert!(provider.health_check().await.is_ok());
    }
}
