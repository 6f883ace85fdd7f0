//! Completion provider abstractions and implementations.
//!
//! The generation pipeline talks to a [`CompletionProvider`] so the
//! OpenAI backend can be swapped for the mock in tests.

pub mod mock;
pub mod openai;

use async_trait::async_trait;
use thiserror::Error;

/// Error type for provider operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    #[error("Rate limited by completion service")]
    RateLimited,

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Completion service returned no content")]
    EmptyResponse,

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Completion request timed out")]
    Timeout,
}

impl ProviderError {
    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::NotConfigured(_) => "not_configured",
            ProviderError::Unauthorized(_) => "unauthorized",
            ProviderError::RateLimited => "rate_limited",
            ProviderError::ApiError(_) => "api_error",
            ProviderError::EmptyResponse => "empty_response",
            ProviderError::NetworkError(_) => "network_error",
            ProviderError::Timeout => "timeout",
        }
    }
}

/// One chat-completion call: a system instruction plus a single user turn.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub prompt: String,
    pub temperature: f32,
}

/// Trait for chat-completion backends (e.g., OpenAI).
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Return the text of the top completion choice.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError>;

    /// Offline readiness check; does not call the remote service.
    async fn health_check(&self) -> Result<(), ProviderError>;

    /// Provider label for logs and metrics.
    fn name(&self) -> &'static str;

    /// Model identifier sent with every request.
    fn model(&self) -> &str;
}
