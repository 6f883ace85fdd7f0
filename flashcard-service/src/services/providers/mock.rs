//! Mock provider implementation for testing.

use super::{CompletionProvider, CompletionRequest, ProviderError};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;

/// Mock completion provider that returns a fixed reply and records calls.
pub struct MockCompletionProvider {
    reply: Result<String, ProviderError>,
    calls: AtomicUsize,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl MockCompletionProvider {
    /// Provider whose every completion is `text`.
    pub fn replying(text: impl Into<String>) -> Self {
        Self::new(Ok(text.into()))
    }

    /// Provider whose every completion fails with `error`.
    pub fn failing(error: ProviderError) -> Self {
        Self::new(Err(error))
    }

    fn new(reply: Result<String, ProviderError>) -> Self {
        Self {
            reply,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Number of completions requested so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Requests received so far, oldest first.
    pub async fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl CompletionProvider for MockCompletionProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().await.push(request.clone());
        self.reply.clone()
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        match &self.reply {
            Err(ProviderError::NotConfigured(msg)) => {
                Err(ProviderError::NotConfigured(msg.clone()))
            }
            _ => Ok(()),
        }
    }

    fn name(&self) -> &'static str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-model"
    }
}
