//! Card generation pipeline: validate, prompt, complete, parse.

use crate::error::GenerationError;
use crate::models::{GenerationRequest, GenerationResult};
use crate::services::metrics;
use crate::services::parser::parse_flashcards;
use crate::services::prompt::{build_prompt, SYSTEM_PROMPT};
use crate::services::providers::{CompletionProvider, CompletionRequest};
use std::sync::Arc;
use std::time::Instant;
use validator::Validate;

/// Runs one generation per call. Holds no per-request state, so a single
/// instance is shared by all handlers.
#[derive(Clone)]
pub struct FlashcardGenerator {
    provider: Arc<dyn CompletionProvider>,
    temperature: f32,
}

impl FlashcardGenerator {
    pub fn new(provider: Arc<dyn CompletionProvider>, temperature: f32) -> Self {
        Self {
            provider,
            temperature,
        }
    }

    pub fn provider(&self) -> &Arc<dyn CompletionProvider> {
        &self.provider
    }

    #[tracing::instrument(
        skip(self, request),
        fields(num_cards = request.num_cards, content_len = request.content.len())
    )]
    pub async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResult, GenerationError> {
        let result = self.run(request).await;

        match &result {
            Ok(deck) => metrics::record_generation("success", deck.len()),
            Err(e) => metrics::record_generation(e.kind(), 0),
        }

        result
    }

    async fn run(&self, request: &GenerationRequest) -> Result<GenerationResult, GenerationError> {
        request.validate()?;

        let completion = CompletionRequest {
            system: SYSTEM_PROMPT.to_string(),
            prompt: build_prompt(request),
            temperature: self.temperature,
        };

        let provider = self.provider.name();
        let model = self.provider.model().to_string();
        let started = Instant::now();

        let raw = self.provider.complete(&completion).await.map_err(|e| {
            metrics::record_provider_error(provider, e.kind());
            tracing::warn!(provider, model = %model, error = %e, "Completion request failed");
            e
        })?;

        metrics::record_provider_latency(provider, &model, started.elapsed().as_secs_f64());

        let cards = parse_flashcards(&raw).map_err(|e| {
            tracing::warn!(error_kind = e.kind(), error = %e, "Rejected completion output");
            e
        })?;

        let requested = usize::try_from(request.num_cards).unwrap_or(usize::MAX);
        if cards.is_empty() {
            tracing::warn!(requested, "Completion service returned no cards");
        } else if cards.len() != requested {
            tracing::debug!(requested, returned = cards.len(), "Card count differs from request");
        }

        tracing::info!(cards = cards.len(), model = %model, "Generated flashcards");

        Ok(GenerationResult::new(cards))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Flashcard;
    use crate::services::providers::mock::MockCompletionProvider;
    use crate::services::providers::ProviderError;

    fn generator(provider: Arc<MockCompletionProvider>) -> FlashcardGenerator {
        FlashcardGenerator::new(provider, 0.7)
    }

    #[tokio::test]
    async fn returns_cards_in_model_order() {
        let provider = Arc::new(MockCompletionProvider::replying(
            "```json\n[{\"question\":\"Q1\",\"answer\":\"A1\"},{\"question\":\"Q2\",\"answer\":\"A2\"}]\n```",
        ));

        let result = generator(provider.clone())
            .generate(&GenerationRequest::new("Some notes", 2))
            .await
            .unwrap();

        assert_eq!(
            result.cards,
            vec![Flashcard::new("Q1", "A1"), Flashcard::new("Q2", "A2")]
        );
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn sends_system_prompt_rendered_prompt_and_temperature() {
        let provider = Arc::new(MockCompletionProvider::replying("[]"));
        let request = GenerationRequest::new("Plate tectonics", 4);

        generator(provider.clone()).generate(&request).await.unwrap();

        let sent = provider.requests().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].system, SYSTEM_PROMPT);
        assert_eq!(sent[0].prompt, build_prompt(&request));
        assert_eq!(sent[0].temperature, 0.7);
    }

    #[tokio::test]
    async fn count_mismatch_is_accepted() {
        let provider = Arc::new(MockCompletionProvider::replying(
            r#"[{"question":"only","answer":"one"}]"#,
        ));

        let result = generator(provider)
            .generate(&GenerationRequest::new("notes", 5))
            .await
            .unwrap();
        assert_eq!(result.len(), 1);
    }

    #[tokio::test]
    async fn invalid_request_never_reaches_provider() {
        let provider = Arc::new(MockCompletionProvider::replying("[]"));

        let err = generator(provider.clone())
            .generate(&GenerationRequest::new("", 5))
            .await
            .unwrap_err();

        assert!(matches!(err, GenerationError::Validation(_)));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn provider_failures_surface_as_upstream() {
        let provider = Arc::new(MockCompletionProvider::failing(ProviderError::RateLimited));

        let err = generator(provider)
            .generate(&GenerationRequest::new("notes", 5))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            GenerationError::Upstream(ProviderError::RateLimited)
        ));
    }

    #[tokio::test]
    async fn schema_violation_fails_whole_request() {
        let provider = Arc::new(MockCompletionProvider::replying(
            r#"[{"question":"Q1","answer":"A1"},{"question":"Q2"}]"#,
        ));

        let err = generator(provider)
            .generate(&GenerationRequest::new("notes", 2))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            GenerationError::SchemaViolation { index: 1, .. }
        ));
    }
}
