//! Failure kinds of the generation pipeline.

use crate::services::providers::ProviderError;
use service_core::error::AppError;
use thiserror::Error;
use validator::{ValidationErrors, ValidationErrorsKind};

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Completion service error: {0}")]
    Upstream(#[from] ProviderError),

    #[error("Malformed response from completion service ({reason}): {text}")]
    MalformedResponse { reason: String, text: String },

    #[error("Card {index} does not match the flashcard schema: {reason}")]
    SchemaViolation { index: usize, reason: String },
}

impl GenerationError {
    /// Short label used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            GenerationError::Validation(_) => "validation",
            GenerationError::Upstream(_) => "upstream",
            GenerationError::MalformedResponse { .. } => "malformed_response",
            GenerationError::SchemaViolation { .. } => "schema_violation",
        }
    }
}

impl From<ValidationErrors> for GenerationError {
    fn from(errors: ValidationErrors) -> Self {
        let mut messages = Vec::new();
        collect_messages(&errors, &mut messages);
        messages.sort();
        GenerationError::Validation(messages.join("; "))
    }
}

/// Flatten field, nested-struct and list errors. List entries are
/// prefixed with their position, e.g. `cards[1]: answer must not be empty`.
fn collect_messages(errors: &ValidationErrors, out: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        match kind {
            ValidationErrorsKind::Field(errs) => {
                out.extend(errs.iter().map(|e| match &e.message {
                    Some(msg) => msg.to_string(),
                    None => format!("{} is invalid ({})", field, e.code),
                }));
            }
            ValidationErrorsKind::Struct(inner) => collect_messages(inner, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    let mut nested = Vec::new();
                    collect_messages(inner, &mut nested);
                    out.extend(
                        nested
                            .into_iter()
                            .map(|msg| format!("{}[{}]: {}", field, index, msg)),
                    );
                }
            }
        }
    }
}

impl From<GenerationError> for AppError {
    fn from(err: GenerationError) -> Self {
        match err {
            GenerationError::Validation(msg) => AppError::UnprocessableEntity(msg),
            GenerationError::Upstream(ProviderError::Timeout) => {
                AppError::GatewayTimeout(ProviderError::Timeout.to_string())
            }
            GenerationError::Upstream(e) => AppError::BadGateway(e.to_string()),
            other => AppError::InternalError(anyhow::Error::new(other)),
        }
    }
}
