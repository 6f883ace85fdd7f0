use crate::extract::ValidatedJson;
use crate::models::{GenerationRequest, GenerationResult};
use crate::startup::AppState;
use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    Extension, Json,
};
use service_core::error::AppError;
use service_core::middleware::RequestId;

#[tracing::instrument(
    skip_all,
    fields(request_id = %request_id.as_str(), num_cards = request.num_cards)
)]
pub async fn generate_cards(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    ValidatedJson(request): ValidatedJson<GenerationRequest>,
) -> Result<Json<GenerationResult>, AppError> {
    let result = state.generator.generate(&request).await?;
    Ok(Json(result))
}

/// Render a deck as a downloadable plain-text study sheet.
pub async fn export_cards(
    ValidatedJson(deck): ValidatedJson<GenerationResult>,
) -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"flashcards.txt\"",
            ),
        ],
        deck.to_plain_text(),
    )
}
