use crate::startup::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use service_core::error::AppError;

/// Landing endpoint kept for clients that poll `/` to see if the API is up.
pub async fn root() -> impl IntoResponse {
    Json(json!({ "message": "Flashcard Generator API is running" }))
}

/// Liveness probe. Always 200; reports provider configuration without
/// calling the completion service.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let provider = state.generator.provider();
    let provider_status = match provider.health_check().await {
        Ok(()) => "configured".to_string(),
        Err(e) => e.to_string(),
    };

    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "service": "flashcard-service",
            "version": env!("CARGO_PKG_VERSION"),
            "completion_provider": {
                "name": provider.name(),
                "model": provider.model(),
                "status": provider_status,
            }
        })),
    )
}

/// Readiness probe. 503 until the completion provider is usable.
pub async fn readiness_check(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state
        .generator
        .provider()
        .health_check()
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, "Completion provider not ready");
            AppError::ServiceUnavailable
        })?;

    Ok(StatusCode::OK)
}

/// JSON 404 for unknown routes.
pub async fn not_found() -> AppError {
    AppError::NotFound(anyhow::anyhow!("Route not found"))
}
