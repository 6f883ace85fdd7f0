//! Application startup and lifecycle management.

use crate::config::FlashcardConfig;
use crate::handlers::{
    cards::{export_cards, generate_cards},
    health::{health_check, not_found, readiness_check, root},
    metrics::metrics,
};
use crate::services::metrics::init_metrics;
use crate::services::providers::openai::OpenAiProvider;
use crate::services::providers::CompletionProvider;
use crate::services::FlashcardGenerator;
use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{request_id_middleware, REQUEST_ID_HEADER};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub generator: FlashcardGenerator,
}

impl AppState {
    /// State backed by the given completion provider.
    pub fn new(config: &FlashcardConfig, provider: Arc<dyn CompletionProvider>) -> Self {
        let generator = FlashcardGenerator::new(provider, config.completion.temperature);
        Self { generator }
    }
}

/// Build the HTTP router with all middleware applied.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/generate-cards", post(generate_cards))
        .route("/export-cards", post(export_cards))
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/metrics", get(metrics))
        .fallback(not_found)
        // Any origin, method and header: suitable for local development only.
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: FlashcardConfig) -> Result<Self, AppError> {
        let provider = OpenAiProvider::new(config.completion.provider_config())
            .map_err(|e| AppError::ConfigError(anyhow::anyhow!(e)))?;
        Self::build_with_provider(config, Arc::new(provider)).await
    }

    /// Build with an explicit provider (used by tests to avoid the network).
    pub async fn build_with_provider(
        config: FlashcardConfig,
        provider: Arc<dyn CompletionProvider>,
    ) -> Result<Self, AppError> {
        init_metrics().map_err(|e| {
            AppError::InternalError(anyhow::anyhow!("Failed to initialize metrics: {}", e))
        })?;

        if provider.health_check().await.is_err() {
            tracing::warn!(
                provider = provider.name(),
                "Completion provider is not configured; generation requests will fail until it is"
            );
        }

        tracing::info!(
            provider = provider.name(),
            model = %provider.model(),
            "Initialized completion provider"
        );

        let state = AppState::new(&config, provider);

        // Port 0 = random port for testing
        let address = config.common.address();
        let listener = TcpListener::bind(&address).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", address, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Flashcard service listening on port {}", port);

        Ok(Self {
            port,
            listener,
            state,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Serve until SIGINT/SIGTERM.
    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        let router = build_router(self.state);

        axum::serve(self.listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| {
                tracing::error!("HTTP server error: {}", e);
                std::io::Error::other(format!("HTTP server error: {}", e))
            })
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
