//! Prometheus metrics for flashcard-service.
//!
//! Recording helpers are no-ops until [`init_metrics`] has run, so library
//! code and tests can call them unconditionally.

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::OnceLock;

static METRICS: OnceLock<Metrics> = OnceLock::new();

struct Metrics {
    registry: Registry,
    generations_total: IntCounterVec,
    cards_generated_total: IntCounter,
    provider_latency_seconds: HistogramVec,
    provider_errors_total: IntCounterVec,
}

impl Metrics {
    fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        // outcome: "success" or a GenerationError kind
        let generations_total = IntCounterVec::new(
            Opts::new(
                "flashcard_generations_total",
                "Total card generation requests by outcome",
            ),
            &["outcome"],
        )?;

        let cards_generated_total = IntCounter::new(
            "flashcard_cards_generated_total",
            "Total cards returned to callers",
        )?;

        let provider_latency_seconds = HistogramVec::new(
            HistogramOpts::new(
                "flashcard_provider_latency_seconds",
                "Completion provider latency in seconds",
            )
            .buckets(vec![0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0, 120.0]),
            &["provider", "model"],
        )?;

        let provider_errors_total = IntCounterVec::new(
            Opts::new(
                "flashcard_provider_errors_total",
                "Total completion provider errors",
            ),
            &["provider", "error_type"],
        )?;

        registry.register(Box::new(generations_total.clone()))?;
        registry.register(Box::new(cards_generated_total.clone()))?;
        registry.register(Box::new(provider_latency_seconds.clone()))?;
        registry.register(Box::new(provider_errors_total.clone()))?;

        Ok(Self {
            registry,
            generations_total,
            cards_generated_total,
            provider_latency_seconds,
            provider_errors_total,
        })
    }
}

/// Initialize all metrics. Later calls are ignored.
pub fn init_metrics() -> Result<(), prometheus::Error> {
    if METRICS.get().is_some() {
        return Ok(());
    }

    let metrics = Metrics::new()?;
    if METRICS.set(metrics).is_ok() {
        tracing::info!("Prometheus metrics initialized");
    }
    Ok(())
}

pub fn record_generation(outcome: &str, cards: usize) {
    if let Some(m) = METRICS.get() {
        m.generations_total.with_label_values(&[outcome]).inc();
        m.cards_generated_total.inc_by(cards as u64);
    }
}

pub fn record_provider_latency(provider: &str, model: &str, seconds: f64) {
    if let Some(m) = METRICS.get() {
        m.provider_latency_seconds
            .with_label_values(&[provider, model])
            .observe(seconds);
    }
}

pub fn record_provider_error(provider: &str, error_type: &str) {
    if let Some(m) = METRICS.get() {
        m.provider_errors_total
            .with_label_values(&[provider, error_type])
            .inc();
    }
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let registry = match METRICS.get() {
        Some(m) => &m.registry,
        None => {
            tracing::error!("Metrics registry not initialized");
            return "# Metrics registry not initialized\n".to_string();
        }
    };

    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();

    if let Err(e) = encoder.encode(&registry.gather(), &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return format!("# Failed to encode metrics: {}\n", e);
    }

    String::from_utf8(buffer).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Metrics output is not valid UTF-8");
        String::new()
    })
}
