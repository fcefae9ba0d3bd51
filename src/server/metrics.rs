use axum::{http::StatusCode, response::IntoResponse};
use lazy_static::lazy_static;
use prometheus::{CounterVec, Encoder, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder};
use std::time::Duration;

/// Metric name prefix for all SonifAI metrics
const PREFIX: &str = "sonifai";

lazy_static! {
    // Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // HTTP Request Metrics
    pub static ref HTTP_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_http_requests_total"), "Total number of HTTP requests"),
        &["method", "path", "status"]
    ).expect("Failed to create http_requests_total metric");

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            format!("{PREFIX}_http_request_duration_seconds"),
            "HTTP request duration in seconds"
        )
        .buckets(vec![0.001, 0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0]),
        &["method", "path"]
    ).expect("Failed to create http_request_duration_seconds metric");

    // Model request outcomes
    pub static ref ANALYSIS_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_analysis_requests_total"), "Analysis requests by outcome"),
        &["outcome"]
    ).expect("Failed to create analysis_requests_total metric");

    pub static ref PROMPT_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_prompt_requests_total"), "Prompt requests by outcome"),
        &["outcome"]
    ).expect("Failed to create prompt_requests_total metric");

    pub static ref METADATA_LOOKUPS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_metadata_lookups_total"), "Video metadata lookups by outcome"),
        &["outcome"]
    ).expect("Failed to create metadata_lookups_total metric");
}

/// Initialize all metrics and register them with the Prometheus registry
pub fn init_metrics() {
    // Register all metrics - ignore errors if already registered (for tests)
    let _ = REGISTRY.register(Box::new(HTTP_REQUESTS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()));
    let _ = REGISTRY.register(Box::new(ANALYSIS_REQUESTS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(PROMPT_REQUESTS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(METADATA_LOOKUPS_TOTAL.clone()));

    tracing::info!("Metrics system initialized successfully");
}

/// Collapses request paths into a small set of labels.
pub fn categorize_endpoint(path: &str) -> &'static str {
    match path {
        "/" => "home",
        "/metrics" => "metrics",
        "/v1/classify" => "classify",
        "/v1/variation" => "variation",
        "/v1/prompt" => "prompt",
        "/v1/session" => "session",
        "/v1/session/analyze" => "session_analyze",
        "/v1/session/variation" => "session_variation",
        "/v1/session/prompt" => "session_prompt",
        _ => "static",
    }
}

pub fn record_http_request(method: &str, path: &str, status: u16, duration: Duration) {
    let endpoint = categorize_endpoint(path);
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, endpoint, &status.to_string()])
        .inc();
    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, endpoint])
        .observe(duration.as_secs_f64());
}

pub fn record_analysis_request(outcome: &str) {
    ANALYSIS_REQUESTS_TOTAL.with_label_values(&[outcome]).inc();
}

pub fn record_prompt_request(outcome: &str) {
    PROMPT_REQUESTS_TOTAL.with_label_values(&[outcome]).inc();
}

pub fn record_metadata_lookup(outcome: &str) {
    METADATA_LOOKUPS_TOTAL.with_label_values(&[outcome]).inc();
}

/// Handler serving the registry in the Prometheus text format.
pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = vec![];
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(()) => {
            let response = String::from_utf8(buffer).unwrap_or_default();
            (StatusCode::OK, response)
        }
        Err(e) => {
            tracing::error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to encode metrics: {}", e),
            )
        }
    }
}
