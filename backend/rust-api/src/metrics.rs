use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, register_int_gauge, Encoder, HistogramVec,
    IntCounterVec, IntGauge, TextEncoder,
};

lazy_static! {
    // HTTP Metrics
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "http_requests_total",
        "Total number of HTTP requests",
        &["method", "path", "status"]
    )
    .unwrap();

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "http_request_duration_seconds",
        "HTTP request duration in seconds",
        &["method", "path"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .unwrap();

    // Business Metrics
    pub static ref SESSIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "sessions_total",
        "Session lifecycle events",
        &["event"]
    )
    .unwrap();

    pub static ref SESSIONS_LIVE: IntGauge = register_int_gauge!(
        "sessions_live",
        "Number of sessions currently in lobby or active play"
    )
    .unwrap();

    pub static ref PARTICIPANTS_JOINED_TOTAL: IntCounterVec = register_int_counter_vec!(
        "participants_joined_total",
        "Total number of roster admissions",
        &["role"]
    )
    .unwrap();

    pub static ref SCORE_REPORTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "score_reports_total",
        "Total number of score reports received",
        &["result"]
    )
    .unwrap();

    // Content generator (upstream) metrics
    pub static ref CONTENT_FETCHES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "content_fetches_total",
        "Total number of question generation calls",
        &["status"]
    )
    .unwrap();

    pub static ref CONTENT_FETCH_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "content_fetch_duration_seconds",
        "Question generation call duration in seconds",
        &["status"],
        vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]
    )
    .unwrap();
}

/// Renders all metrics in Prometheus text format
pub fn render_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer)
        .map_err(|e| prometheus::Error::Msg(format!("Failed to convert metrics to UTF-8: {}", e)))
}

/// Helper: track a question-generation call with metrics
pub async fn track_content_fetch<F, T>(future: F) -> Result<T, anyhow::Error>
where
    F: std::future::Future<Output = Result<T, anyhow::Error>>,
{
    let start = std::time::Instant::now();
    let result = future.await;
    let duration = start.elapsed().as_secs_f64();

    let status = if result.is_ok() { "success" } else { "error" };

    CONTENT_FETCHES_TOTAL.with_label_values(&[status]).inc();
    CONTENT_FETCH_DURATION_SECONDS
        .with_label_values(&[status])
        .observe(duration);

    result
}
