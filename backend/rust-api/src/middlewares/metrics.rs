use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;

use crate::metrics::{HTTP_REQUESTS_TOTAL, HTTP_REQUEST_DURATION_SECONDS};
use crate::services::code_generator::CODE_ALPHABET;

/// Records HTTP request count and latency per normalized route.
pub async fn metrics_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let path = normalize_path(req.uri().path());

    let response = next.run(req).await;

    let duration = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    HTTP_REQUESTS_TOTAL
        .with_label_values(&[&method, &path, &status])
        .inc();

    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[&method, &path])
        .observe(duration);

    response
}

/// Normalize URL path to avoid cardinality explosion: every session gets its
/// own join code, so code segments collapse to a placeholder.
fn normalize_path(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').collect();
    let mut normalized = Vec::new();

    for segment in segments {
        if is_join_code_like(segment) {
            normalized.push("{code}");
        } else {
            normalized.push(segment);
        }
    }

    normalized.join("/")
}

/// A short all-caps alphanumeric segment drawn from the code alphabet.
fn is_join_code_like(s: &str) -> bool {
    (4..=8).contains(&s.len()) && s.bytes().all(|b| CODE_ALPHABET.contains(&b))
}
