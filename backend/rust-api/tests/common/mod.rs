#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use std::sync::Arc;
use tower::ServiceExt;

use quizlobby_api::models::Question;
use quizlobby_api::services::content_service::ContentGenerator;
use quizlobby_api::{config::Config, create_router, services::AppState};

/// In-process stand-in for the external question generator.
pub struct StubGenerator {
    pub questions: Vec<Question>,
    pub fail: bool,
}

impl StubGenerator {
    pub fn healthy() -> Arc<Self> {
        Arc::new(Self {
            questions: five_questions(),
            fail: false,
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            questions: Vec::new(),
            fail: true,
        })
    }
}

#[async_trait]
impl ContentGenerator for StubGenerator {
    async fn generate(&self, _context: &serde_json::Value) -> anyhow::Result<Vec<Question>> {
        if self.fail {
            anyhow::bail!("generator unavailable");
        }
        Ok(self.questions.clone())
    }
}

pub fn five_questions() -> Vec<Question> {
    (1..=5)
        .map(|i| Question {
            id: format!("q{i}"),
            prompt: format!("Question number {i}?"),
            options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
            correct_option: (i % 4) as u32,
            explanation: if i == 1 {
                Some("Because it is.".into())
            } else {
                None
            },
        })
        .collect()
}

pub async fn create_test_app() -> Router {
    create_test_app_with(StubGenerator::healthy())
}

pub fn create_test_app_with(generator: Arc<dyn ContentGenerator>) -> Router {
    // Initialize tracing for tests
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();

    let config = Config::default();
    create_router(Arc::new(AppState::new(config, generator)))
}

/// Fires one request with the identity header and decodes the JSON body.
pub async fn api(
    app: &Router,
    method: &str,
    uri: &str,
    user_id: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-user-id", user_id);

    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };
    (status, json)
}

/// Creates a session and returns its join code.
pub async fn create_session(app: &Router, host_id: &str, display_name: &str) -> String {
    let (status, body) = api(
        app,
        "POST",
        "/api/v1/sessions",
        host_id,
        Some(serde_json::json!({
            "display_name": display_name,
            "context": {"subject": "physics", "chapter": "optics"},
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {body}");
    body["code"].as_str().unwrap().to_string()
}

pub async fn join(app: &Router, code: &str, user_id: &str, display_name: &str) -> (StatusCode, serde_json::Value) {
    api(
        app,
        "POST",
        &format!("/api/v1/sessions/{code}/join"),
        user_id,
        Some(serde_json::json!({"display_name": display_name})),
    )
    .await
}

pub async fn start(app: &Router, code: &str, user_id: &str) -> (StatusCode, serde_json::Value) {
    api(
        app,
        "POST",
        &format!("/api/v1/sessions/{code}/start"),
        user_id,
        Some(serde_json::json!({})),
    )
    .await
}

pub async fn report_score(
    app: &Router,
    code: &str,
    user_id: &str,
    score: u32,
) -> (StatusCode, serde_json::Value) {
    api(
        app,
        "POST",
        &format!("/api/v1/sessions/{code}/score"),
        user_id,
        Some(serde_json::json!({"score": score})),
    )
    .await
}

pub async fn status_of(app: &Router, code: &str, user_id: &str) -> (StatusCode, serde_json::Value) {
    api(
        app,
        "GET",
        &format!("/api/v1/sessions/{code}"),
        user_id,
        None,
    )
    .await
}
