use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::metrics::track_content_fetch;
use crate::models::Question;

/// The question-generation collaborator. One best-effort call per start; the
/// engine never retries or caches on its own, so a failure leaves the
/// session in the lobby and the host free to try again.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn generate(&self, context: &serde_json::Value) -> Result<Vec<Question>>;
}

#[derive(Debug, Serialize)]
struct GenerateQuestionsRequest<'a> {
    context: &'a serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct GenerateQuestionsResponse {
    questions: Vec<Question>,
}

/// HTTP client for the external generation backend.
pub struct HttpContentGenerator {
    http_client: Client,
    content_api_url: String,
    timeout: std::time::Duration,
}

impl HttpContentGenerator {
    pub fn new(config: &Config) -> Self {
        Self {
            http_client: Client::new(),
            content_api_url: config.content_api_url.clone(),
            timeout: std::time::Duration::from_secs(config.content_timeout_seconds),
        }
    }

    async fn fetch_questions(&self, context: &serde_json::Value) -> Result<Vec<Question>> {
        let url = format!("{}/internal/generate_questions", self.content_api_url);

        tracing::debug!("Calling question generator API: {}", url);

        let response = self
            .http_client
            .post(&url)
            .json(&GenerateQuestionsRequest { context })
            .timeout(self.timeout)
            .send()
            .await
            .context("Failed to call question generator API")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(anyhow!(
                "Question generator returned error {}: {}",
                status,
                error_text
            ));
        }

        let api_response: GenerateQuestionsResponse = response
            .json()
            .await
            .context("Failed to parse question generator response")?;

        tracing::info!(
            "Generated {} questions for context",
            api_response.questions.len()
        );

        Ok(api_response.questions)
    }
}

#[async_trait]
impl ContentGenerator for HttpContentGenerator {
    async fn generate(&self, context: &serde_json::Value) -> Result<Vec<Question>> {
        track_content_fetch(self.fetch_questions(context)).await
    }
}

/// Shallow-merges host-supplied overrides (chosen chapter, language) over the
/// session's original scope before the generator call.
pub fn merge_context(
    base: &serde_json::Value,
    overrides: Option<&serde_json::Value>,
) -> serde_json::Value {
    match (base, overrides) {
        (serde_json::Value::Object(base_map), Some(serde_json::Value::Object(over_map))) => {
            let mut merged = base_map.clone();
            for (key, value) in over_map {
                merged.insert(key.clone(), value.clone());
            }
            serde_json::Value::Object(merged)
        }
        (_, Some(overrides)) if !overrides.is_null() => overrides.clone(),
        _ => base.clone(),
    }
}
