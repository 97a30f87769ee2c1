//! HTTP client for the generation service: JSON POST per task, bearer auth
//! from the environment.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{GenerationError, Generator};
use crate::config::GenConfig;
use crate::task::TaskSpec;

/// Environment variable holding the generation service API key.
pub const API_KEY_ENV: &str = "COURSEGEN_API_KEY";

/// Production [`Generator`]: posts one JSON request per task to the
/// configured endpoint and expects `{ "artifactId": "..." }` back.
pub struct HttpGenerator {
    client: reqwest::Client,
    endpoint: String,
    model: Option<String>,
    api_key: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    title: &'a str,
    subject: &'a str,
    level: &'a str,
    sections: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    artifact_id: String,
}

impl HttpGenerator {
    pub fn new(endpoint: impl Into<String>, model: Option<String>, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            model,
            api_key,
        }
    }

    /// Build from config, reading the API key from `COURSEGEN_API_KEY`.
    pub fn from_config(cfg: &GenConfig) -> Self {
        Self::new(
            cfg.generator_url.clone(),
            cfg.generator_model.clone(),
            std::env::var(API_KEY_ENV).ok(),
        )
    }
}

#[async_trait]
impl Generator for HttpGenerator {
    async fn generate(&self, spec: &TaskSpec) -> Result<String, GenerationError> {
        let body = GenerateRequest {
            title: &spec.title,
            subject: &spec.subject,
            level: &spec.level,
            sections: &spec.sections,
            model: self.model.as_deref(),
        };
        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            let message = if detail.is_empty() {
                format!("HTTP {status}")
            } else {
                format!("HTTP {status}: {detail}")
            };
            return Err(GenerationError::Rejected {
                title: spec.title.clone(),
                message,
            });
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::Transport(e.to_string()))?;
        Ok(parsed.artifact_id)
    }
}
