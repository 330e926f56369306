//! Gemini `generateContent` client.
//!
//! Sends the per-algorithm instruction with a JSON response schema and
//! parses the first candidate's text into a validated example.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::algorithm::{AlgorithmKind, AnyExample};
use crate::config::ProviderConfig;

use super::error::{ProviderError, ProviderResult};
use super::{prompt, records, ExampleProvider};

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: Value,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

impl GenerateResponse {
    /// Decode a response envelope. Undecodable bodies are malformed JSON,
    /// not transport failures.
    pub fn decode(body: &str) -> ProviderResult<Self> {
        Ok(serde_json::from_str(body)?)
    }

    /// Text of the first part of the first candidate, if any.
    pub fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .and_then(|c| c.parts.first())
            .and_then(|p| p.text.as_deref())
            .filter(|t| !t.trim().is_empty())
    }
}

fn build_request(kind: AlgorithmKind) -> GenerateRequest {
    GenerateRequest {
        contents: vec![Content {
            role: Some("user".into()),
            parts: vec![Part {
                text: Some(prompt::instruction(kind).to_string()),
            }],
        }],
        generation_config: GenerationConfig {
            response_mime_type: "application/json",
            response_schema: prompt::response_schema(kind),
        },
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// HTTP provider backed by the Gemini API.
#[derive(Debug, Clone)]
pub struct GeminiProvider {
    api_base: String,
    model_id: String,
    api_key: String,
    http: reqwest::Client,
}

impl GeminiProvider {
    pub fn new(config: &ProviderConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("failed to build reqwest client");

        Self {
            api_base: config.api_base.trim_end_matches('/').to_string(),
            model_id: config.model_id.clone(),
            api_key: config.api_key.clone(),
            http,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base, self.model_id)
    }
}

impl ExampleProvider for GeminiProvider {
    async fn generate(&self, kind: AlgorithmKind) -> ProviderResult<AnyExample> {
        let url = self.endpoint();
        debug!(model = %self.model_id, algorithm = %kind, "requesting scenario");

        let resp = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&build_request(kind))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), algorithm = %kind, "scenario request rejected");
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.text().await?;
        let parsed = GenerateResponse::decode(&body)?;
        let text = parsed.first_text().ok_or(ProviderError::EmptyResponse)?;
        let example = records::parse_example(kind, text)?;

        info!(algorithm = %kind, id = example.id(), topic = example.topic(), "scenario generated");
        Ok(example)
    }
}
