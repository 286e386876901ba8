use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use super::style::Provider;
use super::traits::{BackendInfo, CompletionBackend, Prompt};
use crate::config::GlmConfig;
use crate::error::{Error, Result};

/// Client for a self-hosted ChatGLM API server.
///
/// The server takes one prompt string per request; there is no system role,
/// so any system instruction is prepended to the prompt.
pub struct GlmClient {
    client: Client,
    endpoint: Url,
    max_length: u32,
    top_p: f32,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    prompt: &'a str,
    temperature: f32,
    history: Vec<[String; 2]>,
    max_length: u32,
    top_p: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: Option<String>,
}

impl GlmClient {
    /// Create a client from configuration. Fails on a malformed endpoint URL.
    pub fn new(config: &GlmConfig) -> Result<Self> {
        let endpoint = Url::parse(&config.endpoint).map_err(|e| Error::ConfigInvalid {
            field: "glm.endpoint".to_string(),
            reason: format!("{}: {e}", config.endpoint),
        })?;

        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(Error::ConfigInvalid {
                field: "glm.endpoint".to_string(),
                reason: format!("unsupported scheme '{}'", endpoint.scheme()),
            });
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::ConfigInvalid {
                field: "glm".to_string(),
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            endpoint,
            max_length: config.max_length,
            top_p: config.top_p,
        })
    }

    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl CompletionBackend for GlmClient {
    fn info(&self) -> BackendInfo {
        BackendInfo {
            name: "ChatGLM",
            provider: Provider::Glm,
            target: self.endpoint.to_string(),
        }
    }

    async fn complete(&self, prompt: &Prompt, temperature: f32) -> Result<String> {
        let text = prompt.full_text();
        let request = GenerateRequest {
            prompt: &text,
            temperature,
            history: Vec::new(),
            max_length: self.max_length,
            top_p: self.top_p,
        };

        debug!("GLM request to {} (temperature {})", self.endpoint, temperature);

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!("Request failed: {}", e);
                if e.is_timeout() {
                    Error::TranslationTimeout
                } else {
                    Error::TranslationRequest(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("GLM error: {} - {}", status, body);
            return Err(Error::TranslationRequest(format!("HTTP {status}: {body}")));
        }

        let parsed = response.json::<GenerateResponse>().await.map_err(|e| {
            warn!("Failed to parse GLM response: {}", e);
            Error::TranslationInvalidResponse(e.to_string())
        })?;

        parsed
            .response
            .map(|text| text.trim().to_string())
            .ok_or_else(|| Error::TranslationInvalidResponse("missing 'response' field".to_string()))
    }
}
