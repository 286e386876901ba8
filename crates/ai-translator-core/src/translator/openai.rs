use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use super::style::Provider;
use super::traits::{BackendInfo, CompletionBackend, Prompt};
use crate::config::OpenAiConfig;
use crate::error::{Error, Result};

/// OpenAI chat-completion client
/// Works with: OpenAI, and any server exposing the same `/chat/completions` API.
pub struct OpenAiClient {
    client: Client,
    /// Base URL for the API (e.g., "https://api.openai.com/v1")
    pub api_base: String,
    /// Optional API key for authentication
    pub api_key: Option<String>,
    /// Model identifier
    pub model: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

impl OpenAiClient {
    /// Create a client from configuration.
    ///
    /// Fails if the model name is empty, the API base is not a URL, or the
    /// HTTP client cannot be built.
    pub fn new(config: &OpenAiConfig) -> Result<Self> {
        if config.model.trim().is_empty() {
            return Err(Error::ConfigMissing("openai.model".to_string()));
        }

        Url::parse(&config.api_base).map_err(|e| Error::ConfigInvalid {
            field: "openai.api_base".to_string(),
            reason: format!("{}: {e}", config.api_base),
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::ConfigInvalid {
                field: "openai".to_string(),
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            api_base: config.api_base.clone(),
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
            model: config.model.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.api_base.trim_end_matches('/'))
    }
}

#[async_trait]
impl CompletionBackend for OpenAiClient {
    fn info(&self) -> BackendInfo {
        BackendInfo {
            name: "OpenAI",
            provider: Provider::OpenAi,
            target: self.model.clone(),
        }
    }

    async fn complete(&self, prompt: &Prompt, temperature: f32) -> Result<String> {
        let url = self.endpoint();

        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &prompt.system {
            messages.push(Message {
                role: "system",
                content: system,
            });
        }
        messages.push(Message {
            role: "user",
            content: &prompt.user,
        });

        let request = ChatRequest {
            model: &self.model,
            messages,
            temperature,
        };

        debug!("Chat completion request to {} (model {}, temperature {})", url, self.model, temperature);

        let mut req = self.client.post(&url).json(&request);

        // Add API key if configured
        if let Some(ref key) = self.api_key {
            req = req.bearer_auth(key);
        }

        let response = req.send().await.map_err(|e| {
            warn!("Request failed: {}", e);
            if e.is_timeout() {
                Error::TranslationTimeout
            } else {
                Error::TranslationRequest(e.to_string())
            }
        })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());

            warn!("Rate limited, retry after {:?}s", retry_after);
            return Err(Error::TranslationRateLimited { retry_after });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("API error: {} - {}", status, body);
            return Err(Error::TranslationRequest(format!("HTTP {status}: {body}")));
        }

        let chat_response = response.json::<ChatResponse>().await.map_err(|e| {
            warn!("Failed to parse response: {}", e);
            Error::TranslationInvalidResponse(e.to_string())
        })?;

        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .ok_or_else(|| Error::TranslationInvalidResponse("No choices in response".to_string()))
    }
}
