//! Routes translation requests to the right template and model backend.

use std::sync::Arc;
use tracing::{debug, error};

use super::glm::GlmClient;
use super::openai::OpenAiClient;
use super::prompt::{StyleTemplate, TemplateTable};
use super::style::{Provider, Style};
use super::traits::{CompletionBackend, Prompt};
use crate::config::ProvidersConfig;
use crate::error::Result;

/// One unit of text to translate, with everything needed to route it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRequest {
    pub text: String,
    pub source_language: String,
    pub target_language: String,
    pub style: Style,
    pub provider: Provider,
}

impl TranslationRequest {
    pub fn new(
        text: impl Into<String>,
        source_language: impl Into<String>,
        target_language: impl Into<String>,
        style: Style,
        provider: Provider,
    ) -> Self {
        Self {
            text: text.into(),
            source_language: source_language.into(),
            target_language: target_language.into(),
            style,
            provider,
        }
    }

    /// Build a request from UI labels. Unknown labels fall back as
    /// described on [`Style::from_label`] and [`Provider::from_label`].
    pub fn from_labels(
        text: impl Into<String>,
        source_language: impl Into<String>,
        target_language: impl Into<String>,
        style: &str,
        provider: &str,
    ) -> Self {
        Self::new(
            text,
            source_language,
            target_language,
            Style::from_label(style),
            Provider::from_label(provider),
        )
    }
}

/// Outcome of a translation. A failed translation has empty text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TranslationResult {
    pub text: String,
    pub success: bool,
}

impl TranslationResult {
    pub const fn ok(text: String) -> Self {
        Self { text, success: true }
    }

    pub const fn failed() -> Self {
        Self {
            text: String::new(),
            success: false,
        }
    }

    pub fn into_parts(self) -> (String, bool) {
        (self.text, self.success)
    }
}

/// Owns the template table and one backend per provider.
///
/// Holds no per-call state: share it behind an `Arc` and call it from as
/// many tasks as needed.
pub struct TranslationDispatcher {
    templates: TemplateTable,
    openai: Arc<dyn CompletionBackend>,
    glm: Arc<dyn CompletionBackend>,
}

impl TranslationDispatcher {
    /// Build both provider clients and all templates. Any configuration
    /// problem is returned here rather than at the first translation.
    pub fn new(config: &ProvidersConfig) -> Result<Self> {
        let openai = OpenAiClient::new(&config.openai)?;
        let glm = GlmClient::new(&config.glm)?;
        Ok(Self::with_backends(Arc::new(openai), Arc::new(glm)))
    }

    /// Create with custom backends
    pub fn with_backends(
        openai: Arc<dyn CompletionBackend>,
        glm: Arc<dyn CompletionBackend>,
    ) -> Self {
        Self {
            templates: TemplateTable::new(),
            openai,
            glm,
        }
    }

    pub const fn templates(&self) -> &TemplateTable {
        &self.templates
    }

    pub fn backend(&self, provider: Provider) -> &Arc<dyn CompletionBackend> {
        match provider {
            Provider::OpenAi => &self.openai,
            Provider::Glm => &self.glm,
        }
    }

    /// Template the request will be sent with
    pub fn template_for(&self, request: &TranslationRequest) -> &Arc<StyleTemplate> {
        self.templates.select(request.provider, request.style)
    }

    /// Filled prompt the request will be sent with
    pub fn prompt_for(&self, request: &TranslationRequest) -> Prompt {
        self.template_for(request).render(
            &request.text,
            &request.source_language,
            &request.target_language,
        )
    }

    /// Translate, keeping the error for callers that want to know why it failed.
    pub async fn translate_detailed(&self, request: &TranslationRequest) -> Result<String> {
        let template = self.template_for(request);
        debug!("{} {} style translation", request.provider, template.style);

        let prompt = template.render(
            &request.text,
            &request.source_language,
            &request.target_language,
        );

        let text = self
            .backend(request.provider)
            .complete(&prompt, template.temperature)
            .await?;

        debug!("translation result: {}", text);
        Ok(text)
    }

    /// Translate a request. Never fails: backend errors are logged and
    /// reported as an unsuccessful result with empty text.
    pub async fn translate(&self, request: &TranslationRequest) -> TranslationResult {
        match self.translate_detailed(request).await {
            Ok(text) => TranslationResult::ok(text),
            Err(e) => {
                error!("An error occurred during translation: {}", e);
                TranslationResult::failed()
            }
        }
    }

    /// Label-based entry point used by front ends: returns `(text, success)`.
    pub async fn translate_labels(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
        style: &str,
        provider: &str,
    ) -> (String, bool) {
        let request =
            TranslationRequest::from_labels(text, source_language, target_language, style, provider);
        self.translate(&request).await.into_parts()
    }
}

impl std::fmt::Debug for TranslationDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslationDispatcher")
            .field("templates", &self.templates.len())
            .field("openai", &self.openai.info().target)
            .field("glm", &self.glm.info().target)
            .finish()
    }
}
