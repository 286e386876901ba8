mod dispatcher;
mod glm;
mod openai;
pub mod prompt;
mod style;
mod traits;

pub use dispatcher::{TranslationDispatcher, TranslationRequest, TranslationResult};
pub use glm::GlmClient;
pub use openai::OpenAiClient;
pub use prompt::{StyleTemplate, TemplateTable};
pub use style::{Provider, Style};
pub use traits::{BackendInfo, CompletionBackend, Prompt};

use crate::config::ProvidersConfig;
use crate::error::Result;
use std::sync::Arc;

/// Create a shared dispatcher from configuration
pub fn create_dispatcher(config: &ProvidersConfig) -> Result<Arc<TranslationDispatcher>> {
    Ok(Arc::new(TranslationDispatcher::new(config)?))
}
