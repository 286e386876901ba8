use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::translator::{Provider, Style};

/// Default source language name passed to the model
pub const DEFAULT_SOURCE_LANGUAGE: &str = "English";
/// Default target language name passed to the model
pub const DEFAULT_TARGET_LANGUAGE: &str = "Chinese";
/// Default OpenAI model
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";
/// Default OpenAI API base
pub const DEFAULT_OPENAI_API_BASE: &str = "https://api.openai.com/v1";
/// Default ChatGLM API server
pub const DEFAULT_GLM_ENDPOINT: &str = "http://127.0.0.1:8000";

/// Prefix for environment overrides, e.g. `AI_TRANSLATOR__OPENAI__MODEL`
const ENV_PREFIX: &str = "AI_TRANSLATOR";

// Serde default functions
fn default_source_language() -> String {
    DEFAULT_SOURCE_LANGUAGE.to_string()
}

fn default_target_language() -> String {
    DEFAULT_TARGET_LANGUAGE.to_string()
}

fn default_openai_model() -> String {
    DEFAULT_OPENAI_MODEL.to_string()
}

fn default_openai_api_base() -> String {
    DEFAULT_OPENAI_API_BASE.to_string()
}

fn default_glm_endpoint() -> String {
    DEFAULT_GLM_ENDPOINT.to_string()
}

const fn default_timeout_secs() -> u64 {
    120
}

const fn default_max_length() -> u32 {
    20_000
}

const fn default_top_p() -> f32 {
    0.7
}

const fn default_max_chunk_chars() -> usize {
    2000
}

const fn default_concurrency() -> usize {
    1
}

/// Format of the translated document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    #[serde(alias = "md")]
    Markdown,
    #[serde(alias = "txt")]
    Text,
}

impl OutputFormat {
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Markdown => "md",
            Self::Text => "txt",
        }
    }

    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Markdown => "text/markdown; charset=utf-8",
            Self::Text => "text/plain; charset=utf-8",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "markdown" | "md" => Some(Self::Markdown),
            "text" | "txt" => Some(Self::Text),
            _ => None,
        }
    }
}

/// OpenAI chat-completion backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    #[serde(default = "default_openai_api_base")]
    pub api_base: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_openai_model")]
    pub model: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_base: default_openai_api_base(),
            api_key: None,
            model: default_openai_model(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// ChatGLM API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlmConfig {
    #[serde(default = "default_glm_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Maximum generated length requested from the server
    #[serde(default = "default_max_length")]
    pub max_length: u32,
    #[serde(default = "default_top_p")]
    pub top_p: f32,
}

impl Default for GlmConfig {
    fn default() -> Self {
        Self {
            endpoint: default_glm_endpoint(),
            timeout_secs: default_timeout_secs(),
            max_length: default_max_length(),
            top_p: default_top_p(),
        }
    }
}

/// Everything needed to construct the translation dispatcher
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub openai: OpenAiConfig,
    #[serde(default)]
    pub glm: GlmConfig,
}

/// Default per-document translation options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationSettings {
    #[serde(default = "default_source_language")]
    pub source_language: String,
    #[serde(default = "default_target_language")]
    pub target_language: String,
    #[serde(default)]
    pub style: Style,
    #[serde(default)]
    pub provider: Provider,
    #[serde(default)]
    pub output_format: OutputFormat,
    /// Upper bound on characters sent in one request
    #[serde(default = "default_max_chunk_chars")]
    pub max_chunk_chars: usize,
    /// Chunks of one page translated at the same time
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for TranslationSettings {
    fn default() -> Self {
        Self {
            source_language: default_source_language(),
            target_language: default_target_language(),
            style: Style::default(),
            provider: Provider::default(),
            output_format: OutputFormat::default(),
            max_chunk_chars: default_max_chunk_chars(),
            concurrency: default_concurrency(),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub translation: TranslationSettings,
    #[serde(default)]
    pub openai: OpenAiConfig,
    #[serde(default)]
    pub glm: GlmConfig,
}

impl AppConfig {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::ConfigLoad(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::ConfigLoad(format!("Failed to parse config: {e}")))
    }

    /// Candidate config files, lowest priority first.
    pub fn default_paths() -> Vec<PathBuf> {
        let mut paths = Vec::with_capacity(2);
        if let Some(config_dir) = crate::util::config_dir() {
            paths.push(config_dir.join("ai-translator").join("config.toml"));
        }
        paths.push(PathBuf::from("config.toml"));
        paths
    }

    /// Layer defaults, the given files (later wins) and `AI_TRANSLATOR__*`
    /// environment variables.
    ///
    /// Missing files are skipped; a file or variable that does not parse is an error.
    pub fn load_layered(paths: &[PathBuf]) -> Result<Self> {
        Self::layered(paths, None)
    }

    fn layered(paths: &[PathBuf], env: Option<config::Map<String, String>>) -> Result<Self> {
        let defaults = config::Config::try_from(&Self::default())
            .map_err(|e| Error::ConfigLoad(format!("Failed to seed defaults: {e}")))?;

        let mut builder = config::Config::builder().add_source(defaults);
        for path in paths {
            if path.exists() {
                tracing::debug!("Loading config from {}", path.display());
            }
            builder = builder.add_source(
                config::File::from(path.as_path())
                    .format(config::FileFormat::Toml)
                    .required(false),
            );
        }

        builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true)
                    .source(env),
            )
            .build()
            .and_then(config::Config::try_deserialize)
            .map_err(|e| Error::ConfigLoad(e.to_string()))
    }

    /// Load from default locations (~/.config/ai-translator/config.toml, ./config.toml)
    /// and the environment.
    pub fn load() -> Result<Self> {
        Self::load_layered(&Self::default_paths())
    }

    /// Provider settings for building the dispatcher
    pub fn providers(&self) -> ProvidersConfig {
        ProvidersConfig {
            openai: self.openai.clone(),
            glm: self.glm.clone(),
        }
    }
}
