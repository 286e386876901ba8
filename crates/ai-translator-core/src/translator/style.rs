//! Translation styles and model providers.
//!
//! Front ends hand us free-form labels (the Chinese style names shown in the
//! UI, and provider names like `"OpenAI"`). Unknown labels never fail: an
//! unknown style means "no particular style", and anything that is not the
//! OpenAI label goes to GLM.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Stylistic preset applied to a translation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    /// Novel-style prose
    Novel,
    /// Press-release wording
    #[serde(alias = "press-release")]
    Press,
    /// Literary writer's voice
    Literary,
    /// Plain translation with no styling instruction
    #[default]
    None,
}

impl Style {
    /// All styles, in UI order.
    pub const ALL: [Self; 4] = [Self::Novel, Self::Press, Self::Literary, Self::None];

    /// UI label for the novel style
    pub const NOVEL_LABEL: &'static str = "小说";
    /// UI label for the press-release style
    pub const PRESS_LABEL: &'static str = "新闻稿";
    /// UI label for the literary style
    pub const LITERARY_LABEL: &'static str = "文艺作家";
    /// UI label for the unstyled translation
    pub const NONE_LABEL: &'static str = "无";

    /// Parse a UI label. Unrecognised labels fall back to [`Style::None`].
    pub fn from_label(label: &str) -> Self {
        match label {
            Self::NOVEL_LABEL => Self::Novel,
            Self::PRESS_LABEL => Self::Press,
            Self::LITERARY_LABEL => Self::Literary,
            Self::NONE_LABEL => Self::None,
            other => {
                if !other.is_empty() {
                    debug!("Unrecognised style label {:?}, translating without style", other);
                }
                Self::None
            }
        }
    }

    /// Chinese label shown in the UI
    pub const fn label(self) -> &'static str {
        match self {
            Self::Novel => Self::NOVEL_LABEL,
            Self::Press => Self::PRESS_LABEL,
            Self::Literary => Self::LITERARY_LABEL,
            Self::None => Self::NONE_LABEL,
        }
    }

    /// Short identifier used in logs and config files
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Novel => "novel",
            Self::Press => "press",
            Self::Literary => "literary",
            Self::None => "none",
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Remote model provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// OpenAI chat-completion API
    #[default]
    #[serde(alias = "OpenAI")]
    OpenAi,
    /// Self-hosted ChatGLM API server
    #[serde(alias = "GLM")]
    Glm,
}

impl Provider {
    pub const ALL: [Self; 2] = [Self::OpenAi, Self::Glm];

    /// Label selecting the OpenAI provider. Every other label selects GLM.
    pub const OPENAI_LABEL: &'static str = "OpenAI";
    pub const GLM_LABEL: &'static str = "GLM";

    /// Parse a UI label. Only the exact OpenAI label selects OpenAI.
    pub fn from_label(label: &str) -> Self {
        if label == Self::OPENAI_LABEL {
            return Self::OpenAi;
        }
        if label != Self::GLM_LABEL {
            debug!("Unrecognised provider label {:?}, routing to GLM", label);
        }
        Self::Glm
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::OpenAi => Self::OPENAI_LABEL,
            Self::Glm => Self::GLM_LABEL,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Glm => "glm",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
