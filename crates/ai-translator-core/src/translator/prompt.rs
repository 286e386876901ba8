//! Instruction templates for every (provider, style) pair.
//!
//! OpenAI templates put the instruction in the system role and the text in
//! the user role. GLM has no system role, so its templates embed the text
//! directly in a single Chinese instruction.

use std::collections::HashMap;
use std::sync::Arc;

use super::style::{Provider, Style};
use super::traits::Prompt;

pub const SOURCE_LANGUAGE: &str = "source_language";
pub const TARGET_LANGUAGE: &str = "target_language";
pub const TEXT: &str = "text";

const OPENAI_PREAMBLE: &str = "You are a translation expert, proficient in various languages.";
const GLM_PREAMBLE: &str =
    "假设你是一位擅长各国语言的翻译专家，将下面的内容从{source_language}翻译成{target_language}";

/// A parameterized instruction plus the sampling temperature it is sent with
#[derive(Debug, Clone, PartialEq)]
pub struct StyleTemplate {
    pub provider: Provider,
    pub style: Style,
    /// System-role template (OpenAI only)
    pub system: Option<String>,
    /// User-role template
    pub user: String,
    pub temperature: f32,
}

impl StyleTemplate {
    fn openai(style: Style, temperature: f32) -> Self {
        let instruction = match style {
            Style::Novel => "Translate the following content from {source_language} to {target_language} using novel style.",
            Style::Press => "Translate the following content from {source_language} to {target_language} using the style of a press release.",
            Style::Literary => "Translate the following content from {source_language} to {target_language} using the style of a literary writer.",
            Style::None => "Translates {source_language} to {target_language}.",
        };

        Self {
            provider: Provider::OpenAi,
            style,
            system: Some(format!("{OPENAI_PREAMBLE}\n{instruction}")),
            user: format!("{{{TEXT}}}"),
            temperature,
        }
    }

    fn glm(style: Style, temperature: f32) -> Self {
        let wording = match style {
            Style::Novel => "，尽量使用小说文体的措辞风格",
            Style::Press => "，尽量使用新闻稿的措辞风格",
            Style::Literary => "，尽量使用文艺作家的措辞风格",
            Style::None => "",
        };

        Self {
            provider: Provider::Glm,
            style,
            system: None,
            user: format!("{GLM_PREAMBLE}{wording}：\n{{{TEXT}}}"),
            temperature,
        }
    }

    /// Fill in languages and text.
    pub fn render(&self, text: &str, source_language: &str, target_language: &str) -> Prompt {
        let vars = [
            (SOURCE_LANGUAGE, source_language),
            (TARGET_LANGUAGE, target_language),
            (TEXT, text),
        ];

        Prompt {
            system: self.system.as_deref().map(|t| fill(t, &vars)),
            user: fill(&self.user, &vars),
        }
    }
}

/// Substitute `{name}` placeholders in one pass.
///
/// Substituted values are not scanned again, and braces that do not name a
/// known variable are copied through untouched.
pub fn fill(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len() + vars.iter().map(|(_, v)| v.len()).sum::<usize>());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let replaced = after.find('}').and_then(|close| {
            let name = &after[..close];
            vars.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, close))
        });

        match replaced {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

/// Sampling temperature per (provider, style).
///
/// Press and unstyled translations are deterministic; novel and literary
/// allow increasing variability. GLM's temperature scale is wider.
pub const fn temperature(provider: Provider, style: Style) -> f32 {
    match (provider, style) {
        (_, Style::Press | Style::None) => 0.0,
        (Provider::OpenAi, Style::Novel) => 0.3,
        (Provider::OpenAi, Style::Literary) => 0.7,
        (Provider::Glm, Style::Novel) => 3.0,
        (Provider::Glm, Style::Literary) => 7.0,
    }
}

/// All eight templates, built once and shared read-only.
#[derive(Debug)]
pub struct TemplateTable {
    entries: HashMap<(Provider, Style), Arc<StyleTemplate>>,
    openai_default: Arc<StyleTemplate>,
    glm_default: Arc<StyleTemplate>,
}

impl TemplateTable {
    pub fn new() -> Self {
        let mut entries = HashMap::with_capacity(Provider::ALL.len() * Style::ALL.len());

        for style in Style::ALL {
            let openai = StyleTemplate::openai(style, temperature(Provider::OpenAi, style));
            let glm = StyleTemplate::glm(style, temperature(Provider::Glm, style));
            entries.insert((Provider::OpenAi, style), Arc::new(openai));
            entries.insert((Provider::Glm, style), Arc::new(glm));
        }

        let openai_default = Arc::clone(&entries[&(Provider::OpenAi, Style::None)]);
        let glm_default = Arc::clone(&entries[&(Provider::Glm, Style::None)]);

        Self {
            entries,
            openai_default,
            glm_default,
        }
    }

    /// Template for a (provider, style) pair, falling back to the provider's unstyled template.
    pub fn select(&self, provider: Provider, style: Style) -> &Arc<StyleTemplate> {
        self.entries
            .get(&(provider, style))
            .unwrap_or_else(|| self.default_for(provider))
    }

    pub const fn default_for(&self, provider: Provider) -> &Arc<StyleTemplate> {
        match provider {
            Provider::OpenAi => &self.openai_default,
            Provider::Glm => &self.glm_default,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<StyleTemplate>> {
        self.entries.values()
    }
}

impl Default for TemplateTable {
    fn default() -> Self {
        Self::new()
    }
}
