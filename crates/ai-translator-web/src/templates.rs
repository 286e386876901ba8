//! Askama templates for the upload form and the result page.
//!
//! - `base.html` - Common layout with CSS
//! - `index.html` - Upload form with language, style and provider choices
//! - `result.html` - Summary of a finished translation with a download link

use ai_translator_core::{
    OutputFormat, Provider, Style, TranslatedDocument, DEFAULT_SOURCE_LANGUAGE,
    DEFAULT_TARGET_LANGUAGE,
};
use askama::Template;
use askama_web::WebTemplate;

/// Longest preview shown on the result page, in characters
const PREVIEW_CHARS: usize = 2000;

/// One `<option>` of a select element
pub struct SelectOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

/// Landing page with upload form.
#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub default_source: String,
    pub default_target: String,
    pub styles: Vec<SelectOption>,
    pub providers: Vec<SelectOption>,
    pub formats: Vec<SelectOption>,
}

impl IndexTemplate {
    /// Form preselected with the given defaults.
    pub fn new(
        source: &str,
        target: &str,
        style: Style,
        provider: Provider,
        format: OutputFormat,
    ) -> Self {
        Self {
            default_source: source.to_string(),
            default_target: target.to_string(),
            styles: Style::ALL
                .iter()
                .map(|&s| SelectOption {
                    value: s.label(),
                    label: s.label(),
                    selected: s == style,
                })
                .collect(),
            providers: Provider::ALL
                .iter()
                .map(|&p| SelectOption {
                    value: p.label(),
                    label: p.label(),
                    selected: p == provider,
                })
                .collect(),
            formats: [OutputFormat::Markdown, OutputFormat::Text]
                .into_iter()
                .map(|f| SelectOption {
                    value: f.extension(),
                    label: match f {
                        OutputFormat::Markdown => "Markdown",
                        OutputFormat::Text => "Plain text",
                    },
                    selected: f == format,
                })
                .collect(),
        }
    }
}

impl Default for IndexTemplate {
    fn default() -> Self {
        Self::new(
            DEFAULT_SOURCE_LANGUAGE,
            DEFAULT_TARGET_LANGUAGE,
            Style::default(),
            Provider::default(),
            OutputFormat::default(),
        )
    }
}

/// Result page after a translation ran.
#[derive(Template, WebTemplate)]
#[template(path = "result.html")]
pub struct ResultTemplate {
    pub job_id: String,
    pub upload_name: String,
    pub download_name: String,
    pub source_language: String,
    pub target_language: String,
    pub style: &'static str,
    pub provider: &'static str,
    pub page_count: usize,
    pub chunk_count: usize,
    pub failed_chunks: usize,
    pub preview: String,
    pub truncated: bool,
}

impl ResultTemplate {
    pub fn new(job_id: String, upload_name: String, download_name: String, doc: &TranslatedDocument) -> Self {
        let full: String = doc
            .pages
            .iter()
            .map(ai_translator_core::TranslatedPage::text)
            .collect::<Vec<_>>()
            .join("\n\n");
        let truncated = full.chars().count() > PREVIEW_CHARS;
        let preview = if truncated {
            full.chars().take(PREVIEW_CHARS).collect()
        } else {
            full
        };

        Self {
            job_id,
            upload_name,
            download_name,
            source_language: doc.source_language.clone(),
            target_language: doc.target_language.clone(),
            style: doc.style.label(),
            provider: doc.provider.label(),
            page_count: doc.pages.len(),
            chunk_count: doc.chunk_count(),
            failed_chunks: doc.failed_chunks(),
            preview,
            truncated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ai_translator_core::{TranslatedChunk, TranslatedPage};

    #[test]
    fn test_index_defaults() {
        let page = IndexTemplate::default();
        assert_eq!(page.default_source, "English");
        assert_eq!(page.default_target, "Chinese");
        assert_eq!(page.styles.len(), Style::ALL.len());
        assert_eq!(page.providers.iter().filter(|p| p.selected).count(), 1);

        let html = page.render().unwrap();
        assert!(html.contains("小说"));
        assert!(html.contains("文艺作家"));
        assert!(html.contains("value=\"OpenAI\" selected"));
    }

    #[test]
    fn test_result_page() {
        let doc = TranslatedDocument {
            title: None,
            source_language: "English".to_string(),
            target_language: "Chinese".to_string(),
            style: Style::Press,
            provider: Provider::Glm,
            pages: vec![TranslatedPage {
                page_num: 0,
                chunks: vec![
                    TranslatedChunk {
                        original: "Hello".to_string(),
                        translated: "你好".to_string(),
                        success: true,
                    },
                    TranslatedChunk {
                        original: "World".to_string(),
                        translated: String::new(),
                        success: false,
                    },
                ],
            }],
        };

        let page = ResultTemplate::new(
            "job-1".to_string(),
            "a.pdf".to_string(),
            "a-Chinese.md".to_string(),
            &doc,
        );
        assert_eq!(page.chunk_count, 2);
        assert_eq!(page.failed_chunks, 1);
        assert!(!page.truncated);

        let html = page.render().unwrap();
        assert!(html.contains("/api/download/job-1"));
        assert!(html.contains("新闻稿"));
        assert!(html.contains("你好"));
    }
}
