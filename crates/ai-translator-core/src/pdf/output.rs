//! Translated document model and its Markdown / plain-text rendering.

use std::fmt::Write as _;
use std::path::Path;

use crate::config::OutputFormat;
use crate::error::{Error, Result};
use crate::translator::{Provider, Style};

/// One translated chunk of page text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatedChunk {
    pub original: String,
    /// Empty when the translation failed
    pub translated: String,
    pub success: bool,
}

/// All chunks of one page
#[derive(Debug, Clone, Default)]
pub struct TranslatedPage {
    /// Page number (0-indexed)
    pub page_num: usize,
    pub chunks: Vec<TranslatedChunk>,
}

impl TranslatedPage {
    pub fn failed_chunks(&self) -> usize {
        self.chunks.iter().filter(|c| !c.success).count()
    }

    /// Successfully translated text of the page, paragraphs separated by blank lines
    pub fn text(&self) -> String {
        self.chunks
            .iter()
            .filter(|c| c.success && !c.translated.is_empty())
            .map(|c| c.translated.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Result of translating a document
#[derive(Debug, Clone)]
pub struct TranslatedDocument {
    pub title: Option<String>,
    pub source_language: String,
    pub target_language: String,
    pub style: Style,
    pub provider: Provider,
    pub pages: Vec<TranslatedPage>,
}

impl TranslatedDocument {
    pub fn chunk_count(&self) -> usize {
        self.pages.iter().map(|p| p.chunks.len()).sum()
    }

    pub fn failed_chunks(&self) -> usize {
        self.pages.iter().map(TranslatedPage::failed_chunks).sum()
    }

    /// Every chunk translated successfully
    pub fn is_complete(&self) -> bool {
        self.failed_chunks() == 0
    }

    pub fn render(&self, format: OutputFormat) -> String {
        match format {
            OutputFormat::Markdown => self.to_markdown(),
            OutputFormat::Text => self.to_text(),
        }
    }

    pub fn to_markdown(&self) -> String {
        let mut out = String::new();

        if let Some(title) = &self.title {
            let _ = writeln!(out, "# {title}\n");
        }

        for (i, page) in self.pages.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            let _ = writeln!(out, "## Page {}\n", page.page_num + 1);

            let text = page.text();
            if !text.is_empty() {
                out.push_str(&text);
                out.push('\n');
            }
        }

        out
    }

    /// Pages separated by form feeds
    pub fn to_text(&self) -> String {
        self.pages
            .iter()
            .map(TranslatedPage::text)
            .collect::<Vec<_>>()
            .join("\n\u{c}\n")
    }

    /// Render and write to `path`
    pub fn save(&self, path: impl AsRef<Path>, format: OutputFormat) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.render(format)).map_err(|e| Error::OutputWrite {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }
}
