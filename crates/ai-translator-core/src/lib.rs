//! AI Translator Core Library
//!
//! This library provides the core functionality for translating PDF documents
//! with large language models:
//! - Style-aware prompt templates for OpenAI and ChatGLM
//! - A dispatcher routing each request to the right template and backend
//! - PDF text extraction and chunking
//! - Markdown / plain-text output of the translated document

pub mod config;
pub mod error;
pub mod pdf;
pub mod translator;
pub mod util;

pub use config::{
    AppConfig, GlmConfig, OpenAiConfig, OutputFormat, ProvidersConfig, TranslationSettings,
    DEFAULT_GLM_ENDPOINT, DEFAULT_OPENAI_API_BASE, DEFAULT_OPENAI_MODEL, DEFAULT_SOURCE_LANGUAGE,
    DEFAULT_TARGET_LANGUAGE,
};
pub use error::{Error, Result};
pub use pdf::{PdfDocument, TranslatedChunk, TranslatedDocument, TranslatedPage};
pub use translator::{
    CompletionBackend, Prompt, Provider, Style, TranslationDispatcher, TranslationRequest,
    TranslationResult, create_dispatcher,
};

use futures::StreamExt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Per-document translation options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslateOptions {
    pub source_language: String,
    pub target_language: String,
    pub style: Style,
    pub provider: Provider,
    /// Upper bound on characters per request (0 = whole page)
    pub max_chunk_chars: usize,
    /// Chunks of one page in flight at once
    pub concurrency: usize,
}

impl From<&TranslationSettings> for TranslateOptions {
    fn from(settings: &TranslationSettings) -> Self {
        Self {
            source_language: settings.source_language.clone(),
            target_language: settings.target_language.clone(),
            style: settings.style,
            provider: settings.provider,
            max_chunk_chars: settings.max_chunk_chars,
            concurrency: settings.concurrency,
        }
    }
}

impl Default for TranslateOptions {
    fn default() -> Self {
        Self::from(&TranslationSettings::default())
    }
}

/// High-level PDF translator that combines all components
pub struct PdfTranslator {
    dispatcher: Arc<TranslationDispatcher>,
    settings: TranslationSettings,
}

impl PdfTranslator {
    /// Create a new PDF translator with the given configuration.
    ///
    /// Fails if the provider configuration is invalid.
    pub fn new(config: &AppConfig) -> Result<Self> {
        let dispatcher = create_dispatcher(&config.providers())?;
        Ok(Self::with_dispatcher(dispatcher, config.translation.clone()))
    }

    /// Create with an existing dispatcher
    pub const fn with_dispatcher(
        dispatcher: Arc<TranslationDispatcher>,
        settings: TranslationSettings,
    ) -> Self {
        Self {
            dispatcher,
            settings,
        }
    }

    pub const fn dispatcher(&self) -> &Arc<TranslationDispatcher> {
        &self.dispatcher
    }

    pub const fn settings(&self) -> &TranslationSettings {
        &self.settings
    }

    /// Options built from the configured defaults
    pub fn default_options(&self) -> TranslateOptions {
        TranslateOptions::from(&self.settings)
    }

    /// Translate a single page of a PDF document.
    ///
    /// Failed chunks are kept in the result with `success = false`; only
    /// document errors (bad page number, unreadable page) are returned as `Err`.
    pub async fn translate_page(
        &self,
        doc: &PdfDocument,
        page_num: usize,
        options: &TranslateOptions,
    ) -> Result<TranslatedPage> {
        let text = doc.page_text(page_num)?;
        let chunks = pdf::split_into_chunks(&text, options.max_chunk_chars);

        if chunks.is_empty() {
            debug!("Page {} has no text", page_num);
            return Ok(TranslatedPage {
                page_num,
                chunks: Vec::new(),
            });
        }

        info!(
            "Translating page {} ({} chunks) with {} in {} style",
            page_num,
            chunks.len(),
            options.provider,
            options.style
        );

        let dispatcher = &self.dispatcher;
        let translated: Vec<TranslatedChunk> = futures::stream::iter(chunks.into_iter().map(
            move |original| async move {
                let request = TranslationRequest::new(
                    original.as_str(),
                    options.source_language.as_str(),
                    options.target_language.as_str(),
                    options.style,
                    options.provider,
                );
                let result = dispatcher.translate(&request).await;
                TranslatedChunk {
                    original,
                    translated: result.text,
                    success: result.success,
                }
            },
        ))
        .buffered(options.concurrency.max(1))
        .collect()
        .await;

        Ok(TranslatedPage {
            page_num,
            chunks: translated,
        })
    }

    /// Translate the given pages (all pages if `None`) in order.
    pub async fn translate_document(
        &self,
        doc: &PdfDocument,
        options: &TranslateOptions,
        pages: Option<&[usize]>,
        progress_callback: Option<Box<dyn Fn(usize, usize) + Send>>,
    ) -> Result<TranslatedDocument> {
        let pages: Vec<usize> = pages.map_or_else(|| (0..doc.page_count()).collect(), <[usize]>::to_vec);
        let total = pages.len();
        let mut translated_pages = Vec::with_capacity(total);

        for (done, page_num) in pages.into_iter().enumerate() {
            let page = self.translate_page(doc, page_num, options).await?;

            let failed = page.failed_chunks();
            if failed > 0 {
                warn!("{} of {} chunks failed on page {}", failed, page.chunks.len(), page_num);
            }
            translated_pages.push(page);

            if let Some(ref callback) = progress_callback {
                callback(done + 1, total);
            }
        }

        Ok(TranslatedDocument {
            title: doc.title().map(str::to_string),
            source_language: options.source_language.clone(),
            target_language: options.target_language.clone(),
            style: options.style,
            provider: options.provider,
            pages: translated_pages,
        })
    }
}
