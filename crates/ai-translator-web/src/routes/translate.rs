//! Translate route - upload a PDF and run the whole pipeline.

use ai_translator_core::{OutputFormat, PdfDocument, Provider, Style, TranslateOptions};
use axum::{extract::State, http::StatusCode};
use axum_extra::extract::Multipart;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::helpers::{ResultExt, RouteResult};
use crate::state::{AppState, TranslatedFile};
use crate::templates::ResultTemplate;

/// Fields of the upload form
#[derive(Debug, Default)]
pub struct UploadForm {
    pub filename: Option<String>,
    pub data: Vec<u8>,
    pub source_language: Option<String>,
    pub target_language: Option<String>,
    /// Style label as shown in the form (小说, 新闻稿, ...)
    pub style: Option<String>,
    /// Provider label (`OpenAI` or `GLM`)
    pub provider: Option<String>,
    pub format: Option<String>,
}

impl UploadForm {
    /// Apply the submitted choices on top of the configured defaults.
    ///
    /// Blank languages keep the default; unknown labels fall back the same way
    /// the dispatcher does.
    pub fn options(&self, defaults: TranslateOptions) -> TranslateOptions {
        let non_blank = |v: &Option<String>| v.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(str::to_string);

        TranslateOptions {
            source_language: non_blank(&self.source_language).unwrap_or(defaults.source_language),
            target_language: non_blank(&self.target_language).unwrap_or(defaults.target_language),
            style: self.style.as_deref().map_or(defaults.style, Style::from_label),
            provider: self.provider.as_deref().map_or(defaults.provider, Provider::from_label),
            ..defaults
        }
    }

    pub fn output_format(&self, default: OutputFormat) -> OutputFormat {
        self.format
            .as_deref()
            .and_then(OutputFormat::from_name)
            .unwrap_or(default)
    }

    async fn read(mut multipart: Multipart) -> RouteResult<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await.or_bad_request()? {
            let name = field.name().unwrap_or("").to_string();
            match name.as_str() {
                "file" => {
                    form.filename = field.file_name().map(str::to_string);
                    form.data = field.bytes().await.or_bad_request()?.to_vec();
                }
                "source_language" => form.source_language = Some(field.text().await.or_bad_request()?),
                "target_language" => form.target_language = Some(field.text().await.or_bad_request()?),
                "style" => form.style = Some(field.text().await.or_bad_request()?),
                "provider" => form.provider = Some(field.text().await.or_bad_request()?),
                "format" => form.format = Some(field.text().await.or_bad_request()?),
                _ => {}
            }
        }

        Ok(form)
    }
}

/// Translate an uploaded PDF and render the result page.
pub async fn translate_pdf(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> RouteResult<ResultTemplate> {
    let form = UploadForm::read(multipart).await?;
    if form.data.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "No file uploaded".to_string()));
    }

    let upload_name = form.filename.clone().unwrap_or_else(|| "document.pdf".to_string());
    let options = form.options(state.translator.default_options());
    let format = form.output_format(state.translator.settings().output_format);

    // Parse PDF in a blocking task to avoid blocking the async runtime
    let data = form.data;
    let doc = tokio::task::spawn_blocking(move || PdfDocument::from_bytes(&data))
        .await
        .map_err(|e| {
            error!("PDF parsing task panicked: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "PDF parsing failed".to_string(),
            )
        })?
        .map_err(|e| {
            error!("Failed to parse PDF: {}", e);
            (StatusCode::BAD_REQUEST, format!("Invalid PDF: {e}"))
        })?;

    info!(
        "Translating {} ({} pages) from {} to {} with {} in {} style",
        upload_name,
        doc.page_count(),
        options.source_language,
        options.target_language,
        options.provider,
        options.style
    );

    let translated = state
        .translator
        .translate_document(&doc, &options, None, None)
        .await
        .map_err(|e| {
            error!("Failed to translate {}: {}", upload_name, e);
            (StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
        })?;

    let chunks = translated.chunk_count();
    let failed = translated.failed_chunks();
    if chunks > 0 && failed == chunks {
        return Err((
            StatusCode::BAD_GATEWAY,
            format!("Translation failed: none of the {chunks} chunks could be translated"),
        ));
    }
    if failed > 0 {
        warn!("{} of {} chunks failed for {}", failed, chunks, upload_name);
    }

    let file = TranslatedFile::new(&upload_name, &translated, format);
    let download_name = file.filename.clone();
    let job_id = state.store_job(file).await;

    info!("Stored translation {} as job {}", download_name, job_id);

    Ok(ResultTemplate::new(job_id, upload_name, download_name, &translated))
}
