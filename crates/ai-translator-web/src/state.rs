use ai_translator_core::{AppConfig, OutputFormat, PdfTranslator, TranslatedDocument};
use anyhow::Result;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use uuid::Uuid;

/// How long a finished translation stays downloadable
pub const JOB_MAX_AGE: Duration = Duration::from_secs(3600);

/// A finished translation waiting to be downloaded
pub struct TranslatedFile {
    /// Name offered to the browser
    pub filename: String,
    pub format: OutputFormat,
    pub content: String,
    pub created_at: Instant,
}

impl TranslatedFile {
    /// Render a translated document into a downloadable file named after the upload.
    pub fn new(upload_name: &str, doc: &TranslatedDocument, format: OutputFormat) -> Self {
        let stem = upload_name
            .rsplit_once('.')
            .map_or(upload_name, |(stem, _)| stem);
        let stem = if stem.is_empty() { "document" } else { stem };

        Self {
            filename: format!("{stem}-{}.{}", doc.target_language, format.extension()),
            format,
            content: doc.render(format),
            created_at: Instant::now(),
        }
    }
}

/// Global application state
pub struct AppState {
    /// Built once at startup and shared by every request
    pub translator: PdfTranslator,
    /// Finished jobs indexed by UUID
    jobs: RwLock<HashMap<Uuid, TranslatedFile>>,
}

impl AppState {
    /// Fails if the provider configuration is invalid.
    pub fn new(config: &AppConfig) -> Result<Self> {
        let translator = PdfTranslator::new(config)
            .map_err(|e| anyhow::anyhow!("Failed to create translator: {e}"))?;

        Ok(Self {
            translator,
            jobs: RwLock::new(HashMap::new()),
        })
    }

    /// Store a finished file and return its job ID as a string (for URL embedding).
    pub async fn store_job(&self, file: TranslatedFile) -> String {
        let id = Uuid::new_v4();
        self.jobs.write().await.insert(id, file);
        id.to_string()
    }

    /// Access a job within a closure.
    ///
    /// Returns `None` if the ID is not a valid UUID or the job doesn't exist.
    /// The read lock is released before this method returns.
    pub async fn with_job<F, R>(&self, id: &str, f: F) -> Option<R>
    where
        F: FnOnce(&TranslatedFile) -> R,
    {
        let uuid = Uuid::parse_str(id).ok()?;
        let jobs = self.jobs.read().await;
        jobs.get(&uuid).map(f)
    }

    /// Drop jobs older than `max_age`, returning how many were removed
    pub async fn cleanup_old_jobs(&self, max_age: Duration) -> usize {
        let mut jobs = self.jobs.write().await;
        let now = Instant::now();
        let before = jobs.len();

        jobs.retain(|_, job| now.duration_since(job.created_at) < max_age);

        before - jobs.len()
    }
}
