//! AI Translator CLI - Command line tool for translating PDF documents with LLMs.

use ai_translator_core::{AppConfig, OutputFormat, PdfDocument, PdfTranslator, Provider, Style};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StyleOption {
    /// 小说
    Novel,
    /// 新闻稿
    Press,
    /// 文艺作家
    Literary,
    /// No particular style
    None,
}

impl From<StyleOption> for Style {
    fn from(opt: StyleOption) -> Self {
        match opt {
            StyleOption::Novel => Self::Novel,
            StyleOption::Press => Self::Press,
            StyleOption::Literary => Self::Literary,
            StyleOption::None => Self::None,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ProviderOption {
    #[value(name = "openai")]
    OpenAi,
    Glm,
}

impl From<ProviderOption> for Provider {
    fn from(opt: ProviderOption) -> Self {
        match opt {
            ProviderOption::OpenAi => Self::OpenAi,
            ProviderOption::Glm => Self::Glm,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatOption {
    Markdown,
    Text,
}

impl From<FormatOption> for OutputFormat {
    fn from(opt: FormatOption) -> Self {
        match opt {
            FormatOption::Markdown => Self::Markdown,
            FormatOption::Text => Self::Text,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "ai-translate")]
#[command(author, version, about = "Translate PDF documents with OpenAI or GLM models", long_about = None)]
struct Args {
    /// Input PDF file
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: <input>-<target>.<md|txt>)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Source language name, passed to the model as-is (default: English)
    #[arg(short = 's', long)]
    source_language: Option<String>,

    /// Target language name, passed to the model as-is (default: Chinese)
    #[arg(short = 't', long)]
    target_language: Option<String>,

    /// Translation style
    #[arg(long, value_enum)]
    style: Option<StyleOption>,

    /// Model provider
    #[arg(short = 'p', long, value_enum)]
    provider: Option<ProviderOption>,

    /// Output format
    #[arg(short = 'f', long, value_enum)]
    format: Option<FormatOption>,

    /// OpenAI model name
    #[arg(long, env = "OPENAI_MODEL")]
    openai_model: Option<String>,

    /// OpenAI API base URL
    #[arg(long, env = "OPENAI_API_BASE")]
    openai_api_base: Option<String>,

    /// OpenAI API key
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_api_key: Option<String>,

    /// ChatGLM API server URL
    #[arg(long, env = "GLM_ENDPOINT")]
    glm_endpoint: Option<String>,

    /// Request timeout in seconds for either provider
    #[arg(long)]
    timeout: Option<u64>,

    /// Chunks of one page translated at the same time
    #[arg(long)]
    concurrency: Option<usize>,

    /// Maximum characters per request (0 = whole page)
    #[arg(long)]
    max_chunk_chars: Option<usize>,

    /// Config file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Translate only specific pages (e.g., "1-5" or "1,3,5")
    #[arg(long)]
    pages: Option<String>,
}

impl Args {
    /// Override config values with the flags that were given
    fn apply(&self, config: &mut AppConfig) {
        let translation = &mut config.translation;
        if let Some(source) = &self.source_language {
            translation.source_language.clone_from(source);
        }
        if let Some(target) = &self.target_language {
            translation.target_language.clone_from(target);
        }
        if let Some(style) = self.style {
            translation.style = style.into();
        }
        if let Some(provider) = self.provider {
            translation.provider = provider.into();
        }
        if let Some(format) = self.format {
            translation.output_format = format.into();
        }
        if let Some(concurrency) = self.concurrency {
            translation.concurrency = concurrency;
        }
        if let Some(max_chunk_chars) = self.max_chunk_chars {
            translation.max_chunk_chars = max_chunk_chars;
        }

        if let Some(model) = &self.openai_model {
            config.openai.model.clone_from(model);
        }
        if let Some(api_base) = &self.openai_api_base {
            config.openai.api_base.clone_from(api_base);
        }
        if let Some(api_key) = &self.openai_api_key {
            config.openai.api_key = Some(api_key.clone());
        }
        if let Some(endpoint) = &self.glm_endpoint {
            config.glm.endpoint.clone_from(endpoint);
        }
        if let Some(timeout) = self.timeout {
            config.openai.timeout_secs = timeout;
            config.glm.timeout_secs = timeout;
        }
    }
}

/// Parse a 1-based page selection into sorted, deduplicated 0-based indices.
///
/// Pages beyond the document are ignored.
fn parse_page_range(pages: &str, total: usize) -> Result<Vec<usize>> {
    let mut result = Vec::new();

    for part in pages.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        if let Some((start, end)) = part.split_once('-') {
            let start: usize = start.trim().parse().context("Invalid page range start")?;
            let end: usize = end.trim().parse().context("Invalid page range end")?;
            if start > end {
                anyhow::bail!("Invalid page range {part}: start is after end");
            }
            result.extend((start.max(1)..=end.min(total)).map(|p| p - 1));
        } else {
            let page: usize = part.parse().context("Invalid page number")?;
            if page > 0 && page <= total {
                result.push(page - 1);
            }
        }
    }

    result.sort_unstable();
    result.dedup();
    Ok(result)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (before parsing args so env vars are available)
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Setup logging
    let log_level = match args.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    // Load or create config
    let mut config = if let Some(config_path) = &args.config {
        AppConfig::from_file(config_path).context("Failed to load config file")?
    } else {
        AppConfig::load().context("Failed to load config")?
    };
    args.apply(&mut config);

    // Build the translator once; configuration errors surface here
    let translator = PdfTranslator::new(&config).context("Failed to initialize translator")?;
    let options = translator.default_options();
    let format = config.translation.output_format;

    // Load input PDF
    info!("Loading PDF: {}", args.input.display());
    let doc = PdfDocument::from_file(&args.input)
        .context(format!("Failed to load PDF: {}", args.input.display()))?;

    let total_pages = doc.page_count();
    info!("Document has {} pages", total_pages);

    // Determine which pages to translate
    let pages = if let Some(ref page_spec) = args.pages {
        parse_page_range(page_spec, total_pages)?
    } else {
        (0..total_pages).collect()
    };

    if pages.is_empty() {
        anyhow::bail!("No valid pages to translate");
    }

    info!(
        "Translating {} pages from {} to {} ({} style, {})",
        pages.len(),
        options.source_language,
        options.target_language,
        options.style,
        options.provider
    );

    // Setup progress bar
    #[allow(clippy::cast_possible_truncation)]
    let pb = ProgressBar::new(pages.len() as u64);
    // Template is hardcoded and valid, unwrap is safe
    #[allow(clippy::unwrap_used)]
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .unwrap()
            .progress_chars("#>-"),
    );

    let progress = pb.clone();
    let translated = translator
        .translate_document(
            &doc,
            &options,
            Some(&pages),
            Some(Box::new(move |done: usize, _total: usize| {
                progress.set_position(done as u64);
            })),
        )
        .await
        .context("Failed to translate document")?;

    pb.finish_with_message("Translation complete");

    let failed = translated.failed_chunks();
    let chunks = translated.chunk_count();
    if chunks > 0 && failed == chunks {
        anyhow::bail!("No text could be translated ({failed} chunks failed)");
    }
    if failed > 0 {
        warn!("{} of {} chunks could not be translated and were left empty", failed, chunks);
    }

    // Determine output path
    let output_path = args.output.clone().unwrap_or_else(|| {
        ai_translator_core::util::default_output_path(
            &args.input,
            &options.target_language,
            format.extension(),
        )
    });

    translated
        .save(&output_path, format)
        .context(format!("Failed to write output: {}", output_path.display()))?;

    // CLI output is intentional
    #[allow(clippy::print_stdout)]
    {
        println!("Translated document saved to: {}", output_path.display());
    }

    Ok(())
}
