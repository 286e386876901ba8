//! AI Translator Web - Web server for translating PDF documents with LLMs.

mod helpers;
mod routes;
mod state;
mod templates;

use ai_translator_core::AppConfig;
use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue},
    routing::{get, post},
    Router,
};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use state::{AppState, JOB_MAX_AGE};

/// Upload limit for PDF files
const MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

#[derive(Parser, Debug)]
#[command(name = "ai-translator-web")]
#[command(author, version, about = "AI Translator Web Server", long_about = None)]
struct Args {
    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to bind to
    #[arg(short, long, default_value = "3000")]
    port: u16,

    /// OpenAI API base URL
    #[arg(long, env = "OPENAI_API_BASE")]
    openai_api_base: Option<String>,

    /// OpenAI API key
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_api_key: Option<String>,

    /// OpenAI model name
    #[arg(long, env = "OPENAI_MODEL")]
    openai_model: Option<String>,

    /// ChatGLM API server URL
    #[arg(long, env = "GLM_ENDPOINT")]
    glm_endpoint: Option<String>,

    /// Config file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn apply(&self, config: &mut AppConfig) {
        if let Some(api_base) = &self.openai_api_base {
            config.openai.api_base.clone_from(api_base);
        }
        if let Some(api_key) = &self.openai_api_key {
            config.openai.api_key = Some(api_key.clone());
        }
        if let Some(model) = &self.openai_model {
            config.openai.model.clone_from(model);
        }
        if let Some(endpoint) = &self.glm_endpoint {
            config.glm.endpoint.clone_from(endpoint);
        }
    }
}

fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(routes::index))
        .route("/api/translate", post(routes::translate_pdf))
        .route("/api/download/{job_id}", get(routes::download_file))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
                .layer(CompressionLayer::new())
                // Result pages embed job IDs, keep them out of the bfcache
                .layer(SetResponseHeaderLayer::if_not_present(
                    header::CACHE_CONTROL,
                    HeaderValue::from_static("no-store, max-age=0"),
                )),
        )
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (before parsing args so env vars are available)
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let default_level = match args.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{default_level},hyper=info,reqwest=info")));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();

    let mut config = if let Some(config_path) = &args.config {
        AppConfig::from_file(config_path).context("Failed to load config file")?
    } else {
        AppConfig::load().context("Failed to load config")?
    };
    args.apply(&mut config);

    // Build the translator once - fails fast on bad provider settings
    let state = Arc::new(
        AppState::new(&config).context("Failed to initialize application state")?,
    );

    // Spawn background task for job cleanup (runs every 5 minutes)
    let cleanup_state = Arc::clone(&state);
    tokio::spawn(async move {
        let cleanup_interval = Duration::from_secs(5 * 60);
        loop {
            tokio::time::sleep(cleanup_interval).await;
            let removed = cleanup_state.cleanup_old_jobs(JOB_MAX_AGE).await;
            if removed > 0 {
                info!("Removed {} expired translations", removed);
            }
        }
    });

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app(state)).await?;

    Ok(())
}
