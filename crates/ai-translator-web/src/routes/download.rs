//! Download route - serves a finished translation.

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::Response,
};
use std::sync::Arc;

use crate::helpers::{OptionExt, ResultExt, RouteResult};
use crate::state::AppState;

/// `Content-Disposition` value carrying both an ASCII fallback and the UTF-8 name.
pub fn content_disposition(filename: &str) -> String {
    let fallback: String = filename
        .chars()
        .map(|c| if c.is_ascii_graphic() && c != '"' && c != '\\' { c } else { '_' })
        .collect();
    format!(
        "attachment; filename=\"{fallback}\"; filename*=UTF-8''{}",
        urlencoding::encode(filename)
    )
}

/// Download a translated document by job ID.
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
) -> RouteResult<Response> {
    // Copy out inside lock (fast)
    let (filename, mime, content) = state
        .with_job(&job_id, |job| (job.filename.clone(), job.format.mime_type(), job.content.clone()))
        .await
        .or_not_found("Translation not found or expired")?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, mime)
        .header(header::CONTENT_DISPOSITION, content_disposition(&filename))
        .body(Body::from(content))
        .or_internal_error()
}
