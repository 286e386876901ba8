//! Landing page.

use axum::extract::State;
use std::sync::Arc;

use crate::state::AppState;
use crate::templates::IndexTemplate;

/// Upload form, preselected with the configured defaults.
pub async fn index(State(state): State<Arc<AppState>>) -> IndexTemplate {
    let settings = state.translator.settings();
    IndexTemplate::new(
        &settings.source_language,
        &settings.target_language,
        settings.style,
        settings.provider,
        settings.output_format,
    )
}
