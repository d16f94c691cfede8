//! services/chat/src/web/pages.rs
//!
//! Contains the Axum handler for the chat page itself.

use crate::web::{
    protocol::{PAGE_BLOCK, PAGE_TEMPLATE},
    state::AppState,
};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use marvin_core::ports::TemplateData;
use std::sync::Arc;
use tracing::error;

/// `GET /`: renders the chat page. Never cached, so template edits and new
/// builds are picked up on reload.
pub async fn index_handler(State(app_state): State<Arc<AppState>>) -> Response {
    match app_state
        .renderer
        .render(PAGE_TEMPLATE, PAGE_BLOCK, TemplateData::new())
    {
        Ok(text) => (
            [
                (header::CONTENT_TYPE, "text/html; charset=utf-8"),
                (header::CACHE_CONTROL, "no-store"),
            ],
            text,
        )
            .into_response(),
        Err(e) => {
            error!("render failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}
