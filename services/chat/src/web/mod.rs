pub mod assets;
pub mod pages;
pub mod protocol;
pub mod state;
pub mod ws_handler;

// Re-export the handlers to make them easily accessible
// to the binary that builds the web server router.
pub use pages::index_handler;
pub use ws_handler::chat_handler;

use axum::{routing::get, Router};
use state::AppState;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Builds the complete application router.
pub fn router(app_state: Arc<AppState>) -> Router {
    let assets = assets::asset_routes(&app_state.config);

    Router::new()
        .route("/", get(index_handler))
        .route("/ws/chat", get(chat_handler))
        .with_state(app_state)
        .merge(assets)
        .layer(TraceLayer::new_for_http())
}
