//! services/chat/src/web/assets.rs
//!
//! Static asset routes and their browser cache policy.
//!
//! `/static/{build_version}/` serves the app's own assets; the version in the
//! path busts the browser cache on every new build. `/shared/` serves assets
//! that never change between builds.

use crate::config::Config;
use axum::{
    http::{header, HeaderValue},
    Router,
};
use tower_http::{services::ServeDir, set_header::SetResponseHeaderLayer};

/// Browsers may keep embedded assets for ten minutes.
pub const CACHEABLE: &str = "private, max-age=600";

/// Development assets are re-fetched on every load.
pub const NO_STORE: &str = "no-store";

/// Builds the layer that stamps `Cache-Control` on every asset response.
pub fn cache_control(embedded: bool) -> SetResponseHeaderLayer<HeaderValue> {
    let value = if embedded { CACHEABLE } else { NO_STORE };
    SetResponseHeaderLayer::overriding(header::CACHE_CONTROL, HeaderValue::from_static(value))
}

/// The URL prefix of the versioned asset directory.
pub fn static_prefix(build_version: &str) -> String {
    format!("/static/{}", build_version)
}

/// Routes for both asset directories.
pub fn asset_routes(config: &Config) -> Router {
    let versioned = Router::new()
        .nest_service(
            &static_prefix(&config.build_version),
            ServeDir::new(&config.static_path),
        )
        .layer(cache_control(config.build_mode.is_embedded()));

    let shared = Router::new()
        .nest_service("/shared", ServeDir::new(&config.shared_path))
        .layer(cache_control(true));

    versioned.merge(shared)
}
