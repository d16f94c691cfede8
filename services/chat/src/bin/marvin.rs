//! services/chat/src/bin/marvin.rs

use marvin_lib::{
    config::Config,
    error::ApiError,
    server::run_server,
    web::{router, state::AppState},
};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!(
        mode = ?config.build_mode,
        version = %config.build_version,
        "Configuration loaded. Starting server..."
    );

    // --- 2. Build the Shared AppState ---
    let app_state = Arc::new(AppState::from_config(config.clone())?);

    // --- 3. Create the Web Router ---
    let app = router(app_state);

    // --- 4. Serve Until Interrupted ---
    if let Err(e) = run_server(config.bind_address, app, config.shutdown_timeout).await {
        error!(error = %e, "server failed");
        return Err(e);
    }
    info!("server stopped");

    Ok(())
}
