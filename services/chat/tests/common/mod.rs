//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use marvin_core::ports::ResponsePicker;
use marvin_lib::{
    adapters::{MiniJinjaRenderer, TokioDelay, UuidResponseIds},
    config::{BuildMode, Config},
    web::state::AppState,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Index of the catalog entry every test answer uses.
pub const ANSWER_INDEX: usize = 6;

pub fn crate_dir(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join(name)
}

pub fn test_config(build_mode: BuildMode) -> Config {
    let mut config = Config::from_lookup(|_| None).unwrap();
    config.build_mode = build_mode;
    config.build_version = "test-build".to_string();
    config.templates_path = crate_dir("templates");
    config.static_path = crate_dir("static");
    config.shared_path = crate_dir("shared");
    config.response_delay = Duration::ZERO;
    config
}

pub struct FixedPicker(pub usize);

impl ResponsePicker for FixedPicker {
    fn pick(&self, _len: usize) -> usize {
        self.0
    }
}

/// The production wiring, with a fixed answer and no simulated latency.
pub fn test_state(config: Config) -> Arc<AppState> {
    let renderer = Arc::new(MiniJinjaRenderer::new(
        config.templates_path.clone(),
        config.build_mode,
        config.build_version.clone(),
    ));
    let delay = Arc::new(TokioDelay::new(config.response_delay));

    Arc::new(AppState {
        config: Arc::new(config),
        renderer,
        picker: Arc::new(FixedPicker(ANSWER_INDEX)),
        response_ids: Arc::new(UuidResponseIds),
        delay,
    })
}
