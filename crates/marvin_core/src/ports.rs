//! crates/marvin_core/src/ports.rs
//!
//! Defines the service contracts (traits) the chat session depends on.
//! Rendering, randomness and time are all behind these ports so the session
//! loop can be driven deterministically in tests.

use async_trait::async_trait;
use serde_json::{Map, Value};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// The error type for all port operations.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    /// A template group could not be opened, read, parsed or rendered.
    #[error("{group} {stage} error: {reason}")]
    Template {
        group: String,
        stage: &'static str,
        reason: String,
    },
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

/// The data mapping handed to a template.
pub type TemplateData = Map<String, Value>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

pub trait TemplateRenderer: Send + Sync {
    /// Renders the sub-template `name` of the template group `group`.
    ///
    /// Implementations inject the build version into `data` before rendering.
    fn render(&self, group: &str, name: &str, data: TemplateData) -> PortResult<String>;
}

pub trait ResponsePicker: Send + Sync {
    /// Picks an index in `0..len`. `len` is never zero.
    fn pick(&self, len: usize) -> usize;
}

pub trait ResponseIdGenerator: Send + Sync {
    /// Returns an id that was not returned before by this generator.
    fn next_id(&self) -> String;
}

#[async_trait]
pub trait Delay: Send + Sync {
    /// Suspends the calling task for the simulated generation time.
    async fn wait(&self);
}
