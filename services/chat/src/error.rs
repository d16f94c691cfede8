//! services/chat/src/error.rs
//!
//! Defines the error types for the chat service.

use crate::config::ConfigError;
use marvin_core::ports::PortError;
use std::time::Duration;

/// The primary error type for the `marvin` service.
///
/// Anything that reaches `main` as an `ApiError` ends the process.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// In-flight connections did not drain before the shutdown deadline.
    #[error("Shutdown did not complete within {0:?}")]
    ShutdownTimeout(Duration),
}

/// Errors that end a single chat session. They are logged and never leave
/// the session's task.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("ws read: {0}")]
    Receive(#[source] axum::Error),

    #[error("ws write: {0}")]
    Send(#[source] axum::Error),

    #[error("decode chat input: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("render: {0}")]
    Render(#[from] PortError),

    #[error("connection closed with code {0}")]
    AbnormalClose(u16),
}
