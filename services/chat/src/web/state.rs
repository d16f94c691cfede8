//! services/chat/src/web/state.rs
//!
//! Defines the application's shared and session-specific states.

use crate::{
    adapters::{MiniJinjaRenderer, RandomPicker, TokioDelay, UuidResponseIds},
    config::Config,
    web::protocol::PAGE_TEMPLATE,
};
use marvin_core::ports::{
    Delay, PortResult, ResponseIdGenerator, ResponsePicker, TemplateRenderer,
};
use std::sync::Arc;
use uuid::Uuid;

//=========================================================================================
// AppState (Shared Across All Connections)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
///
/// Sessions only read from it; the template cache inside the renderer is the
/// one piece of interior mutability.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub renderer: Arc<dyn TemplateRenderer>,
    pub picker: Arc<dyn ResponsePicker>,
    pub response_ids: Arc<dyn ResponseIdGenerator>,
    pub delay: Arc<dyn Delay>,
}

impl AppState {
    /// Wires the production adapters from `config`.
    ///
    /// Embedded builds compile the page template up front, so a broken
    /// template stops startup instead of failing the first request.
    pub fn from_config(config: Arc<Config>) -> PortResult<Self> {
        let renderer = Arc::new(MiniJinjaRenderer::new(
            config.templates_path.clone(),
            config.build_mode,
            config.build_version.clone(),
        ));
        if config.build_mode.is_embedded() {
            renderer.compiled(PAGE_TEMPLATE)?;
        }
        let delay = Arc::new(TokioDelay::new(config.response_delay));

        Ok(Self {
            config,
            renderer,
            picker: Arc::new(RandomPicker),
            response_ids: Arc::new(UuidResponseIds),
            delay,
        })
    }
}

//=========================================================================================
// ChatSession (Specific to One WebSocket Connection)
//=========================================================================================

/// Where a session currently is in its receive loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    AwaitingInput,
    EchoingInput,
    SimulatingLatency,
    EmittingResponse,
}

/// The state for a single, active WebSocket connection.
#[derive(Debug)]
pub struct ChatSession {
    /// Only used to correlate log lines.
    pub chat_id: Uuid,
    pub phase: SessionPhase,
    /// Number of questions answered so far.
    pub exchanges: u64,
}

impl ChatSession {
    pub fn new() -> Self {
        Self {
            chat_id: Uuid::new_v4(),
            phase: SessionPhase::AwaitingInput,
            exchanges: 0,
        }
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}
