//! services/chat/src/web/protocol.rs
//!
//! Defines the WebSocket message protocol between the browser client and the server.
//!
//! Inbound frames are JSON `ChatInput` objects. Outbound frames are HTML
//! fragments rendered from `index.html`, which the page script patches into
//! the DOM: a fragment whose id matches an existing element replaces it.

use axum::extract::ws::Message;
use marvin_core::{
    domain::{ChatInput, ChatMessage, Source},
    ports::{PortResult, TemplateData, TemplateRenderer},
};
use serde_json::Value;

/// The template group holding the page and every chat fragment.
pub const PAGE_TEMPLATE: &str = "index.html";

/// Block rendered for `GET /`.
pub const PAGE_BLOCK: &str = "main";

const BOT_BLOCK: &str = "chat_output";
const HUMAN_BLOCK: &str = "human_output";

/// Renders `msg` into the text of one outbound frame.
pub fn render_message(renderer: &dyn TemplateRenderer, msg: &ChatMessage) -> PortResult<String> {
    let block = match msg.source {
        Source::Bot => BOT_BLOCK,
        Source::Human => HUMAN_BLOCK,
    };
    renderer.render(PAGE_TEMPLATE, block, message_data(msg))
}

fn message_data(msg: &ChatMessage) -> TemplateData {
    let mut data = TemplateData::new();
    data.insert("message_type".into(), Value::from(msg.message_type.as_str()));
    data.insert("source".into(), Value::from(msg.source.as_str()));
    data.insert("text".into(), Value::from(msg.text.as_str()));
    data.insert("response_id".into(), Value::from(msg.response_id.as_str()));
    data
}

/// Decodes an inbound data frame. Returns `None` for control frames.
pub fn decode_input(msg: &Message) -> Option<serde_json::Result<ChatInput>> {
    match msg {
        Message::Text(text) => Some(serde_json::from_str(text.as_str())),
        Message::Binary(data) => Some(serde_json::from_slice(data)),
        Message::Ping(_) | Message::Pong(_) | Message::Close(_) => None,
    }
}
