//! services/chat/src/web/ws_handler.rs
//!
//! This is the main entry point and control loop for a chat WebSocket connection.
//! Each connection greets the user, then for every question echoes it back,
//! shows a "thinking" placeholder and finally replaces it with a canned answer.

use crate::{
    error::SessionError,
    web::{
        protocol::{decode_input, render_message},
        state::{AppState, ChatSession, SessionPhase},
    },
};
use axum::{
    extract::{
        ws::{close_code, rejection::WebSocketUpgradeRejection, Message},
        State, WebSocketUpgrade,
    },
    response::{IntoResponse, Response},
};
use futures::{Sink, SinkExt, Stream, StreamExt};
use marvin_core::domain::{ChatInput, ChatMessage, CANNED_RESPONSES, GREETING, THINKING};
use std::sync::Arc;
use tracing::{debug, error, info, info_span, Instrument};

/// How a session ended when nothing went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The client sent a normal-closure or going-away close frame.
    Closed(u16),
    /// The stream ended without a close frame.
    Disconnected,
}

enum Inbound {
    Input(ChatInput),
    End(SessionEnd),
}

/// The handler for upgrading `GET /ws/chat` to a chat WebSocket.
pub async fn chat_handler(
    State(app_state): State<Arc<AppState>>,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Response {
    let session = ChatSession::new();
    let span = info_span!("chat", chat_id = %session.chat_id);
    span.in_scope(|| info!("starting chat"));

    let ws = match ws {
        Ok(ws) => ws,
        Err(rejection) => {
            span.in_scope(|| error!(error = %rejection, "ws.Upgrade"));
            return rejection.into_response();
        }
    };

    let failed_span = span.clone();
    ws.on_failed_upgrade(move |e: axum::Error| {
        failed_span.in_scope(|| error!(error = %e, "ws.Upgrade"))
    })
    .on_upgrade(move |socket| handle_socket(socket, app_state, session).instrument(span))
}

/// Drives one upgraded connection to completion and closes it.
///
/// Generic over the transport so the loop can run against an in-memory socket.
pub async fn handle_socket<S>(mut socket: S, app_state: Arc<AppState>, mut session: ChatSession)
where
    S: Stream<Item = Result<Message, axum::Error>> + Sink<Message, Error = axum::Error> + Unpin,
{
    match run_session(&mut socket, &app_state, &mut session).await {
        Ok(SessionEnd::Closed(code)) => {
            info!(code, exchanges = session.exchanges, "stopping chat");
        }
        Ok(SessionEnd::Disconnected) => {
            info!(exchanges = session.exchanges, "client disconnected");
        }
        Err(e) => {
            error!(error = %e, phase = ?session.phase, "chat failed");
        }
    }

    // The peer may already be gone; there is nothing left to report then.
    if let Err(e) = socket.close().await {
        debug!(error = %e, "socket close");
    }
}

/// The session state machine. Returns when the client leaves or on the first
/// transport, decode or render failure.
pub async fn run_session<S>(
    socket: &mut S,
    app_state: &AppState,
    session: &mut ChatSession,
) -> Result<SessionEnd, SessionError>
where
    S: Stream<Item = Result<Message, axum::Error>> + Sink<Message, Error = axum::Error> + Unpin,
{
    send_message(socket, app_state, &ChatMessage::bot(GREETING, "")).await?;

    loop {
        session.phase = SessionPhase::AwaitingInput;
        let input = match receive_input(socket).await? {
            Inbound::Input(input) => input,
            Inbound::End(end) => return Ok(end),
        };

        session.phase = SessionPhase::EchoingInput;
        send_message(socket, app_state, &ChatMessage::human(input.question)).await?;

        let response_id = app_state.response_ids.next_id();
        send_message(socket, app_state, &ChatMessage::bot(THINKING, response_id.as_str())).await?;

        session.phase = SessionPhase::SimulatingLatency;
        app_state.delay.wait().await;

        session.phase = SessionPhase::EmittingResponse;
        let last = CANNED_RESPONSES.len() - 1;
        let answer = CANNED_RESPONSES[app_state.picker.pick(CANNED_RESPONSES.len()).min(last)];
        send_message(socket, app_state, &ChatMessage::bot(answer, response_id)).await?;

        session.exchanges += 1;
        debug!(exchanges = session.exchanges, "answered question");
    }
}

async fn receive_input<S>(socket: &mut S) -> Result<Inbound, SessionError>
where
    S: Stream<Item = Result<Message, axum::Error>> + Unpin,
{
    loop {
        let msg = match socket.next().await {
            Some(Ok(msg)) => msg,
            Some(Err(e)) => return Err(SessionError::Receive(e)),
            None => return Ok(Inbound::End(SessionEnd::Disconnected)),
        };

        if let Message::Close(frame) = &msg {
            let code = frame.as_ref().map_or(close_code::STATUS, |f| f.code);
            return match code {
                close_code::NORMAL | close_code::AWAY => Ok(Inbound::End(SessionEnd::Closed(code))),
                _ => Err(SessionError::AbnormalClose(code)),
            };
        }

        match decode_input(&msg) {
            Some(input) => return Ok(Inbound::Input(input?)),
            None => continue,
        }
    }
}

async fn send_message<S>(
    socket: &mut S,
    app_state: &AppState,
    msg: &ChatMessage,
) -> Result<(), SessionError>
where
    S: Sink<Message, Error = axum::Error> + Unpin,
{
    let frame = render_message(app_state.renderer.as_ref(), msg)?;
    socket
        .send(Message::Text(frame.into()))
        .await
        .map_err(SessionError::Send)
}
