//! End-to-end chat tests using a real WebSocket client against a real listener.

mod common;

use common::{test_config, test_state, ANSWER_INDEX};
use futures::{SinkExt, StreamExt};
use marvin_core::domain::{CANNED_RESPONSES, GREETING};
use marvin_lib::{
    config::{BuildMode, Config},
    server::ServerLifecycle,
    web::router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::{net::TcpListener, sync::oneshot, task::JoinHandle, time::timeout};
use tokio_tungstenite::{
    connect_async,
    tungstenite::{
        protocol::{frame::coding::CloseCode, CloseFrame},
        Message,
    },
    MaybeTlsStream, WebSocketStream,
};

const TIMEOUT: Duration = Duration::from_secs(5);

type WsStream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

struct TestServer {
    addr: SocketAddr,
    stop: oneshot::Sender<()>,
    handle: JoinHandle<Result<(), marvin_lib::error::ApiError>>,
}

const SHUTDOWN_DEADLINE: Duration = Duration::from_millis(100);

/// Boot a server on an ephemeral port.
async fn boot_server() -> TestServer {
    boot_server_with(test_config(BuildMode::Embedded)).await
}

async fn boot_server_with(config: Config) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = router(test_state(config));
    let lifecycle = Arc::new(ServerLifecycle::new(SHUTDOWN_DEADLINE));
    let (stop, stopped) = oneshot::channel::<()>();

    let handle = tokio::spawn(async move {
        lifecycle
            .run_with_listener(listener, app, async {
                let _ = stopped.await;
            })
            .await
    });

    TestServer { addr, stop, handle }
}

async fn connect(addr: SocketAddr) -> WsStream {
    let (ws, _) = connect_async(format!("ws://{}/ws/chat", addr)).await.unwrap();
    ws
}

async fn next_text(ws: &mut WsStream) -> String {
    let msg = timeout(TIMEOUT, ws.next())
        .await
        .expect("timed out waiting for a frame")
        .expect("stream ended")
        .expect("read failed");
    msg.to_text().unwrap().to_string()
}

fn response_id(frame: &str) -> Option<&str> {
    let start = frame.find("id=\"")? + "id=\"".len();
    let end = frame[start..].find('"')? + start;
    Some(&frame[start..end])
}

async fn close_normally(ws: &mut WsStream) {
    ws.close(Some(CloseFrame {
        code: CloseCode::Normal,
        reason: "".into(),
    }))
    .await
    .unwrap();
}

#[tokio::test]
async fn greets_then_answers_each_question() {
    let server = boot_server().await;
    let mut ws = connect(server.addr).await;

    let greeting = next_text(&mut ws).await;
    assert!(greeting.contains("bot-message"));
    assert!(greeting.contains(GREETING));
    assert_eq!(response_id(&greeting), None);

    ws.send(Message::Text(r#"{"question":"hello"}"#.into()))
        .await
        .unwrap();

    let echo = next_text(&mut ws).await;
    assert!(echo.contains("human-message"));
    assert!(echo.contains(">hello<"));
    assert_eq!(response_id(&echo), None);

    let placeholder = next_text(&mut ws).await;
    assert!(placeholder.contains("bot-message"));
    assert!(placeholder.contains(">thinking<"));
    let placeholder_id = response_id(&placeholder).unwrap().to_string();
    assert!(placeholder_id.starts_with("res-"));

    let answer = next_text(&mut ws).await;
    assert!(answer.contains(CANNED_RESPONSES[ANSWER_INDEX]));
    assert_eq!(response_id(&answer), Some(placeholder_id.as_str()));

    close_normally(&mut ws).await;
    server.stop.send(()).unwrap();
    timeout(TIMEOUT, server.handle)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn response_ids_differ_between_questions() {
    let server = boot_server().await;
    let mut ws = connect(server.addr).await;
    next_text(&mut ws).await;

    let mut ids = Vec::new();
    for question in ["first", "second"] {
        ws.send(Message::Text(format!(r#"{{"question":"{}"}}"#, question).into()))
            .await
            .unwrap();
        next_text(&mut ws).await;
        let placeholder = next_text(&mut ws).await;
        let answer = next_text(&mut ws).await;
        assert_eq!(response_id(&placeholder), response_id(&answer));
        ids.push(response_id(&answer).unwrap().to_string());
    }
    assert_ne!(ids[0], ids[1]);

    close_normally(&mut ws).await;
}

#[tokio::test]
async fn questions_are_escaped_in_the_echo() {
    let server = boot_server().await;
    let mut ws = connect(server.addr).await;
    next_text(&mut ws).await;

    ws.send(Message::Text(r#"{"question":"<script>alert(1)</script>"}"#.into()))
        .await
        .unwrap();
    let echo = next_text(&mut ws).await;
    assert!(!echo.contains("<script>"));
    assert!(echo.contains("&lt;script&gt;"));
}

#[tokio::test]
async fn sessions_are_independent() {
    let server = boot_server().await;
    let mut first = connect(server.addr).await;
    let mut second = connect(server.addr).await;
    next_text(&mut first).await;
    next_text(&mut second).await;

    first
        .send(Message::Text(r#"{"question":"from first"}"#.into()))
        .await
        .unwrap();
    close_normally(&mut second).await;

    assert!(next_text(&mut first).await.contains("from first"));
    next_text(&mut first).await;
    assert!(next_text(&mut first)
        .await
        .contains(CANNED_RESPONSES[ANSWER_INDEX]));
}

#[tokio::test]
async fn invalid_input_closes_the_connection() {
    let server = boot_server().await;
    let mut ws = connect(server.addr).await;
    next_text(&mut ws).await;

    ws.send(Message::Text("not json".into())).await.unwrap();

    // The server drops the session: the next read is a close frame or the end
    // of the stream, never another chat frame.
    match timeout(TIMEOUT, ws.next()).await.unwrap() {
        None | Some(Err(_)) | Some(Ok(Message::Close(_))) => {}
        Some(Ok(other)) => panic!("unexpected frame {:?}", other),
    }
}

#[tokio::test]
async fn shutdown_does_not_wait_for_a_session_in_its_delay() {
    let mut config = test_config(BuildMode::Embedded);
    config.response_delay = Duration::from_secs(2);
    let server = boot_server_with(config).await;
    let mut ws = connect(server.addr).await;
    next_text(&mut ws).await;

    ws.send(Message::Text(r#"{"question":"still there?"}"#.into()))
        .await
        .unwrap();
    next_text(&mut ws).await;
    let placeholder = next_text(&mut ws).await;
    assert!(placeholder.contains(">thinking<"));

    // The session is now parked in its simulated delay.
    let started = Instant::now();
    server.stop.send(()).unwrap();
    let result = timeout(TIMEOUT, server.handle).await.unwrap().unwrap();
    assert!(result.is_ok(), "shutdown failed: {:?}", result);
    assert!(started.elapsed() < Duration::from_secs(2));

    // Upgraded connections are detached from the listener, so the session
    // still finishes its answer.
    let answer = next_text(&mut ws).await;
    assert_eq!(response_id(&answer), response_id(&placeholder));
}
