//! Integration tests for the streaming channel against an in-process
//! WebSocket server.

use futures_util::{SinkExt, StreamExt};
use shared::dto::chat::{ChatRequest, ServerFrame};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::protocol::{frame::coding::CloseCode, CloseFrame};
use tokio_tungstenite::tungstenite::Message;

use widget::channel::{ChannelEvent, StreamingChannel, NORMAL_CLOSURE};
use widget::{ClientConfig, SendError, SessionId, StreamLink};

#[tokio::test]
async fn full_exchange_and_graceful_close() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();

        // Welcome frame pushed on connect, like the real backend.
        ws.send(Message::Text(
            r#"{"type":"message","content":"welcome","timestamp":"2024-01-01T00:00:00Z"}"#
                .to_string(),
        ))
        .await
        .unwrap();

        while let Some(Ok(message)) = ws.next().await {
            match message {
                Message::Text(text) => {
                    let request: ChatRequest = serde_json::from_str(&text).unwrap();
                    assert_eq!(request.user_type, "user");
                    let reply = serde_json::json!({
                        "type": "message",
                        "content": format!("echo: {}", request.message),
                        "timestamp": "2024-01-01T00:00:00Z",
                    });
                    ws.send(Message::Text(reply.to_string())).await.unwrap();
                }
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    let config = ClientConfig::new(format!("http://{}", addr));
    let session = SessionId::new();
    let (events_tx, mut events) = mpsc::unbounded_channel();
    let channel = StreamingChannel::open(&config, &session, events_tx);

    assert!(matches!(events.recv().await, Some(ChannelEvent::Opened)));
    match events.recv().await {
        Some(ChannelEvent::Frame(ServerFrame::Message { content, .. })) => {
            assert_eq!(content, "welcome");
        }
        other => panic!("expected welcome frame, got {:?}", other),
    }

    channel.send(&ChatRequest::new("ping", None)).unwrap();
    match events.recv().await {
        Some(ChannelEvent::Frame(ServerFrame::Message { content, .. })) => {
            assert_eq!(content, "echo: ping");
        }
        other => panic!("expected echo frame, got {:?}", other),
    }

    channel.close(NORMAL_CLOSURE, "done");
    match events.recv().await {
        Some(ChannelEvent::Closed { code, .. }) => assert_eq!(code, NORMAL_CLOSURE),
        other => panic!("expected closed event, got {:?}", other),
    }

    server.await.unwrap();
}

#[tokio::test]
async fn send_before_connected_fails_with_not_open() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let config = ClientConfig::new(format!("http://{}", addr));
    let session = SessionId::new();
    let (events_tx, _events) = mpsc::unbounded_channel();
    let channel = StreamingChannel::open(&config, &session, events_tx);

    // The connect task has not run yet on this single-threaded runtime.
    let result = channel.send(&ChatRequest::new("too early", None));
    assert!(matches!(result, Err(SendError::NotOpen)));
}

#[tokio::test]
async fn connect_failure_reports_abnormal_closure() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = ClientConfig::new(format!("http://{}", addr));
    let session = SessionId::new();
    let (events_tx, mut events) = mpsc::unbounded_channel();
    let _channel = StreamingChannel::open(&config, &session, events_tx);

    match events.recv().await {
        Some(ChannelEvent::Closed { code, .. }) => assert_ne!(code, NORMAL_CLOSURE),
        other => panic!("expected closed event, got {:?}", other),
    }
}

#[tokio::test]
async fn server_close_code_is_forwarded() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();
        ws.send(Message::Close(Some(CloseFrame {
            code: CloseCode::from(1011),
            reason: "restarting".into(),
        })))
        .await
        .unwrap();
        // Drain until the peer acknowledges.
        while let Some(Ok(_)) = ws.next().await {}
    });

    let config = ClientConfig::new(format!("http://{}", addr));
    let session = SessionId::new();
    let (events_tx, mut events) = mpsc::unbounded_channel();
    let _channel = StreamingChannel::open(&config, &session, events_tx);

    assert!(matches!(events.recv().await, Some(ChannelEvent::Opened)));
    match events.recv().await {
        Some(ChannelEvent::Closed { code, reason }) => {
            assert_eq!(code, 1011);
            assert_eq!(reason, "restarting");
        }
        other => panic!("expected closed event, got {:?}", other),
    }

    server.await.unwrap();
}

#[tokio::test]
async fn malformed_frame_surfaces_as_protocol_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();
        ws.send(Message::Text("not json at all".to_string()))
            .await
            .unwrap();
        // Connection stays up after the bad frame.
        ws.send(Message::Text(
            r#"{"type":"message","content":"still here","timestamp":"2024-01-01T00:00:00Z"}"#
                .to_string(),
        ))
        .await
        .unwrap();
        while let Some(Ok(message)) = ws.next().await {
            if matches!(message, Message::Close(_)) {
                break;
            }
        }
    });

    let config = ClientConfig::new(format!("http://{}", addr));
    let session = SessionId::new();
    let (events_tx, mut events) = mpsc::unbounded_channel();
    let channel = StreamingChannel::open(&config, &session, events_tx);

    assert!(matches!(events.recv().await, Some(ChannelEvent::Opened)));
    assert!(matches!(
        events.recv().await,
        Some(ChannelEvent::ProtocolError(_))
    ));
    match events.recv().await {
        Some(ChannelEvent::Frame(ServerFrame::Message { content, .. })) => {
            assert_eq!(content, "still here");
        }
        other => panic!("expected frame after protocol error, got {:?}", other),
    }

    channel.close(NORMAL_CLOSURE, "done");
    server.await.unwrap();
}
