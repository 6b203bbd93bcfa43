//! Integration tests for the request channel against a canned in-process
//! HTTP responder.

use shared::dto::chat::ChatRequest;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use widget::{ClientConfig, HttpResponder, RequestError, ResponderApi, SessionId};

fn find_headers_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}

/// Accept one connection, read the full request, answer with a fixed
/// status line and JSON body.
async fn respond_once(listener: TcpListener, status: &'static str, body: &'static str) {
    let (mut stream, _) = listener.accept().await.unwrap();

    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = stream.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(headers_end) = find_headers_end(&buf) {
            let headers = String::from_utf8_lossy(&buf[..headers_end]);
            let content_length = headers
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    if name.eq_ignore_ascii_case("content-length") {
                        value.trim().parse::<usize>().ok()
                    } else {
                        None
                    }
                })
                .unwrap_or(0);
            if buf.len() >= headers_end + 4 + content_length {
                break;
            }
        }
    }

    let response = format!(
        "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );
    stream.write_all(response.as_bytes()).await.unwrap();
    stream.shutdown().await.unwrap();
}

fn responder_for(addr: std::net::SocketAddr) -> HttpResponder {
    HttpResponder::new(ClientConfig::new(format!("http://{}", addr)))
}

#[tokio::test]
async fn chat_success_decodes_reply() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(respond_once(
        listener,
        "200 OK",
        r#"{"response":"hi there","session_id":"abc","timestamp":"2024-01-01T00:00:00Z"}"#,
    ));

    let responder = responder_for(addr);
    let session = SessionId::new();
    let reply = responder
        .chat(&session, &ChatRequest::new("hello", None))
        .await
        .unwrap();

    assert_eq!(reply.response, "hi there");
    assert_eq!(reply.session_id, "abc");
    server.await.unwrap();
}

#[tokio::test]
async fn non_success_status_maps_to_server_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(respond_once(
        listener,
        "500 Internal Server Error",
        r#"{"detail":"Failed to process chat request"}"#,
    ));

    let responder = responder_for(addr);
    let session = SessionId::new();
    let result = responder
        .chat(&session, &ChatRequest::new("hello", None))
        .await;

    assert!(matches!(result, Err(RequestError::Server { status: 500 })));
    server.await.unwrap();
}

#[tokio::test]
async fn connection_refused_maps_to_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let responder = responder_for(addr);
    let session = SessionId::new();
    let result = responder
        .chat(&session, &ChatRequest::new("hello", None))
        .await;

    assert!(matches!(result, Err(RequestError::Network(_))));
}

#[tokio::test]
async fn malformed_body_maps_to_decode_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(respond_once(listener, "200 OK", "not json"));

    let responder = responder_for(addr);
    let session = SessionId::new();
    let result = responder
        .chat(&session, &ChatRequest::new("hello", None))
        .await;

    assert!(matches!(result, Err(RequestError::Decode(_))));
    server.await.unwrap();
}

#[tokio::test]
async fn history_decodes_entries() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(respond_once(
        listener,
        "200 OK",
        r#"{"history":[{"role":"user","content":"hello","timestamp":"2024-01-01T00:00:00Z"}]}"#,
    ));

    let responder = responder_for(addr);
    let session = SessionId::new();
    let history = responder.history(&session).await.unwrap();

    assert_eq!(history.history.len(), 1);
    assert_eq!(history.history[0].role, "user");
    assert_eq!(history.history[0].content, "hello");
    server.await.unwrap();
}

#[tokio::test]
async fn clear_session_decodes_confirmation() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(respond_once(
        listener,
        "200 OK",
        r#"{"message":"Session cleared successfully"}"#,
    ));

    let responder = responder_for(addr);
    let session = SessionId::new();
    let cleared = responder.clear_session(&session).await.unwrap();

    assert_eq!(cleared.message, "Session cleared successfully");
    server.await.unwrap();
}
