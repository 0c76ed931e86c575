// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Serving over a real socket and shutting down gracefully

use super::support::{HashEmbedder, DIMENSION};
use sentence_embed_node::api::{serve, AppState};
use sentence_embed_node::embeddings::EmbeddingModel;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;

async fn raw_request(addr: std::net::SocketAddr, request: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();
    response
}

#[tokio::test]
async fn test_serves_until_shutdown_then_releases_model() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let model: Arc<dyn EmbeddingModel> = Arc::new(HashEmbedder::new(DIMENSION));
    let weak = Arc::downgrade(&model);
    let state = AppState::new(model);

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let server = tokio::spawn(serve(listener, state, async move {
        let _ = shutdown_rx.await;
    }));

    let body = r#"{"text": "over the wire"}"#;
    let response = raw_request(
        addr,
        &format!(
            "POST /embed HTTP/1.1\r\nHost: localhost\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        ),
    )
    .await;
    assert!(response.starts_with("HTTP/1.1 200"), "got: {}", response);
    assert!(response.contains("\"embedding\":["));

    let response = raw_request(
        addr,
        "GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
    )
    .await;
    assert!(response.starts_with("HTTP/1.1 200"), "got: {}", response);
    assert!(response.contains(r#"{"status":"healthy"}"#));

    shutdown_tx.send(()).unwrap();
    tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .expect("server should stop after shutdown signal")
        .unwrap()
        .unwrap();

    // Connection tasks may still be unwinding right after serve returns
    let released = async {
        while weak.upgrade().is_some() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    };
    tokio::time::timeout(Duration::from_secs(2), released)
        .await
        .expect("model should be dropped after shutdown");
}
