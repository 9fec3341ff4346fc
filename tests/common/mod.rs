//! Shared utilities for integration tests.

use bookmark_crud::{
    app, AlertChannel, AppState, Confirm, CrudOrchestrator, EntityConfig, Gateway, HttpTransport,
    MemoryStore, OrchestratorOptions,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Start the bookmarks backend on an ephemeral port; returns the `/api` base URL.
pub async fn start_backend() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = app(AppState::new(MemoryStore::new()), 64 * 1024);
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    format!("http://{}/api", addr)
}

/// Start a backend that answers every request with the given status and plain-text body.
#[allow(dead_code)]
pub async fn start_text_backend(status_line: &'static str, body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status_line,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });
    format!("http://{}/api", addr)
}

pub fn gateway(base_url: &str) -> Gateway {
    let transport = HttpTransport::new(base_url, Duration::from_secs(5)).unwrap();
    Gateway::new(Arc::new(transport), AlertChannel::new())
}

pub fn orchestrator(config: EntityConfig, gateway: Gateway) -> CrudOrchestrator {
    let confirm: Arc<dyn Confirm> = Arc::new(|_: &str| true);
    CrudOrchestrator::new(config, gateway, confirm, OrchestratorOptions::default()).unwrap()
}
