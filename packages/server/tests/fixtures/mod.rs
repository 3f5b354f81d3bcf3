//! Test fixtures shared by the integration tests.
#![allow(dead_code)]

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::{net::TcpStream, task::JoinHandle};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, tungstenite::Message};
use typerace_server::ServerConfig;

/// Server running in-process on a fixed local port.
///
/// Every test uses its own port so tests can run in parallel.
pub struct TestServer {
    port: u16,
    task: JoinHandle<()>,
}

impl TestServer {
    /// Start the server and wait until `/api/health` answers.
    pub async fn start(port: u16) -> Self {
        let task = tokio::spawn(async move {
            if let Err(e) = typerace_server::run_server(ServerConfig::local(port)).await {
                eprintln!("Test server on port {port} failed: {e}");
            }
        });
        let server = Self { port, task };
        server.wait_until_ready().await;
        server
    }

    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    pub fn ws_url(&self) -> String {
        format!("ws://127.0.0.1:{}/ws", self.port)
    }

    async fn wait_until_ready(&self) {
        let client = reqwest::Client::new();
        let url = format!("{}/api/health", self.base_url());
        for _ in 0..50 {
            if let Ok(response) = client.get(&url).send().await
                && response.status().is_success()
            {
                return;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        panic!("Test server on port {} did not become ready", self.port);
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Minimal WebSocket client speaking the JSON protocol.
pub struct WsClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl WsClient {
    pub async fn connect(url: &str) -> Self {
        let (stream, _) = tokio_tungstenite::connect_async(url)
            .await
            .expect("Failed to connect WebSocket");
        Self { stream }
    }

    /// Connect and send `joinGame` as `username`.
    pub async fn join(url: &str, username: &str) -> Self {
        let mut client = Self::connect(url).await;
        client
            .send(serde_json::json!({"type": "joinGame", "username": username}))
            .await;
        client
    }

    pub async fn send(&mut self, event: Value) {
        self.stream
            .send(Message::Text(event.to_string().into()))
            .await
            .expect("Failed to send frame");
    }

    /// Next JSON event, or None once the server closed the socket.
    pub async fn recv(&mut self) -> Option<Value> {
        loop {
            let frame = tokio::time::timeout(Duration::from_secs(10), self.stream.next())
                .await
                .expect("No frame within 10 seconds");
            match frame {
                Some(Ok(Message::Text(text))) => {
                    return Some(serde_json::from_str(text.as_str()).expect("Invalid JSON frame"));
                }
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => return None,
                Some(Ok(_)) => continue,
            }
        }
    }

    /// Skip events until one of type `kind` arrives.
    pub async fn recv_until(&mut self, kind: &str) -> Value {
        loop {
            match self.recv().await {
                Some(event) if event["type"] == kind => return event,
                Some(_) => continue,
                None => panic!("Socket closed while waiting for '{kind}'"),
            }
        }
    }
}
