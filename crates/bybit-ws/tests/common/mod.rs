//! Mock WebSocket server for integration tests.
//!
//! Accepts connections, records received messages, answers `ping`
//! commands with the venue's pong reply, and can push frames to or drop
//! every live connection.

use futures_util::{SinkExt, StreamExt};
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, mpsc, Mutex};
use tokio_tungstenite::{accept_async, tungstenite::Message};

/// Control messages fanned out to every live connection.
#[derive(Debug, Clone)]
enum Ctl {
    /// Push a text frame to the client.
    Send(String),
    /// Close the connection (simulated transport failure).
    Kick,
}

pub struct MockWsServer {
    addr: SocketAddr,
    shutdown_tx: mpsc::Sender<()>,
    ctl_tx: broadcast::Sender<Ctl>,
    messages: Arc<Mutex<VecDeque<String>>>,
    connections: Arc<Mutex<u32>>,
}

impl MockWsServer {
    /// Start a new mock server on an available port.
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let messages: Arc<Mutex<VecDeque<String>>> = Arc::new(Mutex::new(VecDeque::new()));
        let connections: Arc<Mutex<u32>> = Arc::new(Mutex::new(0));
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        let (ctl_tx, _) = broadcast::channel::<Ctl>(32);

        let messages_clone = messages.clone();
        let connections_clone = connections.clone();
        let ctl_clone = ctl_tx.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    Ok((stream, _)) = listener.accept() => {
                        let messages = messages_clone.clone();
                        let connections = connections_clone.clone();
                        let ctl_rx = ctl_clone.subscribe();
                        tokio::spawn(handle_connection(stream, messages, connections, ctl_rx));
                    }
                    _ = shutdown_rx.recv() => {
                        break;
                    }
                }
            }
        });

        Self {
            addr,
            shutdown_tx,
            ctl_tx,
            messages,
            connections,
        }
    }

    pub fn url(&self) -> String {
        format!("ws://{}", self.addr)
    }

    /// Number of connections accepted so far (never decremented).
    pub async fn connection_count(&self) -> u32 {
        *self.connections.lock().await
    }

    /// Every text message received, in arrival order.
    pub async fn received_messages(&self) -> Vec<String> {
        self.messages.lock().await.iter().cloned().collect()
    }

    /// Push a text frame to every live connection.
    pub fn broadcast(&self, text: impl Into<String>) {
        let _ = self.ctl_tx.send(Ctl::Send(text.into()));
    }

    /// Drop every live connection, simulating a transport failure.
    pub fn kick(&self) {
        let _ = self.ctl_tx.send(Ctl::Kick);
    }

    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
    }
}

async fn handle_connection(
    stream: TcpStream,
    messages: Arc<Mutex<VecDeque<String>>>,
    connections: Arc<Mutex<u32>>,
    mut ctl_rx: broadcast::Receiver<Ctl>,
) {
    {
        let mut count = connections.lock().await;
        *count += 1;
    }

    let ws_stream = match accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            eprintln!("WebSocket handshake failed: {}", e);
            return;
        }
    };

    let (mut write, mut read) = ws_stream.split();

    loop {
        tokio::select! {
            msg = read.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        {
                            let mut msgs = messages.lock().await;
                            msgs.push_back(text.clone());
                        }

                        // Answer heartbeats the way the venue does.
                        if let Ok(parsed) = serde_json::from_str::<serde_json::Value>(&text) {
                            if parsed.get("op") == Some(&serde_json::json!("ping")) {
                                let pong = serde_json::json!({
                                    "success": true,
                                    "ret_msg": "pong",
                                    "conn_id": "mock",
                                    "request": {"op": "ping"}
                                });
                                let _ = write.send(Message::Text(pong.to_string())).await;
                            }
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        let _ = write.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    _ => {}
                }
            }
            ctl = ctl_rx.recv() => {
                match ctl {
                    Ok(Ctl::Send(text)) => {
                        let _ = write.send(Message::Text(text)).await;
                    }
                    Ok(Ctl::Kick) => {
                        let _ = write.send(Message::Close(None)).await;
                        break;
                    }
                    Err(_) => break,
                }
            }
        }
    }
}
