//! Connection manager.
//!
//! Owns the WebSocket session: dial, authenticate, replay subscriptions,
//! read-loop, heartbeat, failure detection, and reconnect. One session
//! task serializes every outbound write; caller-initiated sends travel
//! over a channel into that task.

use crate::config::Config;
use crate::error::{WsError, WsResult};
use crate::heartbeat::Heartbeat;
use crate::message::{Command, Envelope};
use crate::router::Router;
use crate::signer;
use crate::subscription::SubscriptionRegistry;
use bybit_book::{BookEngine, BookView};
use bybit_core::{
    Execution, Insurance, Instrument, KLine, KLineV2, Liquidation, Order, Position, StopOrder,
    Trade, Wallet,
};
use chrono::Utc;
use futures_util::{SinkExt, StreamExt};
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex as TokioMutex};
use tokio_tungstenite::{connect_async_tls_with_config, tungstenite::Message};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

type WsSink = futures_util::stream::SplitSink<
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>,
    Message,
>;

/// Session state. Owned exclusively by the connection manager; external
/// readers take a brief shared read lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connecting,
    /// Transport is up, auth command not yet sent. Skipped entirely when
    /// no credentials are configured.
    ConnectedUnauthenticated,
    /// Auth sent (or not required) and subscription replay underway.
    ConnectedReady,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disconnected => write!(f, "DISCONNECTED"),
            Self::Connecting => write!(f, "CONNECTING"),
            Self::ConnectedUnauthenticated => write!(f, "CONNECTED_UNAUTHENTICATED"),
            Self::ConnectedReady => write!(f, "CONNECTED_READY"),
        }
    }
}

/// Reconnecting WebSocket client for the venue's realtime streams.
pub struct BybitWsClient {
    config: Config,
    state: RwLock<SessionState>,
    registry: SubscriptionRegistry,
    books: Arc<BookEngine>,
    router: Router,
    heartbeat: Heartbeat,
    reconnect_count: RwLock<u32>,
    /// Caller-side sends, drained by the session task.
    outbound_tx: mpsc::Sender<Command>,
    outbound_rx: TokioMutex<mpsc::Receiver<Command>>,
    /// Permanent shutdown.
    shutdown_token: CancellationToken,
    /// Current session's forced-reconnect token, replaced per session.
    session_token: RwLock<CancellationToken>,
}

impl BybitWsClient {
    pub fn new(config: Config) -> Self {
        let (outbound_tx, outbound_rx) = mpsc::channel(100);
        let books = Arc::new(BookEngine::new());
        let heartbeat = Heartbeat::new(config.ping_interval_ms, config.keepalive_timeout_ms);
        Self {
            router: Router::new(books.clone()),
            config,
            state: RwLock::new(SessionState::Disconnected),
            registry: SubscriptionRegistry::new(),
            books,
            heartbeat,
            reconnect_count: RwLock::new(0),
            outbound_tx,
            outbound_rx: TokioMutex::new(outbound_rx),
            shutdown_token: CancellationToken::new(),
            session_token: RwLock::new(CancellationToken::new()),
        }
    }

    /// Current session state.
    pub fn session_state(&self) -> SessionState {
        *self.state.read()
    }

    /// True in any connected state.
    pub fn is_connected(&self) -> bool {
        matches!(
            self.session_state(),
            SessionState::ConnectedUnauthenticated | SessionState::ConnectedReady
        )
    }

    /// Current book view for `symbol`, if a snapshot has been applied
    /// this session.
    pub fn book(&self, symbol: &str) -> Option<BookView> {
        self.books.view(symbol)
    }

    /// Registered topics, in registration order.
    pub fn subscriptions(&self) -> Vec<String> {
        self.registry.topics()
    }

    /// Register a topic subscription.
    ///
    /// The topic is recorded for replay on every (re)connection; when the
    /// session is ready the subscribe command is also sent immediately.
    /// Fire-and-forget: no venue acknowledgement is awaited.
    pub fn subscribe(&self, topic: &str) -> WsResult<()> {
        let cmd = self.registry.add(topic);
        if self.session_state() == SessionState::ConnectedReady {
            self.outbound_tx
                .try_send(cmd)
                .map_err(|e| WsError::SendFailed(e.to_string()))?;
        }
        Ok(())
    }

    /// Tear down the current session and let the run loop redial.
    pub fn close_and_reconnect(&self) {
        info!("Forced reconnect requested");
        self.session_token.read().cancel();
    }

    /// Stop the client permanently.
    pub fn shutdown(&self) {
        info!("Shutdown requested");
        self.shutdown_token.cancel();
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown_token.is_cancelled()
    }

    // Callback registration, one slot per base topic; the last
    // registration for a topic wins.

    pub fn on_order_book(&self, f: impl Fn(&str, &BookView) + Send + Sync + 'static) {
        self.router.on_order_book(f);
    }

    pub fn on_trade(&self, f: impl Fn(&str, &[Trade]) + Send + Sync + 'static) {
        self.router.on_trade(f);
    }

    pub fn on_kline(&self, f: impl Fn(&str, &KLine) + Send + Sync + 'static) {
        self.router.on_kline(f);
    }

    pub fn on_kline_v2(&self, f: impl Fn(&str, &[KLineV2]) + Send + Sync + 'static) {
        self.router.on_kline_v2(f);
    }

    pub fn on_candle(&self, f: impl Fn(&str, &[KLineV2]) + Send + Sync + 'static) {
        self.router.on_candle(f);
    }

    pub fn on_insurance(&self, f: impl Fn(&str, &[Insurance]) + Send + Sync + 'static) {
        self.router.on_insurance(f);
    }

    pub fn on_instrument(&self, f: impl Fn(&str, &[Instrument]) + Send + Sync + 'static) {
        self.router.on_instrument(f);
    }

    pub fn on_liquidation(&self, f: impl Fn(&str, &Liquidation) + Send + Sync + 'static) {
        self.router.on_liquidation(f);
    }

    pub fn on_position(&self, f: impl Fn(&[Position]) + Send + Sync + 'static) {
        self.router.on_position(f);
    }

    pub fn on_execution(&self, f: impl Fn(&[Execution]) + Send + Sync + 'static) {
        self.router.on_execution(f);
    }

    pub fn on_order(&self, f: impl Fn(&[Order]) + Send + Sync + 'static) {
        self.router.on_order(f);
    }

    pub fn on_stop_order(&self, f: impl Fn(&[StopOrder]) + Send + Sync + 'static) {
        self.router.on_stop_order(f);
    }

    pub fn on_wallet(&self, f: impl Fn(&[Wallet]) + Send + Sync + 'static) {
        self.router.on_wallet(f);
    }

    /// Connect and serve until shutdown.
    ///
    /// Retries indefinitely with a fixed delay while `auto_reconnect` is
    /// set; the configured `max_retries` is advisory and only logged.
    /// Every per-symbol book is dropped on each session teardown.
    pub async fn run(&self) -> WsResult<()> {
        if let Some(proxy) = &self.config.proxy {
            warn!(%proxy, "Proxy configured but not applied at the transport layer");
        }

        loop {
            if self.is_shutdown() {
                *self.state.write() = SessionState::Disconnected;
                return Ok(());
            }

            *self.state.write() = SessionState::Connecting;
            let result = self.try_connect().await;

            // Teardown: books cannot absorb deltas across sessions.
            self.books.clear();
            *self.state.write() = SessionState::Disconnected;

            match result {
                Ok(()) => {
                    info!("WebSocket session ended");
                    return Ok(());
                }
                Err(e) => {
                    error!(error = %e, "WebSocket session error");
                    if self.is_shutdown() {
                        return Ok(());
                    }
                    if !self.config.auto_reconnect {
                        return Err(e);
                    }
                }
            }

            let attempt = {
                let mut count = self.reconnect_count.write();
                *count += 1;
                *count
            };
            if attempt > self.config.max_retries {
                warn!(
                    attempt,
                    max_retries = self.config.max_retries,
                    "Past advisory retry ceiling; continuing to reconnect"
                );
            }

            let delay = Duration::from_millis(self.config.reconnect_delay_ms);
            info!(attempt, delay_ms = delay.as_millis() as u64, "Reconnecting");

            tokio::select! {
                () = tokio::time::sleep(delay) => {}
                () = self.shutdown_token.cancelled() => {
                    *self.state.write() = SessionState::Disconnected;
                    return Ok(());
                }
            }
        }
    }

    /// One session: dial, auth, replay, then serve frames until failure.
    async fn try_connect(&self) -> WsResult<()> {
        info!(url = %self.config.url, "Connecting to WebSocket");

        let (ws_stream, _response) =
            connect_async_tls_with_config(&self.config.url, None, true, None).await?;
        let (mut write, mut read) = ws_stream.split();

        *self.reconnect_count.write() = 0;
        let session_token = CancellationToken::new();
        *self.session_token.write() = session_token.clone();
        info!("WebSocket connected");

        // Auth is fire-and-forget: the venue's ack is asynchronous and
        // uncorrelated, so replay does not wait for it.
        if self.config.has_credentials() {
            *self.state.write() = SessionState::ConnectedUnauthenticated;
            if let (Some(key), Some(secret)) = (&self.config.api_key, &self.config.secret_key) {
                let cmd = signer::auth_command(key, secret, Utc::now().timestamp_millis());
                send_command(&mut write, &cmd).await?;
                debug!("Sent auth command");
            }
        }
        *self.state.write() = SessionState::ConnectedReady;
        self.heartbeat.reset();

        let replay = self.registry.commands();
        let replayed = replay.len();
        for cmd in &replay {
            send_command(&mut write, cmd).await?;
        }
        info!(count = replayed, "Replayed subscriptions");

        loop {
            let outbound_recv = async { self.outbound_rx.lock().await.recv().await };

            tokio::select! {
                () = self.shutdown_token.cancelled() => {
                    info!("Shutdown signal received in session loop");
                    let _ = write.send(Message::Close(None)).await;
                    return Ok(());
                }

                () = session_token.cancelled() => {
                    let _ = write.send(Message::Close(None)).await;
                    return Err(WsError::ConnectionFailed("reconnect requested".to_string()));
                }

                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            self.handle_frame(&text);
                        }
                        Some(Ok(Message::Ping(data))) => {
                            write.send(Message::Pong(data)).await?;
                        }
                        Some(Ok(Message::Pong(_))) => {
                            self.heartbeat.record_pong();
                        }
                        Some(Ok(Message::Close(frame))) => {
                            let (code, reason) = frame
                                .map(|f| (f.code.into(), f.reason.to_string()))
                                .unwrap_or((1000, "Normal close".to_string()));
                            warn!(code, %reason, "WebSocket closed by server");
                            return Err(WsError::ConnectionClosed { code, reason });
                        }
                        Some(Err(e)) => {
                            error!(error = %e, "WebSocket read error");
                            return Err(e.into());
                        }
                        None => {
                            warn!("WebSocket stream ended");
                            return Err(WsError::ConnectionClosed {
                                code: 1006,
                                reason: "Stream ended".to_string(),
                            });
                        }
                        _ => {}
                    }
                }

                cmd = outbound_recv => {
                    if let Some(cmd) = cmd {
                        send_command(&mut write, &cmd).await?;
                    }
                }

                _ = self.heartbeat.tick() => {
                    if self.heartbeat.is_stale() {
                        error!("Keepalive timeout");
                        return Err(WsError::KeepAliveTimeout);
                    }
                    send_command(&mut write, &Command::ping()).await?;
                    self.heartbeat.record_ping();
                }
            }
        }
    }

    /// Process one inbound text frame. Never session-fatal: a malformed
    /// frame is logged and dropped, the loop keeps reading.
    fn handle_frame(&self, text: &str) {
        if self.config.debug {
            debug!(frame = %text, "Inbound frame");
        }

        let envelope: Envelope = match serde_json::from_str(text) {
            Ok(env) => env,
            Err(e) => {
                warn!(error = %e, "Dropped unparseable frame");
                return;
            }
        };

        // Heartbeat replies feed the keepalive and stop here; they never
        // reach a topic callback.
        if envelope.is_pong() {
            self.heartbeat.record_pong();
            return;
        }

        if envelope.is_command_ack() {
            debug!(success = ?envelope.success, ret_msg = ?envelope.ret_msg, "Command ack");
            return;
        }

        if let Some(topic) = &envelope.topic {
            let data = envelope.data.unwrap_or(serde_json::Value::Null);
            if let Err(e) = self.router.route(topic, envelope.kind.as_deref(), &data) {
                warn!(topic, error = %e, "Dropped undecodable frame");
            }
        }
    }
}

async fn send_command(write: &mut WsSink, cmd: &Command) -> WsResult<()> {
    let payload = serde_json::to_string(cmd)?;
    write.send(Message::Text(payload)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn test_client() -> BybitWsClient {
        BybitWsClient::new(Config {
            url: "ws://127.0.0.1:1".to_string(),
            ..Default::default()
        })
    }

    #[test]
    fn test_initial_state() {
        let client = test_client();
        assert_eq!(client.session_state(), SessionState::Disconnected);
        assert!(!client.is_connected());
        assert!(client.book("BTCUSD").is_none());
    }

    #[test]
    fn test_subscribe_while_disconnected_queues_for_replay() {
        let client = test_client();
        client.subscribe("orderBookL2_25.BTCUSD").unwrap();
        client.subscribe("trade").unwrap();

        assert_eq!(
            client.subscriptions(),
            vec!["orderBookL2_25.BTCUSD", "trade"]
        );
    }

    #[test]
    fn test_pong_frame_reaches_no_callback() {
        let client = test_client();
        let fired = Arc::new(AtomicUsize::new(0));
        let fired_clone = fired.clone();
        client.on_order_book(move |_, _| {
            fired_clone.fetch_add(1, Ordering::SeqCst);
        });

        client.handle_frame(
            r#"{"success":true,"ret_msg":"pong","conn_id":"8a12cc","request":{"op":"ping"}}"#,
        );
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_snapshot_frame_builds_book() {
        let client = test_client();
        let frame = json!({
            "topic": "orderBookL2_25.BTCUSD",
            "type": "snapshot",
            "data": {"order_book": [
                {"price":"7767.5","symbol":"BTCUSD","id":77675000,"side":"Buy","size":1500}
            ]}
        });
        client.handle_frame(&frame.to_string());

        let view = client.book("BTCUSD").unwrap();
        assert_eq!(view.bids.len(), 1);
    }

    #[test]
    fn test_malformed_frame_is_not_fatal() {
        let client = test_client();
        client.handle_frame("not json at all");
        client.handle_frame(r#"{"topic":"klineV2.1.BTCUSD.extra","data":[]}"#);
        // Still alive and stateless afterwards.
        assert_eq!(client.session_state(), SessionState::Disconnected);
    }

    #[test]
    fn test_shutdown_flag() {
        let client = test_client();
        assert!(!client.is_shutdown());
        client.shutdown();
        assert!(client.is_shutdown());
    }
}
