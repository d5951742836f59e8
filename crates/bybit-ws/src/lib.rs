//! Reconnecting WebSocket client for the Bybit realtime streams.
//!
//! Provides:
//! - Automatic reconnection with a fixed delay and full subscription replay
//! - Topic-based demultiplexing into typed per-topic callbacks
//! - Local order-book reconstruction (snapshot + delta) with price-sorted views
//! - Heartbeat pings and application-level pong keepalive
//! - Time-bound HMAC authentication for the private streams

pub mod config;
pub mod connection;
pub mod error;
pub mod heartbeat;
pub mod message;
pub mod router;
pub mod signer;
pub mod subscription;
pub mod topic;

pub use config::{
    Config, MAINNET_PRIVATE, MAINNET_PUBLIC, TESTNET_PRIVATE, TESTNET_PUBLIC,
};
pub use connection::{BybitWsClient, SessionState};
pub use error::{WsError, WsResult};
pub use message::{Command, Envelope};
pub use router::Router;
pub use subscription::SubscriptionRegistry;

use std::sync::Once;

static INIT_CRYPTO: Once = Once::new();

/// Initialize the TLS crypto provider.
/// Must be called before any WebSocket connections are made.
pub fn init_crypto() {
    INIT_CRYPTO.call_once(|| {
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}
