//! Client configuration.

use serde::{Deserialize, Serialize};

/// Mainnet public stream.
pub const MAINNET_PUBLIC: &str = "wss://stream.bybit.com/realtime_public";
/// Mainnet private (authenticated) stream.
pub const MAINNET_PRIVATE: &str = "wss://stream.bybit.com/realtime_private";
/// Testnet public stream.
pub const TESTNET_PUBLIC: &str = "wss://stream-testnet.bybit.com/realtime_public";
/// Testnet private (authenticated) stream.
pub const TESTNET_PRIVATE: &str = "wss://stream-testnet.bybit.com/realtime_private";

/// Connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// WebSocket URL.
    pub url: String,
    /// Outbound proxy, e.g. "http://127.0.0.1:1081". Carried for the
    /// caller's config surface; transport-level proxying is delegated to
    /// the environment and a warning is logged when set.
    #[serde(default)]
    pub proxy: Option<String>,
    /// API key for the private streams.
    #[serde(default)]
    pub api_key: Option<String>,
    /// API secret for the private streams.
    #[serde(default)]
    pub secret_key: Option<String>,
    /// Reconnect automatically after a transport failure.
    #[serde(default = "default_true")]
    pub auto_reconnect: bool,
    /// Log every raw inbound frame at debug level.
    #[serde(default)]
    pub debug: bool,
    /// Fixed delay between reconnect attempts.
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
    /// Advisory retry ceiling: crossing it is logged, never enforced.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Heartbeat ping cadence.
    #[serde(default = "default_ping_interval_ms")]
    pub ping_interval_ms: u64,
    /// Session is declared dead when no pong arrives within this window.
    #[serde(default = "default_keepalive_timeout_ms")]
    pub keepalive_timeout_ms: u64,
}

fn default_true() -> bool {
    true
}

fn default_reconnect_delay_ms() -> u64 {
    2_000
}

fn default_max_retries() -> u32 {
    10
}

fn default_ping_interval_ms() -> u64 {
    5_000
}

fn default_keepalive_timeout_ms() -> u64 {
    60_000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url: MAINNET_PUBLIC.to_string(),
            proxy: None,
            api_key: None,
            secret_key: None,
            auto_reconnect: true,
            debug: false,
            reconnect_delay_ms: default_reconnect_delay_ms(),
            max_retries: default_max_retries(),
            ping_interval_ms: default_ping_interval_ms(),
            keepalive_timeout_ms: default_keepalive_timeout_ms(),
        }
    }
}

impl Config {
    /// True when both key and secret are configured.
    pub fn has_credentials(&self) -> bool {
        matches!((&self.api_key, &self.secret_key), (Some(k), Some(s)) if !k.is_empty() && !s.is_empty())
    }
}
