//! Heartbeat and keepalive tracking.
//!
//! The client pings on a fixed cadence while connected. The venue
//! answers with an application-level pong (`ret_msg == "pong"`); each
//! pong (or protocol-level pong frame) resets the keepalive deadline.
//! A session with no pong inside the keepalive window is declared dead.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::time::Duration;
use tracing::debug;

pub struct Heartbeat {
    interval_ms: u64,
    keepalive_timeout_ms: u64,
    /// Last ping sent (for RTT logging).
    last_ping: RwLock<Option<DateTime<Utc>>>,
    /// Keepalive deadline anchor: session start or last pong.
    last_alive: RwLock<DateTime<Utc>>,
}

impl Heartbeat {
    pub fn new(interval_ms: u64, keepalive_timeout_ms: u64) -> Self {
        Self {
            interval_ms,
            keepalive_timeout_ms,
            last_ping: RwLock::new(None),
            last_alive: RwLock::new(Utc::now()),
        }
    }

    /// Re-arm for a fresh session.
    pub fn reset(&self) {
        *self.last_ping.write() = None;
        *self.last_alive.write() = Utc::now();
    }

    pub fn record_ping(&self) {
        *self.last_ping.write() = Some(Utc::now());
    }

    /// A pong arrived; push the keepalive deadline forward.
    pub fn record_pong(&self) {
        let now = Utc::now();
        *self.last_alive.write() = now;

        if let Some(ping_time) = *self.last_ping.read() {
            let rtt_ms = (now - ping_time).num_milliseconds();
            debug!(rtt_ms, "Received pong");
        }
    }

    /// True when the keepalive window has elapsed without a pong.
    pub fn is_stale(&self) -> bool {
        let elapsed_ms = (Utc::now() - *self.last_alive.read()).num_milliseconds();
        elapsed_ms > self.keepalive_timeout_ms as i64
    }

    /// Sleep until the next ping is due.
    pub async fn tick(&self) {
        tokio::time::sleep(Duration::from_millis(self.interval_ms)).await;
    }
}
