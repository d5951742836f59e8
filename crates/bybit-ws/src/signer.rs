//! Authentication signature for the private streams.
//!
//! The venue authenticates a socket with a time-bound HMAC: SHA-256 over
//! the literal `GET/realtime` concatenated with an expiry timestamp in
//! epoch milliseconds, keyed by the API secret, hex-encoded.

use crate::message::Command;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Forward offset added to "now" for the signature expiry.
pub const AUTH_EXPIRY_OFFSET_MS: i64 = 10_000;

/// Hex-encoded HMAC-SHA256 of `payload` keyed by `secret`.
pub fn sign(secret: &str, payload: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(payload.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Build the auth command for `now_ms` (epoch milliseconds).
pub fn auth_command(api_key: &str, secret: &str, now_ms: i64) -> Command {
    let expires = now_ms + AUTH_EXPIRY_OFFSET_MS;
    let signature = sign(secret, &format!("GET/realtime{expires}"));
    Command::auth(api_key, expires, &signature)
}
