//! Wire message types.
//!
//! Outbound commands are `{"op": ..., "args": [...]}` objects; inbound
//! frames are either control replies (`ret_msg`, `success`) or data
//! events (`topic`, optional `type`, `data`).

use bybit_core::BookEntry;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outbound command object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    pub op: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<Value>,
}

impl Command {
    /// `{"op":"subscribe","args":[topic]}`
    pub fn subscribe(topic: &str) -> Self {
        Self {
            op: "subscribe".to_string(),
            args: vec![Value::String(topic.to_string())],
        }
    }

    /// `{"op":"auth","args":[api_key, expires, signature]}`
    pub fn auth(api_key: &str, expires: i64, signature: &str) -> Self {
        Self {
            op: "auth".to_string(),
            args: vec![
                Value::String(api_key.to_string()),
                Value::from(expires),
                Value::String(signature.to_string()),
            ],
        }
    }

    /// `{"op":"ping"}`
    pub fn ping() -> Self {
        Self {
            op: "ping".to_string(),
            args: Vec::new(),
        }
    }

    /// First topic argument, when present (subscribe commands).
    pub fn topic(&self) -> Option<&str> {
        self.args.first().and_then(Value::as_str)
    }
}

/// Inbound frame envelope.
///
/// Only the fields the demultiplexer reads; topic payload shapes are
/// decoded downstream per topic.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub ret_msg: Option<String>,
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
}

impl Envelope {
    /// Application-level heartbeat reply.
    pub fn is_pong(&self) -> bool {
        self.ret_msg.as_deref() == Some("pong")
    }

    /// Control reply to a previously sent command (no topic attached).
    pub fn is_command_ack(&self) -> bool {
        self.topic.is_none() && self.success.is_some()
    }
}

/// Snapshot payloads nest the rows under `data.order_book`; older
/// gateways send the bare array. Both decode here.
pub fn snapshot_rows(data: &Value) -> Result<Vec<BookEntry>, serde_json::Error> {
    let rows = match data {
        Value::Object(map) => map.get("order_book").cloned().unwrap_or(Value::Null),
        _ => data.clone(),
    };
    serde_json::from_value(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscribe_serialization() {
        let cmd = Command::subscribe("orderBookL2_25.BTCUSD");
        let json = serde_json::to_string(&cmd).unwrap();
        assert_eq!(json, r#"{"op":"subscribe","args":["orderBookL2_25.BTCUSD"]}"#);
    }

    #[test]
    fn test_ping_serialization_omits_args() {
        let json = serde_json::to_string(&Command::ping()).unwrap();
        assert_eq!(json, r#"{"op":"ping"}"#);
    }

    #[test]
    fn test_auth_serialization() {
        let cmd = Command::auth("key", 1578872523000, "f00d");
        let json = serde_json::to_string(&cmd).unwrap();
        assert_eq!(json, r#"{"op":"auth","args":["key",1578872523000,"f00d"]}"#);
    }

    #[test]
    fn test_pong_envelope() {
        let env: Envelope = serde_json::from_str(
            r#"{"success":true,"ret_msg":"pong","conn_id":"8a12cc","request":{"op":"ping"}}"#,
        )
        .unwrap();
        assert!(env.is_pong());
        assert!(env.topic.is_none());
    }

    #[test]
    fn test_data_envelope() {
        let env: Envelope = serde_json::from_str(
            r#"{"topic":"orderBookL2_25.BTCUSD","type":"delta","data":{"delete":[],"update":[],"insert":[]}}"#,
        )
        .unwrap();
        assert_eq!(env.topic.as_deref(), Some("orderBookL2_25.BTCUSD"));
        assert_eq!(env.kind.as_deref(), Some("delta"));
        assert!(!env.is_pong());
    }

    #[test]
    fn test_snapshot_rows_nested_and_bare() {
        let nested = serde_json::json!({"order_book": [
            {"price":"7767.5","symbol":"BTCUSD","id":77675000,"side":"Buy","size":1500}
        ]});
        assert_eq!(snapshot_rows(&nested).unwrap().len(), 1);

        let bare = serde_json::json!([
            {"price":"7767.5","symbol":"BTCUSD","id":77675000,"side":"Buy","size":1500}
        ]);
        assert_eq!(snapshot_rows(&bare).unwrap().len(), 1);
    }
}
