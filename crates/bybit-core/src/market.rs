//! Public-topic market data records.
//!
//! Typed payloads for the venue's public streams. Numeric fields arrive
//! as JSON numbers or strings depending on the topic; `Decimal`-backed
//! types decode both.

use crate::{Price, Side};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single trade print.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    pub timestamp: DateTime<Utc>,
    pub symbol: String,
    pub side: Side,
    pub size: i64,
    pub price: Price,
    pub tick_direction: String,
    pub trade_id: String,
    pub cross_seq: i64,
}

/// Legacy kline bar (`kline.BTCUSD.1m`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KLine {
    pub id: i64,
    #[serde(default)]
    pub symbol: String,
    pub open_time: i64,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
    pub turnover: Decimal,
    #[serde(default)]
    pub interval: String,
}

/// V2 kline bar (`klineV2.1.BTCUSD`, also the `candle` stream shape).
///
/// `symbol` and `interval` are not part of the payload; the router
/// backfills them from the topic segments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KLineV2 {
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub interval: String,
    pub start: i64,
    pub end: i64,
    pub open: Decimal,
    pub close: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub volume: Decimal,
    pub turnover: Decimal,
    pub confirm: bool,
    #[serde(default)]
    pub cross_seq: i64,
    #[serde(default)]
    pub timestamp: i64,
}

/// Daily insurance fund update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Insurance {
    pub currency: String,
    pub timestamp: DateTime<Utc>,
    pub wallet_balance: i64,
}

/// Latest instrument info (mark/index price).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instrument {
    pub symbol: String,
    #[serde(default)]
    pub mark_price: Decimal,
    #[serde(default)]
    pub index_price: Decimal,
}

/// Forced liquidation event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Liquidation {
    pub symbol: String,
    pub side: Side,
    pub price: Price,
    pub qty: Decimal,
    /// Epoch milliseconds.
    pub time: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_trade_decode() {
        let raw = r#"{
            "timestamp": "2020-01-12T16:59:59.266Z",
            "symbol": "BTCUSD",
            "side": "Sell",
            "size": 2000,
            "price": 8098.5,
            "tick_direction": "MinusTick",
            "trade_id": "3cbc62c6-8e8b-5a89-89fb-b39b53e6391f",
            "cross_seq": 1052816407
        }"#;
        let trade: Trade = serde_json::from_str(raw).unwrap();
        assert_eq!(trade.symbol, "BTCUSD");
        assert_eq!(trade.side, Side::Sell);
        assert_eq!(trade.price, Price::new(dec!(8098.5)));
    }

    #[test]
    fn test_kline_v2_decode_without_topic_fields() {
        let raw = r#"{
            "start": 1572425640,
            "end": 1572425700,
            "open": 9200,
            "close": 9202.5,
            "high": 9202.5,
            "low": 9196,
            "volume": 81790,
            "turnover": 8.889247899999999,
            "confirm": false,
            "cross_seq": 297503466,
            "timestamp": 1572425676958323
        }"#;
        let kline: KLineV2 = serde_json::from_str(raw).unwrap();
        assert_eq!(kline.symbol, "");
        assert_eq!(kline.open, dec!(9200));
        assert!(!kline.confirm);
    }

    #[test]
    fn test_liquidation_decode_string_price() {
        let raw = r#"{"symbol":"BTCUSD","side":"Buy","price":"7500.5","qty":100,"time":1578872523000}"#;
        let liq: Liquidation = serde_json::from_str(raw).unwrap();
        assert_eq!(liq.price, Price::new(dec!(7500.5)));
    }
}
