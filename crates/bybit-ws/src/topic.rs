//! Topic names and parsing.
//!
//! A topic is a base name plus zero, one, or two dot-separated
//! parameters. The table of recognized bases is fixed; unknown bases are
//! ignored so the venue can add streams without breaking the client.

use crate::error::{WsError, WsResult};

/// 25-level order book: `orderBookL2_25.BTCUSD`.
pub const ORDER_BOOK_25L1: &str = "orderBookL2_25";
/// Realtime trades: `trade` or `trade.BTCUSD`.
pub const TRADE: &str = "trade";
/// Legacy kline: `kline.BTCUSD.1m`.
pub const KLINE: &str = "kline";
/// V2 kline: `klineV2.1.BTCUSD`.
pub const KLINE_V2: &str = "klineV2";
/// USDT-perpetual kline: `candle.1.BTCUSDT`.
pub const CANDLE: &str = "candle";
/// Daily insurance fund update: `insurance.BTC`.
pub const INSURANCE: &str = "insurance";
/// Latest instrument info: `instrument.BTCUSD`.
pub const INSTRUMENT: &str = "instrument";
/// Liquidation events: `liquidation.BTCUSD`.
pub const LIQUIDATION: &str = "liquidation";
/// Position changes (private).
pub const POSITION: &str = "position";
/// Fill events (private).
pub const EXECUTION: &str = "execution";
/// Active-order updates (private).
pub const ORDER: &str = "order";
/// Conditional-order updates (private).
pub const STOP_ORDER: &str = "stop_order";
/// Wallet balance updates (private).
pub const WALLET: &str = "wallet";

/// Join a base topic with a symbol: `orderBookL2_25.BTCUSD`.
pub fn with_symbol(base: &str, symbol: &str) -> String {
    format!("{base}.{symbol}")
}

/// Join an interval-parameterized base: `klineV2.1.BTCUSD`.
pub fn with_interval(base: &str, interval: &str, symbol: &str) -> String {
    format!("{base}.{interval}.{symbol}")
}

/// A recognized topic with its extracted parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedTopic {
    OrderBook { symbol: String },
    /// Symbol is empty for the all-symbols form of the stream.
    Trade { symbol: String },
    KLine { symbol: String, interval: String },
    KLineV2 { interval: String, symbol: String },
    Candle { interval: String, symbol: String },
    Insurance { currency: String },
    Instrument { symbol: String },
    Liquidation { symbol: String },
    Position,
    Execution,
    Order,
    StopOrder,
    Wallet,
}

/// Parse a topic string against the fixed table.
///
/// `Ok(None)` for unrecognized bases; `Err(TopicFormat)` when a
/// recognized base carries the wrong number of segments.
pub fn parse(topic: &str) -> WsResult<Option<ParsedTopic>> {
    let segments: Vec<&str> = topic.split('.').collect();
    let base = segments[0];

    let parsed = match base {
        ORDER_BOOK_25L1 => {
            expect_segments(topic, &segments, 2)?;
            ParsedTopic::OrderBook {
                symbol: segments[1].to_string(),
            }
        }
        TRADE => {
            // Both `trade` and `trade.BTCUSD` are valid on the wire.
            if segments.len() > 2 {
                return Err(WsError::TopicFormat(topic.to_string()));
            }
            ParsedTopic::Trade {
                symbol: segments.get(1).unwrap_or(&"").to_string(),
            }
        }
        KLINE => {
            expect_segments(topic, &segments, 3)?;
            ParsedTopic::KLine {
                symbol: segments[1].to_string(),
                interval: segments[2].to_string(),
            }
        }
        KLINE_V2 => {
            expect_segments(topic, &segments, 3)?;
            ParsedTopic::KLineV2 {
                interval: segments[1].to_string(),
                symbol: segments[2].to_string(),
            }
        }
        CANDLE => {
            expect_segments(topic, &segments, 3)?;
            ParsedTopic::Candle {
                interval: segments[1].to_string(),
                symbol: segments[2].to_string(),
            }
        }
        INSURANCE => {
            expect_segments(topic, &segments, 2)?;
            ParsedTopic::Insurance {
                currency: segments[1].to_string(),
            }
        }
        INSTRUMENT => {
            expect_segments(topic, &segments, 2)?;
            ParsedTopic::Instrument {
                symbol: segments[1].to_string(),
            }
        }
        LIQUIDATION => {
            expect_segments(topic, &segments, 2)?;
            ParsedTopic::Liquidation {
                symbol: segments[1].to_string(),
            }
        }
        POSITION => {
            expect_segments(topic, &segments, 1)?;
            ParsedTopic::Position
        }
        EXECUTION => {
            expect_segments(topic, &segments, 1)?;
            ParsedTopic::Execution
        }
        ORDER => {
            expect_segments(topic, &segments, 1)?;
            ParsedTopic::Order
        }
        STOP_ORDER => {
            expect_segments(topic, &segments, 1)?;
            ParsedTopic::StopOrder
        }
        WALLET => {
            expect_segments(topic, &segments, 1)?;
            ParsedTopic::Wallet
        }
        _ => return Ok(None),
    };

    Ok(Some(parsed))
}

fn expect_segments(topic: &str, segments: &[&str], expected: usize) -> WsResult<()> {
    if segments.len() != expected {
        return Err(WsError::TopicFormat(topic.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_order_book() {
        let parsed = parse("orderBookL2_25.BTCUSD").unwrap();
        assert_eq!(
            parsed,
            Some(ParsedTopic::OrderBook {
                symbol: "BTCUSD".to_string()
            })
        );
    }

    #[test]
    fn test_parse_kline_v2() {
        let parsed = parse("klineV2.1.BTCUSD").unwrap();
        assert_eq!(
            parsed,
            Some(ParsedTopic::KLineV2 {
                interval: "1".to_string(),
                symbol: "BTCUSD".to_string()
            })
        );
    }

    #[test]
    fn test_parse_kline_v2_extra_segment_is_format_error() {
        let result = parse("klineV2.1.BTCUSD.extra");
        assert!(matches!(result, Err(WsError::TopicFormat(_))));
    }

    #[test]
    fn test_parse_kline_segment_order_differs_from_v2() {
        // kline.BTCUSD.1m vs klineV2.1.BTCUSD
        let parsed = parse("kline.BTCUSD.1m").unwrap();
        assert_eq!(
            parsed,
            Some(ParsedTopic::KLine {
                symbol: "BTCUSD".to_string(),
                interval: "1m".to_string()
            })
        );
    }

    #[test]
    fn test_parse_trade_with_and_without_symbol() {
        assert_eq!(
            parse("trade").unwrap(),
            Some(ParsedTopic::Trade {
                symbol: String::new()
            })
        );
        assert_eq!(
            parse("trade.BTCUSD").unwrap(),
            Some(ParsedTopic::Trade {
                symbol: "BTCUSD".to_string()
            })
        );
        assert!(matches!(parse("trade.BTCUSD.extra"), Err(WsError::TopicFormat(_))));
    }

    #[test]
    fn test_parse_private_topics_are_bare() {
        assert_eq!(parse("position").unwrap(), Some(ParsedTopic::Position));
        assert_eq!(parse("wallet").unwrap(), Some(ParsedTopic::Wallet));
        assert!(matches!(parse("position.BTCUSD"), Err(WsError::TopicFormat(_))));
    }

    #[test]
    fn test_unknown_base_is_ignored() {
        assert_eq!(parse("fundingRate.BTCUSD").unwrap(), None);
    }

    #[test]
    fn test_topic_builders() {
        assert_eq!(with_symbol(ORDER_BOOK_25L1, "BTCUSD"), "orderBookL2_25.BTCUSD");
        assert_eq!(with_interval(KLINE_V2, "1", "BTCUSD"), "klineV2.1.BTCUSD");
    }
}
