//! Inbound frame demultiplexer.
//!
//! Classifies a data frame by topic, decodes the payload into its typed
//! record, and hands the result to the registered callback for that base
//! topic. Book topics fold through the [`BookEngine`] first; their
//! callback receives the resulting price-sorted view, never the raw
//! delta. One callback slot per base topic; re-registering replaces the
//! previous callback. Subscribing and registering are independent: only
//! the intersection produces visible effects.

use crate::error::{WsError, WsResult};
use crate::message::snapshot_rows;
use crate::topic::{self, ParsedTopic};
use bybit_book::{BookEngine, BookError, BookView};
use bybit_core::{
    BookDelta, Execution, Insurance, Instrument, KLine, KLineV2, Liquidation, Order, Position,
    StopOrder, Trade, Wallet,
};
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

type SymbolCallback<T> = Option<Arc<dyn Fn(&str, &T) + Send + Sync>>;
type SymbolBatchCallback<T> = Option<Arc<dyn Fn(&str, &[T]) + Send + Sync>>;
type AccountCallback<T> = Option<Arc<dyn Fn(&[T]) + Send + Sync>>;

#[derive(Default)]
struct Callbacks {
    order_book: SymbolCallback<BookView>,
    trade: SymbolBatchCallback<Trade>,
    kline: SymbolCallback<KLine>,
    kline_v2: SymbolBatchCallback<KLineV2>,
    candle: SymbolBatchCallback<KLineV2>,
    insurance: SymbolBatchCallback<Insurance>,
    instrument: SymbolBatchCallback<Instrument>,
    liquidation: SymbolCallback<Liquidation>,
    position: AccountCallback<Position>,
    execution: AccountCallback<Execution>,
    order: AccountCallback<Order>,
    stop_order: AccountCallback<StopOrder>,
    wallet: AccountCallback<Wallet>,
}

/// Topic-keyed demultiplexer with one typed callback slot per base topic.
pub struct Router {
    books: Arc<BookEngine>,
    callbacks: RwLock<Callbacks>,
}

impl Router {
    pub fn new(books: Arc<BookEngine>) -> Self {
        Self {
            books,
            callbacks: RwLock::new(Callbacks::default()),
        }
    }

    pub fn on_order_book(&self, f: impl Fn(&str, &BookView) + Send + Sync + 'static) {
        self.callbacks.write().order_book = Some(Arc::new(f));
    }

    pub fn on_trade(&self, f: impl Fn(&str, &[Trade]) + Send + Sync + 'static) {
        self.callbacks.write().trade = Some(Arc::new(f));
    }

    pub fn on_kline(&self, f: impl Fn(&str, &KLine) + Send + Sync + 'static) {
        self.callbacks.write().kline = Some(Arc::new(f));
    }

    pub fn on_kline_v2(&self, f: impl Fn(&str, &[KLineV2]) + Send + Sync + 'static) {
        self.callbacks.write().kline_v2 = Some(Arc::new(f));
    }

    pub fn on_candle(&self, f: impl Fn(&str, &[KLineV2]) + Send + Sync + 'static) {
        self.callbacks.write().candle = Some(Arc::new(f));
    }

    pub fn on_insurance(&self, f: impl Fn(&str, &[Insurance]) + Send + Sync + 'static) {
        self.callbacks.write().insurance = Some(Arc::new(f));
    }

    pub fn on_instrument(&self, f: impl Fn(&str, &[Instrument]) + Send + Sync + 'static) {
        self.callbacks.write().instrument = Some(Arc::new(f));
    }

    pub fn on_liquidation(&self, f: impl Fn(&str, &Liquidation) + Send + Sync + 'static) {
        self.callbacks.write().liquidation = Some(Arc::new(f));
    }

    pub fn on_position(&self, f: impl Fn(&[Position]) + Send + Sync + 'static) {
        self.callbacks.write().position = Some(Arc::new(f));
    }

    pub fn on_execution(&self, f: impl Fn(&[Execution]) + Send + Sync + 'static) {
        self.callbacks.write().execution = Some(Arc::new(f));
    }

    pub fn on_order(&self, f: impl Fn(&[Order]) + Send + Sync + 'static) {
        self.callbacks.write().order = Some(Arc::new(f));
    }

    pub fn on_stop_order(&self, f: impl Fn(&[StopOrder]) + Send + Sync + 'static) {
        self.callbacks.write().stop_order = Some(Arc::new(f));
    }

    pub fn on_wallet(&self, f: impl Fn(&[Wallet]) + Send + Sync + 'static) {
        self.callbacks.write().wallet = Some(Arc::new(f));
    }

    /// Route one data frame.
    ///
    /// Unrecognized topics are a no-op. Format and decode failures are
    /// returned for the read loop to log; they are never session-fatal.
    pub fn route(&self, topic_str: &str, kind: Option<&str>, data: &Value) -> WsResult<()> {
        let Some(parsed) = topic::parse(topic_str)? else {
            debug!(topic = topic_str, "Ignoring unrecognized topic");
            return Ok(());
        };

        match parsed {
            ParsedTopic::OrderBook { symbol } => self.route_book(topic_str, &symbol, kind, data),
            ParsedTopic::Trade { symbol } => {
                let trades: Vec<Trade> = decode(topic_str, data)?;
                let cb = self.callbacks.read().trade.clone();
                if let Some(cb) = cb {
                    cb(&symbol, &trades);
                }
                Ok(())
            }
            ParsedTopic::KLine { symbol, .. } => {
                let kline: KLine = decode(topic_str, data)?;
                let cb = self.callbacks.read().kline.clone();
                if let Some(cb) = cb {
                    cb(&symbol, &kline);
                }
                Ok(())
            }
            ParsedTopic::KLineV2 { interval, symbol } => {
                let bars = decode_bars(topic_str, &symbol, &interval, data)?;
                let cb = self.callbacks.read().kline_v2.clone();
                if let Some(cb) = cb {
                    cb(&symbol, &bars);
                }
                Ok(())
            }
            ParsedTopic::Candle { interval, symbol } => {
                let bars = decode_bars(topic_str, &symbol, &interval, data)?;
                let cb = self.callbacks.read().candle.clone();
                if let Some(cb) = cb {
                    cb(&symbol, &bars);
                }
                Ok(())
            }
            ParsedTopic::Insurance { currency } => {
                let events: Vec<Insurance> = decode(topic_str, data)?;
                let cb = self.callbacks.read().insurance.clone();
                if let Some(cb) = cb {
                    cb(&currency, &events);
                }
                Ok(())
            }
            ParsedTopic::Instrument { symbol } => {
                let infos: Vec<Instrument> = decode(topic_str, data)?;
                let cb = self.callbacks.read().instrument.clone();
                if let Some(cb) = cb {
                    cb(&symbol, &infos);
                }
                Ok(())
            }
            ParsedTopic::Liquidation { symbol } => {
                let event: Liquidation = decode(topic_str, data)?;
                let cb = self.callbacks.read().liquidation.clone();
                if let Some(cb) = cb {
                    cb(&symbol, &event);
                }
                Ok(())
            }
            ParsedTopic::Position => {
                let events: Vec<Position> = decode(topic_str, data)?;
                let cb = self.callbacks.read().position.clone();
                if let Some(cb) = cb {
                    cb(&events);
                }
                Ok(())
            }
            ParsedTopic::Execution => {
                let events: Vec<Execution> = decode(topic_str, data)?;
                let cb = self.callbacks.read().execution.clone();
                if let Some(cb) = cb {
                    cb(&events);
                }
                Ok(())
            }
            ParsedTopic::Order => {
                let mut events: Vec<Order> = decode(topic_str, data)?;
                for order in &mut events {
                    order.backfill_times();
                }
                let cb = self.callbacks.read().order.clone();
                if let Some(cb) = cb {
                    cb(&events);
                }
                Ok(())
            }
            ParsedTopic::StopOrder => {
                let events: Vec<StopOrder> = decode(topic_str, data)?;
                let cb = self.callbacks.read().stop_order.clone();
                if let Some(cb) = cb {
                    cb(&events);
                }
                Ok(())
            }
            ParsedTopic::Wallet => {
                let events: Vec<Wallet> = decode(topic_str, data)?;
                let cb = self.callbacks.read().wallet.clone();
                if let Some(cb) = cb {
                    cb(&events);
                }
                Ok(())
            }
        }
    }

    /// Fold a book frame into the engine and emit the fresh view.
    fn route_book(
        &self,
        topic_str: &str,
        symbol: &str,
        kind: Option<&str>,
        data: &Value,
    ) -> WsResult<()> {
        let view = match kind {
            Some("snapshot") => {
                let rows = snapshot_rows(data)
                    .map_err(|e| WsError::Decode(format!("{topic_str}: {e}")))?;
                self.books.apply_snapshot(symbol, rows)
            }
            Some("delta") => {
                let delta: BookDelta = decode(topic_str, data)?;
                match self.books.apply_delta(symbol, delta) {
                    Ok(view) => view,
                    Err(BookError::NoBaseBook(_)) => {
                        // Warm-up: deltas before the first snapshot are expected.
                        debug!(symbol, "Discarding delta without base book");
                        return Ok(());
                    }
                }
            }
            _ => return Ok(()),
        };

        let cb = self.callbacks.read().order_book.clone();
        if let Some(cb) = cb {
            cb(symbol, &view);
        }
        Ok(())
    }
}

fn decode<T: DeserializeOwned>(topic_str: &str, data: &Value) -> WsResult<T> {
    serde_json::from_value(data.clone()).map_err(|e| WsError::Decode(format!("{topic_str}: {e}")))
}

/// Kline payloads omit symbol and interval; both come from the topic.
fn decode_bars(
    topic_str: &str,
    symbol: &str,
    interval: &str,
    data: &Value,
) -> WsResult<Vec<KLineV2>> {
    let mut bars: Vec<KLineV2> = decode(topic_str, data)?;
    for bar in &mut bars {
        bar.symbol = symbol.to_string();
        bar.interval = interval.to_string();
    }
    Ok(bars)
}
