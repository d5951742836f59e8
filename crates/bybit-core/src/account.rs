//! Private-topic account event records.
//!
//! Payloads for the authenticated streams: position, execution, order,
//! stop-order, and wallet updates. The venue encodes most balances and
//! prices as JSON strings on these topics.

use crate::{Price, Side};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Position change event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub user_id: i64,
    pub symbol: String,
    pub size: Decimal,
    /// "Buy", "Sell", or "None" when flat; kept as the wire string.
    pub side: String,
    #[serde(default)]
    pub position_value: Decimal,
    #[serde(default)]
    pub entry_price: Decimal,
    #[serde(default)]
    pub liq_price: Decimal,
    #[serde(default)]
    pub bust_price: Decimal,
    #[serde(default)]
    pub leverage: Decimal,
    #[serde(default)]
    pub order_margin: Decimal,
    #[serde(default)]
    pub position_margin: Decimal,
    #[serde(default)]
    pub available_balance: Decimal,
    #[serde(default)]
    pub take_profit: Decimal,
    #[serde(default)]
    pub stop_loss: Decimal,
    #[serde(default)]
    pub realised_pnl: Decimal,
    #[serde(default)]
    pub cum_realised_pnl: Decimal,
    #[serde(default)]
    pub wallet_balance: Decimal,
    #[serde(default)]
    pub risk_id: i32,
    #[serde(default)]
    pub position_status: String,
    #[serde(default)]
    pub position_seq: i64,
}

/// Fill notification for one of the account's orders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Execution {
    pub symbol: String,
    pub side: Side,
    pub order_id: String,
    pub exec_id: String,
    #[serde(default)]
    pub order_link_id: String,
    pub price: Price,
    pub order_qty: Decimal,
    pub exec_type: String,
    pub exec_qty: Decimal,
    #[serde(default)]
    pub exec_fee: Decimal,
    pub leaves_qty: Decimal,
    pub is_maker: bool,
    pub trade_time: DateTime<Utc>,
}

/// Active-order update.
///
/// The venue populates either `timestamp` or `create_time` depending on
/// the event; the router mirrors the missing one from the other.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub order_id: String,
    #[serde(default)]
    pub order_link_id: String,
    pub symbol: String,
    pub side: Side,
    pub order_type: String,
    pub price: Price,
    pub qty: Decimal,
    /// GoodTillCancel / ImmediateOrCancel / FillOrKill / PostOnly.
    pub time_in_force: String,
    #[serde(default)]
    pub create_type: String,
    #[serde(default)]
    pub cancel_type: String,
    pub order_status: String,
    #[serde(default)]
    pub leaves_qty: Decimal,
    #[serde(default)]
    pub cum_exec_qty: Decimal,
    #[serde(default)]
    pub cum_exec_value: Option<Decimal>,
    #[serde(default)]
    pub cum_exec_fee: Option<Decimal>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub create_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_exec_price: Option<Price>,
    #[serde(default)]
    pub reduce_only: bool,
    #[serde(default)]
    pub close_on_trigger: bool,
}

impl Order {
    /// Mirror `timestamp`/`create_time` when only one is set.
    pub fn backfill_times(&mut self) {
        match (self.timestamp, self.create_time) {
            (None, Some(t)) => self.timestamp = Some(t),
            (Some(t), None) => self.create_time = Some(t),
            _ => {}
        }
    }
}

/// Conditional-order update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StopOrder {
    pub order_id: String,
    #[serde(default)]
    pub order_link_id: String,
    #[serde(default)]
    pub user_id: i64,
    pub symbol: String,
    pub side: Side,
    pub order_type: String,
    pub price: Price,
    pub qty: Decimal,
    pub time_in_force: String,
    #[serde(default)]
    pub create_type: String,
    #[serde(default)]
    pub cancel_type: String,
    pub order_status: String,
    #[serde(default)]
    pub stop_order_type: String,
    #[serde(default)]
    pub trigger_by: String,
    #[serde(default)]
    pub trigger_price: Option<Price>,
    #[serde(default)]
    pub close_on_trigger: bool,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Wallet balance update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wallet {
    #[serde(default)]
    pub user_id: i64,
    #[serde(default)]
    pub coin: String,
    pub available_balance: Decimal,
    pub wallet_balance: Decimal,
}
