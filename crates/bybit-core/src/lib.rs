//! Core domain types for the Bybit streaming client.
//!
//! This crate provides the fundamental types shared by the transport and
//! order-book crates:
//! - `Price`, `Size`: precision-safe numeric types
//! - `Side`, `BookEntry`, `BookDelta`: order-book wire records
//! - market-data and account event records decoded from topic payloads

pub mod account;
pub mod decimal;
pub mod error;
pub mod market;
pub mod types;

pub use account::{Execution, Order, Position, StopOrder, Wallet};
pub use decimal::{Price, Size};
pub use error::{CoreError, Result};
pub use market::{Insurance, Instrument, KLine, KLineV2, Liquidation, Trade};
pub use types::{BookDelta, BookEntry, Side};
