//! Local order-book reconstruction.
//!
//! Rebuilds a consistent per-symbol level-2 book from the venue's
//! snapshot and delta messages. Books exist only between a snapshot and
//! the next disconnect; deltas that arrive before a snapshot are
//! discarded as warm-up noise.

pub mod book;
pub mod engine;
pub mod error;

pub use book::{BookView, OrderBook};
pub use engine::BookEngine;
pub use error::{BookError, BookResult};
