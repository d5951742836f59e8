//! Single-symbol order book state.
//!
//! The book is an unordered id → row map; price ordering is produced
//! on demand as an immutable [`BookView`].

use bybit_core::{BookDelta, BookEntry, Side};
use std::collections::HashMap;

/// Mutable level-2 book for one symbol, keyed by exchange-assigned id.
#[derive(Debug, Default)]
pub struct OrderBook {
    entries: HashMap<u64, BookEntry>,
}

impl OrderBook {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Replace the whole book with the snapshot rows.
    pub fn load_snapshot(&mut self, rows: Vec<BookEntry>) {
        self.entries.clear();
        for row in rows {
            self.entries.insert(row.id, row);
        }
    }

    /// Apply one delta.
    ///
    /// Operations run delete → update → insert, in that fixed order.
    /// The ordering makes a delta deterministic even when the feed lists
    /// the same id in more than one operation; it is wire-compatibility
    /// critical and must not be changed.
    pub fn apply_delta(&mut self, delta: BookDelta) {
        for row in delta.delete {
            self.entries.remove(&row.id);
        }
        // Updates are upserts: an absent id is inserted rather than dropped.
        for row in delta.update {
            self.entries.insert(row.id, row);
        }
        for row in delta.insert {
            self.entries.insert(row.id, row);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Produce the price-sorted immutable projection.
    pub fn view(&self) -> BookView {
        let mut bids: Vec<BookEntry> = Vec::new();
        let mut asks: Vec<BookEntry> = Vec::new();
        for entry in self.entries.values() {
            match entry.side {
                Side::Buy => bids.push(entry.clone()),
                Side::Sell => asks.push(entry.clone()),
            }
        }
        bids.sort_by(|a, b| b.price.cmp(&a.price));
        asks.sort_by(|a, b| a.price.cmp(&b.price));
        BookView { bids, asks }
    }
}

/// Immutable, price-sorted projection of a book at a point in time.
///
/// Bids descend by price, asks ascend. Handed to callbacks by value;
/// safe to retain indefinitely.
#[derive(Debug, Clone, Default)]
pub struct BookView {
    pub bids: Vec<BookEntry>,
    pub asks: Vec<BookEntry>,
}

impl BookView {
    pub fn best_bid(&self) -> Option<&BookEntry> {
        self.bids.first()
    }

    pub fn best_ask(&self) -> Option<&BookEntry> {
        self.asks.first()
    }

    pub fn len(&self) -> usize {
        self.bids.len() + self.asks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }
}
