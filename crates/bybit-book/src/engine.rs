//! Per-symbol book container.
//!
//! Owns every symbol's [`OrderBook`]. Mutation happens only on the
//! connection's read task; views may be taken from any thread.

use crate::book::{BookView, OrderBook};
use crate::error::{BookError, BookResult};
use bybit_core::{BookDelta, BookEntry};
use dashmap::DashMap;
use tracing::debug;

/// Book engine: symbol → book map plus the snapshot/delta fold.
#[derive(Debug, Default)]
pub struct BookEngine {
    books: DashMap<String, OrderBook>,
}

impl BookEngine {
    pub fn new() -> Self {
        Self {
            books: DashMap::new(),
        }
    }

    /// Replace (or create) the book for `symbol` with the snapshot rows.
    ///
    /// Always succeeds; applying the same snapshot twice is idempotent.
    /// Returns the fresh view.
    pub fn apply_snapshot(&self, symbol: &str, rows: Vec<BookEntry>) -> BookView {
        let mut book = self
            .books
            .entry(symbol.to_string())
            .or_insert_with(|| {
                debug!(symbol, "Creating order book");
                OrderBook::new()
            });
        book.load_snapshot(rows);
        book.view()
    }

    /// Fold one delta into the symbol's book.
    ///
    /// Fails with [`BookError::NoBaseBook`] when no snapshot has been
    /// applied yet for the symbol; the delta is discarded and the caller
    /// should wait for the next snapshot.
    pub fn apply_delta(&self, symbol: &str, delta: BookDelta) -> BookResult<BookView> {
        let mut book = self
            .books
            .get_mut(symbol)
            .ok_or_else(|| BookError::NoBaseBook(symbol.to_string()))?;
        book.apply_delta(delta);
        Ok(book.view())
    }

    /// Current view for `symbol`, or `None` when no book exists.
    pub fn view(&self, symbol: &str) -> Option<BookView> {
        self.books.get(symbol).map(|book| book.view())
    }

    /// Number of live books.
    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// Drop every book. Called on session teardown; deltas cannot be
    /// trusted again until a fresh snapshot arrives.
    pub fn clear(&self) {
        let dropped = self.books.len();
        self.books.clear();
        if dropped > 0 {
            debug!(dropped, "Dropped order books on disconnect");
        }
    }
}
