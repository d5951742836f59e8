//! Order-book error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BookError {
    /// A delta arrived before any snapshot for the symbol. Expected
    /// during warm-up; the delta is discarded, not fatal.
    #[error("No base book for symbol: {0}")]
    NoBaseBook(String),
}

pub type BookResult<T> = Result<T, BookError>;
