//! Order-book wire records.
//!
//! Level-2 book messages carry per-entry rows keyed by an
//! exchange-assigned id, unique within one symbol's book. A snapshot is
//! the full row set; a delta carries delete/update/insert row lists.

use crate::{Price, Size};
use serde::{Deserialize, Serialize};

/// Order side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn is_buy(&self) -> bool {
        matches!(self, Self::Buy)
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "Buy"),
            Self::Sell => write!(f, "Sell"),
        }
    }
}

impl std::str::FromStr for Side {
    type Err = crate::CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Buy" => Ok(Self::Buy),
            "Sell" => Ok(Self::Sell),
            other => Err(crate::CoreError::InvalidSide(other.to_string())),
        }
    }
}

/// One level-2 order book row.
///
/// Delta `delete` rows omit `size`; delta `update` rows may omit `price`.
/// Defaults keep those partial rows decodable through the same record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookEntry {
    pub id: u64,
    pub symbol: String,
    pub side: Side,
    #[serde(default)]
    pub price: Price,
    #[serde(default)]
    pub size: Size,
}

/// Incremental book change: rows to delete, overwrite, and add.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookDelta {
    #[serde(default)]
    pub delete: Vec<BookEntry>,
    #[serde(default)]
    pub update: Vec<BookEntry>,
    #[serde(default)]
    pub insert: Vec<BookEntry>,
}

impl BookDelta {
    /// Total number of rows across all three operation lists.
    pub fn len(&self) -> usize {
        self.delete.len() + self.update.len() + self.insert.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
