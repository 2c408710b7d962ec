//! Order book snapshot model
//!
//! Interprets decoded feed values as per-symbol top-of-book snapshots.

mod book;
mod snapshot;

pub use book::Book;
pub use snapshot::Snapshot;

use serde_json::Value;

/// Side of the order book
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Bid,
    Ask,
}

impl Side {
    /// Field name of this side in a feed message
    pub fn key(self) -> &'static str {
        match self {
            Side::Bid => "buy",
            Side::Ask => "sell",
        }
    }
}

/// A single level in the order book
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceLevel {
    pub price: i64,
    pub quantity: i64,
}

impl PriceLevel {
    pub fn new(price: i64, quantity: i64) -> Self {
        Self { price, quantity }
    }

    /// Read a level from `{"price": int, "quantity"|"volume": int}`.
    ///
    /// `volume` is only consulted when `quantity` is absent. Anything that is
    /// not an object with two integer fields yields `None`.
    pub fn from_value(value: &Value) -> Option<Self> {
        let level = value.as_object()?;
        let price = level.get("price")?.as_i64()?;
        let quantity = level
            .get("quantity")
            .or_else(|| level.get("volume"))?
            .as_i64()?;
        Some(Self { price, quantity })
    }
}
