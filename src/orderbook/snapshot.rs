//! Market data snapshots

use serde_json::Value;
use std::collections::BTreeMap;

use super::Book;

/// Value of the `action` field that marks a market data snapshot
pub const MARKET_DATA_ACTION: &str = "market_data";

/// One market data message: a book per symbol plus an optional timestamp
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    /// Books keyed by symbol, iterated in sorted order
    pub books: BTreeMap<String, Book>,

    /// Server time in milliseconds since the epoch
    pub timestamp: Option<i64>,
}

impl Snapshot {
    /// Interpret a decoded value as a snapshot.
    ///
    /// Returns `None` unless the value is an object whose `action` is
    /// `"market_data"`. Shape problems further down never fail: a bad `data`
    /// field gives zero symbols, a bad `timestamp` gives none.
    pub fn from_value(value: &Value, depth: usize) -> Option<Self> {
        let message = value.as_object()?;
        if message.get("action").and_then(Value::as_str) != Some(MARKET_DATA_ACTION) {
            return None;
        }

        let books: BTreeMap<String, Book> = message
            .get("data")
            .and_then(Value::as_object)
            .map(|data| {
                data.iter()
                    .map(|(symbol, book)| (symbol.clone(), Book::from_value(book, depth)))
                    .collect()
            })
            .unwrap_or_default();

        Some(Self {
            books,
            timestamp: message.get("timestamp").and_then(Value::as_i64),
        })
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.books.keys().map(String::as_str)
    }

    pub fn book(&self, symbol: &str) -> Option<&Book> {
        self.books.get(symbol)
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }
}
