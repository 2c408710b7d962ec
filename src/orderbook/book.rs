//! Top-of-book levels for a single symbol

use serde_json::Value;

use super::{PriceLevel, Side};

/// Bid and ask levels for one symbol, best first as sent by the server
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Book {
    pub bids: Vec<PriceLevel>,
    pub asks: Vec<PriceLevel>,
}

impl Book {
    /// Build a book from `{"buy": [...], "sell": [...]}`.
    ///
    /// Only the first `depth` entries of each side are inspected; entries
    /// that are not valid levels are skipped. A missing or non-array side is
    /// empty.
    pub fn from_value(value: &Value, depth: usize) -> Self {
        Self {
            bids: parse_side(value, Side::Bid, depth),
            asks: parse_side(value, Side::Ask, depth),
        }
    }

    pub fn levels(&self, side: Side) -> &[PriceLevel] {
        match side {
            Side::Bid => &self.bids,
            Side::Ask => &self.asks,
        }
    }

    /// Number of display rows: the longer side, padded up to `depth`
    pub fn row_count(&self, depth: usize) -> usize {
        self.bids.len().max(self.asks.len()).max(depth)
    }

    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }
}

fn parse_side(book: &Value, side: Side, depth: usize) -> Vec<PriceLevel> {
    let Some(entries) = book.get(side.key()).and_then(Value::as_array) else {
        return Vec::new();
    };
    entries
        .iter()
        .take(depth)
        .filter_map(PriceLevel::from_value)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_both_sides() {
        let book = Book::from_value(
            &json!({
                "buy": [{"price": 100, "volume": 5}, {"price": 99, "volume": 7}],
                "sell": [{"price": 101, "quantity": 3}]
            }),
            5,
        );
        assert_eq!(book.bids, vec![PriceLevel::new(100, 5), PriceLevel::new(99, 7)]);
        assert_eq!(book.levels(Side::Ask), &[PriceLevel::new(101, 3)]);
        assert_eq!(book.row_count(5), 5);
    }

    #[test]
    fn test_null_and_missing_sides_are_empty() {
        let book = Book::from_value(&json!({"buy": null}), 5);
        assert!(book.is_empty());

        let book = Book::from_value(&json!("not a book"), 5);
        assert!(book.is_empty());
    }

    #[test]
    fn test_invalid_entries_skipped() {
        let book = Book::from_value(
            &json!({"buy": [{"price": "x", "quantity": 1}, 7, {"price": 98, "quantity": 2}]}),
            5,
        );
        assert_eq!(book.bids, vec![PriceLevel::new(98, 2)]);
    }

    #[test]
    fn test_only_first_depth_entries_inspected() {
        let sell: Vec<Value> = (0..8)
            .map(|i| json!({"price": 200 + i, "quantity": 1}))
            .collect();
        let book = Book::from_value(&json!({ "sell": sell }), 5);
        assert_eq!(book.asks.len(), 5);
        assert_eq!(book.asks[4], PriceLevel::new(204, 1));

        // an invalid entry inside the window is not replaced by a later one
        let book = Book::from_value(
            &json!({"sell": [{}, {"price": 1, "quantity": 1}, {"price": 2, "quantity": 1}]}),
            2,
        );
        assert_eq!(book.asks, vec![PriceLevel::new(1, 1)]);
    }

    #[test]
    fn test_row_count_uses_longer_side() {
        let book = Book {
            bids: vec![PriceLevel::new(1, 1); 7],
            asks: vec![],
        };
        assert_eq!(book.row_count(5), 7);
    }
}
