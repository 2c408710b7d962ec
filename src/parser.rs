//! Parser module for feed messages
//!
//! Classifies decoded values into market data snapshots, login replies and
//! everything else.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::orderbook::Snapshot;

/// Login request sent by the probe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub action: String,
    pub username: String,
    pub password: String,
}

impl LoginRequest {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            action: "login".to_string(),
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    /// Compact JSON with no trailing delimiter
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Server reply to a login request
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginReply {
    /// HTTP-style status code (200 accepted, 403 rejected)
    pub status: i64,

    /// Success message
    #[serde(default)]
    pub msg: Option<String>,

    /// Failure reason
    #[serde(default)]
    pub error: Option<String>,
}

impl LoginReply {
    /// Extract a reply from a value with `action == "login"` and a status
    pub fn from_value(value: &Value) -> Option<Self> {
        if value.get("action").and_then(Value::as_str) != Some("login") {
            return None;
        }
        LoginReply::deserialize(value).ok()
    }

    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}

/// A decoded value from the feed
#[derive(Debug, Clone, PartialEq)]
pub enum FeedMessage {
    MarketData(Snapshot),
    Login(LoginReply),
    Other(Value),
}

impl FeedMessage {
    /// Classify a decoded value. Shape mismatches never fail; a value that
    /// fits no known message is returned as `Other`.
    pub fn classify(value: Value, depth: usize) -> Self {
        if let Some(snapshot) = Snapshot::from_value(&value, depth) {
            return FeedMessage::MarketData(snapshot);
        }

        if let Some(reply) = LoginReply::from_value(&value) {
            return FeedMessage::Login(reply);
        }

        FeedMessage::Other(value)
    }

    pub fn action(&self) -> Option<&str> {
        match self {
            FeedMessage::MarketData(_) => Some("market_data"),
            FeedMessage::Login(_) => Some("login"),
            FeedMessage::Other(value) => value.get("action").and_then(Value::as_str),
        }
    }
}
