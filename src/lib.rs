//! Book Client - top-of-book terminal viewer
//!
//! Connects to a market data server over raw TCP, splits the undelimited
//! stream of JSON values it sends, and redraws per-symbol top-of-book
//! tables on every market data snapshot.

pub mod config;
pub mod error;
pub mod logging;
pub mod orderbook;
pub mod parser;
pub mod probe;
pub mod render;
pub mod stream;
pub mod viewer;

pub use config::Config;
pub use error::{ClientError, Result};
pub use orderbook::{Book, PriceLevel, Side, Snapshot};
pub use parser::{FeedMessage, LoginReply, LoginRequest};
pub use render::{format_frame, Renderer};
pub use stream::{ByteSource, Connection, JsonStream, Recv, StreamDecoder, StreamEvent};
pub use viewer::{StopReason, Viewer, ViewerOutcome};

/// Exit status after a user interrupt
pub const EXIT_INTERRUPTED: u8 = 130;
