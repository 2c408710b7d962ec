//! Configuration module for the book client

use serde::Deserialize;
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{ClientError, Result};

/// Default number of price levels shown per side
pub const DEFAULT_DEPTH: usize = 5;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Market data server host
    pub host: String,

    /// Market data server port
    pub port: u16,

    /// Exit after this many rendered frames (0 = run until the stream ends)
    pub frames: u64,

    /// How long a single receive waits before reporting an idle tick
    pub read_timeout_ms: u64,

    /// Connect timeout
    pub connect_timeout_ms: u64,

    /// Size of a single socket read
    pub recv_chunk_bytes: usize,

    /// Upper bound on unconsumed stream bytes (None = unbounded)
    pub max_buffer_bytes: Option<usize>,

    /// Price levels shown per side
    pub depth: usize,

    /// Fallback log filter when RUST_LOG is not set
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        Ok(Self {
            host: env::var("BOOK_HOST").unwrap_or(defaults.host),
            port: env_or("BOOK_PORT", defaults.port),
            frames: env_or("BOOK_FRAMES", defaults.frames),
            read_timeout_ms: env_or("READ_TIMEOUT_MS", defaults.read_timeout_ms),
            connect_timeout_ms: env_or("CONNECT_TIMEOUT_MS", defaults.connect_timeout_ms),
            recv_chunk_bytes: env_or("RECV_CHUNK_BYTES", defaults.recv_chunk_bytes),
            max_buffer_bytes: env::var("MAX_BUFFER_BYTES")
                .ok()
                .and_then(|v| v.trim().parse().ok()),
            depth: env_or("BOOK_DEPTH", defaults.depth),
            log_level: env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
        })
    }

    /// Reject values the client cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(ClientError::Config("port must be non-zero".to_string()));
        }
        if self.depth == 0 {
            return Err(ClientError::Config("depth must be at least 1".to_string()));
        }
        if self.recv_chunk_bytes == 0 {
            return Err(ClientError::Config(
                "recv_chunk_bytes must be non-zero".to_string(),
            ));
        }
        if self.read_timeout_ms == 0 || self.connect_timeout_ms == 0 {
            return Err(ClientError::Config("timeouts must be non-zero".to_string()));
        }
        if self.max_buffer_bytes == Some(0) {
            return Err(ClientError::Config(
                "max_buffer_bytes must be non-zero when set".to_string(),
            ));
        }
        Ok(())
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Frame limit as an Option (0 means unbounded)
    pub fn frame_limit(&self) -> Option<u64> {
        (self.frames > 0).then_some(self.frames)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            frames: 0,
            read_timeout_ms: 10_000,
            connect_timeout_ms: 2_000,
            recv_chunk_bytes: 4096,
            max_buffer_bytes: None,
            depth: DEFAULT_DEPTH,
            log_level: "warn".to_string(),
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
