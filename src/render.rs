//! Terminal rendering of snapshots
//!
//! Each frame clears the screen, homes the cursor and redraws every symbol.
//! Nothing carries over between frames.

use chrono::{Local, TimeZone};
use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::terminal::{Clear, ClearType};
use std::fmt;
use std::io::Write;

use crate::error::{ClientError, Result};
use crate::orderbook::{Book, PriceLevel, Snapshot};

const PLACEHOLDER: &str = "-";
const COLUMN_HEADER: &str = "  BUY (px/qty)           |  SELL (px/qty)";
const COLUMN_RULE: &str = "  -----------------------+-----------------------";

/// Formats a timestamp as local time with millisecond precision, or a dash
pub fn format_timestamp(timestamp: Option<i64>) -> String {
    timestamp
        .and_then(|ms| Local.timestamp_millis_opt(ms).single())
        .map(|time| time.format("%Y-%m-%d %H:%M:%S%.3f").to_string())
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

/// The text of one frame, without terminal control sequences
pub struct Frame<'a> {
    snapshot: &'a Snapshot,
    depth: usize,
}

impl<'a> Frame<'a> {
    pub fn new(snapshot: &'a Snapshot, depth: usize) -> Self {
        Self { snapshot, depth }
    }
}

impl fmt::Display for Frame<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Market Data  (ts: {})", format_timestamp(self.snapshot.timestamp))?;
        writeln!(f)?;
        for (symbol, book) in &self.snapshot.books {
            write_book(f, symbol, book, self.depth)?;
        }
        Ok(())
    }
}

fn write_book(f: &mut fmt::Formatter<'_>, symbol: &str, book: &Book, depth: usize) -> fmt::Result {
    writeln!(f, "Symbol: {}", symbol)?;
    writeln!(f, "{}", COLUMN_HEADER)?;
    writeln!(f, "{}", COLUMN_RULE)?;
    for row in 0..book.row_count(depth) {
        writeln!(
            f,
            "  {:<21} |  {:<21}",
            cell(book.bids.get(row)),
            cell(book.asks.get(row))
        )?;
    }
    writeln!(f)
}

fn cell(level: Option<&PriceLevel>) -> String {
    match level {
        Some(level) => format!("{:>6}/{:<6}", level.price, level.quantity),
        None => PLACEHOLDER.to_string(),
    }
}

/// Pure formatting step: the frame text for a snapshot
pub fn format_frame(snapshot: &Snapshot, depth: usize) -> String {
    Frame::new(snapshot, depth).to_string()
}

/// Draws frames onto an output sink, replacing the previous frame
pub struct Renderer<W: Write> {
    out: W,
    depth: usize,
}

impl<W: Write> Renderer<W> {
    pub fn new(out: W, depth: usize) -> Self {
        Self { out, depth }
    }

    /// Clear the screen and draw the snapshot. Sink failures are fatal to
    /// the frame and are not retried.
    pub fn draw(&mut self, snapshot: &Snapshot) -> Result<()> {
        queue!(self.out, Clear(ClearType::All), MoveTo(0, 0)).map_err(render_error)?;
        write!(self.out, "{}", Frame::new(snapshot, self.depth)).map_err(render_error)?;
        self.out.flush().map_err(render_error)
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

fn render_error(err: std::io::Error) -> ClientError {
    ClientError::Render(err.to_string())
}
