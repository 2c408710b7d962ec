//! Viewer loop
//!
//! Pulls decoded values off the stream, renders market data snapshots and
//! stops on the frame limit or when the peer closes the connection.

use std::io::Write;
use tracing::{debug, info, trace};

use crate::error::Result;
use crate::parser::FeedMessage;
use crate::render::Renderer;
use crate::stream::{ByteSource, JsonStream, StreamEvent};

/// Why the viewer stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    FrameLimit,
    StreamClosed,
}

/// Summary of a finished viewer run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewerOutcome {
    pub frames_rendered: u64,
    pub stop: StopReason,
}

/// Drives bytes through decoding and snapshot rendering
pub struct Viewer<S, W: Write> {
    stream: JsonStream<S>,
    renderer: Renderer<W>,
    frame_limit: Option<u64>,
    depth: usize,
    frames_rendered: u64,
}

impl<S: ByteSource, W: Write> Viewer<S, W> {
    pub fn new(stream: JsonStream<S>, renderer: Renderer<W>, depth: usize) -> Self {
        Self {
            stream,
            renderer,
            frame_limit: None,
            depth,
            frames_rendered: 0,
        }
    }

    /// Stop after `limit` frames; `None` keeps running until the stream ends
    pub fn with_frame_limit(mut self, limit: Option<u64>) -> Self {
        self.frame_limit = limit;
        self
    }

    /// Run until the frame limit is met or the stream closes
    pub async fn run(&mut self) -> Result<ViewerOutcome> {
        info!(frame_limit = ?self.frame_limit, "Starting viewer");

        loop {
            if self.limit_reached() {
                info!(frames = self.frames_rendered, "Frame limit reached");
                return Ok(self.outcome(StopReason::FrameLimit));
            }

            match self.stream.next_event().await? {
                StreamEvent::Value(value) => self.process_value(value)?,
                StreamEvent::Idle => {
                    trace!(frames = self.frames_rendered, "Waiting for data");
                }
                StreamEvent::Closed => {
                    info!(frames = self.frames_rendered, "Stream ended");
                    return Ok(self.outcome(StopReason::StreamClosed));
                }
            }
        }
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    pub fn renderer(&self) -> &Renderer<W> {
        &self.renderer
    }

    fn process_value(&mut self, value: serde_json::Value) -> Result<()> {
        match FeedMessage::classify(value, self.depth) {
            FeedMessage::MarketData(snapshot) => {
                self.renderer.draw(&snapshot)?;
                self.frames_rendered += 1;
                debug!(
                    symbols = snapshot.books.len(),
                    timestamp = ?snapshot.timestamp,
                    frame = self.frames_rendered,
                    "Rendered frame"
                );
            }
            FeedMessage::Login(reply) => {
                debug!(status = reply.status, "Skipping login reply");
            }
            other => {
                debug!(action = ?other.action(), "Skipping non market data message");
            }
        }
        Ok(())
    }

    fn limit_reached(&self) -> bool {
        self.frame_limit
            .map(|limit| self.frames_rendered >= limit)
            .unwrap_or(false)
    }

    fn outcome(&self, stop: StopReason) -> ViewerOutcome {
        ViewerOutcome {
            frames_rendered: self.frames_rendered,
            stop,
        }
    }
}
