//! Login smoke test against the market data server
//!
//! Sends three fixed login attempts and echoes every decoded value until the
//! replies arrive, the stream closes, or the wait runs out.

use std::io::Write;
use std::time::Duration;
use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::Result;
use crate::parser::{LoginReply, LoginRequest};
use crate::stream::{ByteSource, Connection, JsonStream, StreamDecoder, StreamEvent};

/// Pause between consecutive requests
pub const REQUEST_GAP: Duration = Duration::from_millis(50);

/// Empty username, empty password, then valid credentials
pub fn probe_requests() -> Vec<LoginRequest> {
    vec![
        LoginRequest::new("", "pass"),
        LoginRequest::new("user", ""),
        LoginRequest::new("alice", "secret"),
    ]
}

/// What the probe observed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProbeReport {
    pub values_seen: usize,
    pub login_replies: usize,
    pub timed_out: bool,
}

/// Connect, send the probe requests and print what comes back
pub async fn run_probe<W: Write>(config: &Config, wait: Duration, out: &mut W) -> Result<ProbeReport> {
    let mut connection = Connection::connect(config).await?;
    let requests = probe_requests();

    for (i, request) in requests.iter().enumerate() {
        if i > 0 {
            sleep(REQUEST_GAP).await;
        }
        connection.send(request.to_json()?.as_bytes()).await?;
        debug!(username = %request.username, "Sent login request");
    }
    info!(count = requests.len(), "Login requests sent");

    let decoder = StreamDecoder::with_max_buffer(config.max_buffer_bytes);
    let mut stream = JsonStream::with_decoder(connection, decoder);
    collect_replies(&mut stream, out, wait, requests.len()).await
}

/// Echo decoded values as compact JSON lines until `expected` login replies
/// were seen, the stream closes, or `wait` elapses
pub async fn collect_replies<S, W>(
    stream: &mut JsonStream<S>,
    out: &mut W,
    wait: Duration,
    expected: usize,
) -> Result<ProbeReport>
where
    S: ByteSource,
    W: Write,
{
    let deadline = Instant::now() + wait;
    let mut report = ProbeReport::default();

    while report.login_replies < expected {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            report.timed_out = true;
            break;
        }

        match timeout(remaining, stream.next_event()).await {
            Err(_) => {
                report.timed_out = true;
                break;
            }
            Ok(event) => match event? {
                StreamEvent::Value(value) => {
                    writeln!(out, "{}", serde_json::to_string(&value)?)?;
                    report.values_seen += 1;
                    if let Some(reply) = LoginReply::from_value(&value) {
                        debug!(status = reply.status, success = reply.is_success(), "Login reply");
                        report.login_replies += 1;
                    }
                }
                StreamEvent::Idle => continue,
                StreamEvent::Closed => break,
            },
        }
    }

    if report.timed_out {
        warn!(
            login_replies = report.login_replies,
            expected = expected,
            "Probe wait elapsed"
        );
    }
    out.flush()?;
    Ok(report)
}
