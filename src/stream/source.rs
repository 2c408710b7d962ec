//! Byte sources feeding the stream decoder
//!
//! A source hands out raw chunks with a bounded wait. The wait expiring is
//! reported as [`Recv::Idle`], which is not an error.

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{ClientError, Result};

/// Outcome of a single receive
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recv {
    /// Bytes arrived
    Chunk(Bytes),
    /// Nothing arrived within the read timeout
    Idle,
    /// The peer closed the stream
    Closed,
}

/// Something that yields raw byte chunks on demand
#[async_trait]
pub trait ByteSource: Send {
    async fn recv(&mut self) -> Result<Recv>;
}

/// [`ByteSource`] over any async reader, bounded by a read timeout
pub struct ReaderSource<R> {
    reader: R,
    buf: BytesMut,
    chunk_size: usize,
    read_timeout: Duration,
}

impl<R> ReaderSource<R>
where
    R: AsyncRead + Unpin + Send,
{
    pub fn new(reader: R, chunk_size: usize, read_timeout: Duration) -> Self {
        Self {
            reader,
            buf: BytesMut::with_capacity(chunk_size),
            chunk_size,
            read_timeout,
        }
    }
}

#[async_trait]
impl<R> ByteSource for ReaderSource<R>
where
    R: AsyncRead + Unpin + Send,
{
    async fn recv(&mut self) -> Result<Recv> {
        self.buf.clear();
        self.buf.reserve(self.chunk_size);

        match timeout(self.read_timeout, self.reader.read_buf(&mut self.buf)).await {
            Err(_) => Ok(Recv::Idle),
            Ok(Ok(0)) => Ok(Recv::Closed),
            Ok(Ok(n)) => {
                debug!(len = n, "Received chunk");
                Ok(Recv::Chunk(self.buf.split().freeze()))
            }
            Ok(Err(e)) => Err(ClientError::Io(e)),
        }
    }
}

/// TCP connection to the market data server
pub struct Connection {
    source: ReaderSource<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl Connection {
    /// Connect to the configured host and port
    pub async fn connect(config: &Config) -> Result<Self> {
        let addr = format!("{}:{}", config.host, config.port);
        info!(addr = %addr, "Connecting to market data server");

        let stream = timeout(config.connect_timeout(), TcpStream::connect(addr.as_str()))
            .await
            .map_err(|_| ClientError::Connection(format!("Timed out connecting to {}", addr)))?
            .map_err(|e| ClientError::Connection(format!("Failed to connect to {}: {}", addr, e)))?;

        if let Err(e) = stream.set_nodelay(true) {
            debug!(error = %e, "Failed to set TCP_NODELAY");
        }
        info!(addr = %addr, "Connected");

        Ok(Self::from_stream(stream, config))
    }

    /// Wrap an already established stream
    pub fn from_stream(stream: TcpStream, config: &Config) -> Self {
        let (reader, writer) = stream.into_split();
        Self {
            source: ReaderSource::new(reader, config.recv_chunk_bytes, config.read_timeout()),
            writer,
        }
    }

    /// Send an outbound message as-is
    pub async fn send(&mut self, bytes: &[u8]) -> Result<()> {
        self.writer.write_all(bytes).await?;
        self.writer.flush().await?;
        debug!(len = bytes.len(), "Sent message");
        Ok(())
    }
}

#[async_trait]
impl ByteSource for Connection {
    async fn recv(&mut self) -> Result<Recv> {
        self.source.recv().await
    }
}
