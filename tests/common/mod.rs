//! Common test utilities for loopback integration tests

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

use book_client::stream::{ByteSource, Connection, JsonStream, Recv};
use book_client::{Config, LoginRequest, StreamDecoder};

/// Config pointing at a local test server with short timeouts
pub fn local_config(addr: SocketAddr) -> Config {
    Config {
        host: addr.ip().to_string(),
        port: addr.port(),
        read_timeout_ms: 20,
        connect_timeout_ms: 1_000,
        recv_chunk_bytes: 16,
        ..Config::default()
    }
}

/// Accepts one connection, writes `chunks` with a short pause between
/// each, then closes
pub async fn serve_chunks(chunks: Vec<Vec<u8>>, pause: Duration) -> (SocketAddr, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        socket.set_nodelay(true).unwrap();
        for chunk in chunks {
            socket.write_all(&chunk).await.unwrap();
            socket.flush().await.unwrap();
            tokio::time::sleep(pause).await;
        }
        socket.shutdown().await.ok();
    });

    (addr, handle)
}

/// Split `data` into pieces of the given sizes, cycling through them
pub fn split_cycling(data: &[u8], sizes: &[usize]) -> Vec<Vec<u8>> {
    let mut out = Vec::new();
    let mut rest = data;
    let mut i = 0;
    while !rest.is_empty() {
        let size = sizes[i % sizes.len()].min(rest.len());
        let (head, tail) = rest.split_at(size);
        out.push(head.to_vec());
        rest = tail;
        i += 1;
    }
    out
}

/// Minimal login server: answers each login request the way the market
/// data server does and sends a snapshot before every reply
pub async fn serve_logins(expected: usize) -> (SocketAddr, JoinHandle<Vec<LoginRequest>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        handle_logins(socket, addr, expected).await
    });

    (addr, handle)
}

async fn handle_logins(socket: TcpStream, addr: SocketAddr, expected: usize) -> Vec<LoginRequest> {
    let mut connection = Connection::from_stream(socket, &local_config(addr));
    let mut requests = Vec::new();
    let mut decoder = StreamDecoder::new();

    while requests.len() < expected {
        match connection.recv().await.unwrap() {
            Recv::Chunk(bytes) => decoder.extend(&bytes),
            Recv::Idle => continue,
            Recv::Closed => break,
        }
        while let Some(value) = decoder.next_value().unwrap() {
            let request: LoginRequest = serde_json::from_value(value).unwrap();
            let reply = if request.username.is_empty() || request.password.is_empty() {
                r#"{"action":"login","error":"Invalid username or password","status":403}"#
            } else {
                r#"{"action":"login","msg":"Login successful","status":200}"#
            };
            let snapshot = r#"{"action":"market_data","data":{"A":{"buy":null,"sell":null}}}"#;
            connection.send(snapshot.as_bytes()).await.unwrap();
            connection.send(reply.as_bytes()).await.unwrap();
            requests.push(request);
        }
    }

    requests
}

/// Drain a stream into a vector of values
pub async fn collect_values<S: ByteSource>(stream: &mut JsonStream<S>) -> Vec<serde_json::Value> {
    let mut values = Vec::new();
    while let Some(value) = stream.next_value().await.unwrap() {
        values.push(value);
    }
    values
}
