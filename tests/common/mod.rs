//! Shared helpers for the integration tests: a relay on an ephemeral port,
//! raw framed test peers, and a chunked reader for partial I/O.

#![allow(dead_code)]

use duel::chess::Position;
use duel::messages::wire::WireConfig;
use duel::messages::{ClientMessage, ServerMessage};
use duel::network::{Connection, ConnectionError, Server};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::AsyncRead;
use tokio::net::TcpStream;
use tokio::task::JoinHandle;

pub const RECV_TIMEOUT: Duration = Duration::from_secs(5);

pub fn sq(name: &str) -> Position {
    name.parse().unwrap()
}

/// Start a relay on 127.0.0.1 with an OS-assigned port
pub async fn spawn_relay() -> (SocketAddr, JoinHandle<()>) {
    let server = Server::bind("127.0.0.1:0").await.unwrap();
    let addr = server.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let _ = server.run().await;
    });
    (addr, handle)
}

/// A raw protocol peer that speaks frames directly, without a game session
pub struct TestPeer {
    connection: Connection,
}

impl TestPeer {
    pub async fn connect(addr: SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).await.unwrap();
        Self {
            connection: Connection::new_with_config(stream, WireConfig::default()).unwrap(),
        }
    }

    pub async fn send(&mut self, message: ClientMessage) {
        self.connection.send(&message).await.unwrap();
    }

    pub async fn try_recv(&mut self) -> Result<ServerMessage, ConnectionError> {
        tokio::time::timeout(RECV_TIMEOUT, self.connection.receive())
            .await
            .expect("timed out waiting for relay message")
    }

    pub async fn recv(&mut self) -> ServerMessage {
        self.try_recv().await.unwrap()
    }

    /// Assert nothing arrives within `wait`
    pub async fn expect_silence(&mut self, wait: Duration) {
        let result = tokio::time::timeout(wait, self.connection.receive::<ServerMessage>()).await;
        assert!(result.is_err(), "unexpected message: {:?}", result);
    }

    pub async fn close(mut self) {
        let _ = self.connection.close().await;
    }
}

/// Reader that hands out its data in predetermined chunk sizes
pub struct ChunkedReader {
    data: Vec<u8>,
    position: usize,
    chunk_sizes: Vec<usize>,
    read_count: usize,
}

impl ChunkedReader {
    pub fn new(data: Vec<u8>, chunk_sizes: Vec<usize>) -> Self {
        Self {
            data,
            position: 0,
            chunk_sizes,
            read_count: 0,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.position >= self.data.len()
    }
}

impl AsyncRead for ChunkedReader {
    fn poll_read(
        mut self: std::pin::Pin<&mut Self>,
        _cx: &mut std::task::Context<'_>,
        buf: &mut tokio::io::ReadBuf<'_>,
    ) -> std::task::Poll<std::io::Result<()>> {
        if self.position >= self.data.len() {
            return std::task::Poll::Ready(Ok(()));
        }

        let chunk = self
            .chunk_sizes
            .get(self.read_count)
            .copied()
            .unwrap_or(self.data.len() - self.position);
        let remaining = self.data.len() - self.position;
        let count = chunk.min(buf.remaining()).min(remaining);

        if count > 0 {
            let end = self.position + count;
            buf.put_slice(&self.data[self.position..end]);
            self.position = end;
        }

        self.read_count += 1;
        std::task::Poll::Ready(Ok(()))
    }
}
