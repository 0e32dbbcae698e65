use crate::messages::wire::{FramedMessage, WireConfig, WireProtocolError};
use serde::{de::DeserializeOwned, Serialize};
use std::net::SocketAddr;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tracing::{debug, trace};

#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("Connection closed by peer")]
    ConnectionClosed,

    #[error("Wire protocol error: {0}")]
    WireProtocol(WireProtocolError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<WireProtocolError> for ConnectionError {
    fn from(error: WireProtocolError) -> Self {
        match error {
            WireProtocolError::Closed => ConnectionError::ConnectionClosed,
            other => ConnectionError::WireProtocol(other),
        }
    }
}

impl ConnectionError {
    /// True for an orderly shutdown by the other side
    pub fn is_closed(&self) -> bool {
        matches!(self, ConnectionError::ConnectionClosed)
    }
}

/// Receiving half of a framed connection
#[derive(Debug)]
pub struct FrameReader<R = OwnedReadHalf> {
    inner: R,
    framed: FramedMessage,
}

impl<R: AsyncRead + Unpin> FrameReader<R> {
    pub fn new(inner: R, wire_config: WireConfig) -> Self {
        Self {
            inner,
            framed: FramedMessage::new(wire_config),
        }
    }

    pub async fn receive<T: DeserializeOwned>(&mut self) -> Result<T, ConnectionError> {
        let message = self.framed.read_message(&mut self.inner).await?;
        trace!("Received frame");
        Ok(message)
    }
}

/// Sending half of a framed connection
#[derive(Debug)]
pub struct FrameWriter<W = OwnedWriteHalf> {
    inner: W,
    framed: FramedMessage,
}

impl<W: AsyncWrite + Unpin> FrameWriter<W> {
    pub fn new(inner: W, wire_config: WireConfig) -> Self {
        Self {
            inner,
            framed: FramedMessage::new(wire_config),
        }
    }

    pub async fn send<T: Serialize>(&mut self, message: &T) -> Result<(), ConnectionError> {
        self.framed.write_message(&mut self.inner, message).await?;
        Ok(())
    }

    /// Flush and shut down the write side
    pub async fn close(&mut self) -> Result<(), ConnectionError> {
        self.inner.shutdown().await?;
        Ok(())
    }
}

/// A TCP stream speaking length-prefixed bincode frames
#[derive(Debug)]
pub struct Connection {
    reader: FrameReader,
    writer: FrameWriter,
    peer_addr: SocketAddr,
}

impl Connection {
    pub fn new_with_config(stream: TcpStream, wire_config: WireConfig) -> Result<Self, ConnectionError> {
        let peer_addr = stream.peer_addr()?;
        stream.set_nodelay(true)?;
        let (read_half, write_half) = stream.into_split();
        debug!("Framed connection to {}", peer_addr);

        Ok(Self {
            reader: FrameReader::new(read_half, wire_config.clone()),
            writer: FrameWriter::new(write_half, wire_config),
            peer_addr,
        })
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    pub async fn send<T: Serialize>(&mut self, message: &T) -> Result<(), ConnectionError> {
        self.writer.send(message).await
    }

    pub async fn receive<T: DeserializeOwned>(&mut self) -> Result<T, ConnectionError> {
        self.reader.receive().await
    }

    pub async fn close(&mut self) -> Result<(), ConnectionError> {
        self.writer.close().await
    }

    /// Split so reading and writing can proceed in separate tasks
    pub fn into_split(self) -> (FrameReader, FrameWriter) {
        (self.reader, self.writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::{ClientMessage, ServerMessage};

    #[tokio::test]
    async fn test_frame_halves_over_duplex() {
        let (client, server) = tokio::io::duplex(1024);
        let (client_read, client_write) = tokio::io::split(client);
        let (server_read, server_write) = tokio::io::split(server);

        let mut client_writer = FrameWriter::new(client_write, WireConfig::default());
        let mut server_reader = FrameReader::new(server_read, WireConfig::default());
        let mut server_writer = FrameWriter::new(server_write, WireConfig::default());
        let mut client_reader = FrameReader::new(client_read, WireConfig::default());

        client_writer.send(&ClientMessage::ResetGame).await.unwrap();
        let received: ClientMessage = server_reader.receive().await.unwrap();
        assert_eq!(received, ClientMessage::ResetGame);

        server_writer.send(&ServerMessage::GameReset).await.unwrap();
        let received: ServerMessage = client_reader.receive().await.unwrap();
        assert_eq!(received, ServerMessage::GameReset);
    }

    #[tokio::test]
    async fn test_peer_shutdown_is_connection_closed() {
        let (client, server) = tokio::io::duplex(64);
        let mut reader = FrameReader::new(server, WireConfig::default());
        drop(client);

        let error = reader.receive::<ClientMessage>().await.unwrap_err();
        assert!(error.is_closed());
    }

    #[test]
    fn test_wire_errors_other_than_closed_are_kept() {
        let error = ConnectionError::from(WireProtocolError::MessageTooSmall {
            size: 0,
            min_size: 1,
        });
        assert!(matches!(error, ConnectionError::WireProtocol(_)));
    }
}
