use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, error, instrument, trace, warn};

// Wire protocol constants
pub const MAX_MESSAGE_SIZE: usize = 64 * 1024; // protocol messages are a few dozen bytes
pub const MIN_MESSAGE_SIZE: usize = 1;
pub const LENGTH_PREFIX_SIZE: usize = 4; // 4 bytes for u32 length prefix
const MAX_PREFIX_LENGTH: usize = u32::MAX as usize;
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for wire protocol operations including timeouts and message size limits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireConfig {
    pub max_message_size: usize,
    /// Time allowed to receive the body of a frame once its length prefix arrived
    pub read_timeout: Duration,
    pub write_timeout: Duration,
}

impl Default for WireConfig {
    fn default() -> Self {
        Self {
            max_message_size: MAX_MESSAGE_SIZE,
            read_timeout: DEFAULT_READ_TIMEOUT,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
        }
    }
}

impl WireConfig {
    /// `max_message_size` is capped at what a `u32` length prefix can carry
    pub fn new(max_message_size: usize, read_timeout: Duration, write_timeout: Duration) -> Self {
        Self {
            max_message_size: max_message_size.min(MAX_PREFIX_LENGTH),
            read_timeout,
            write_timeout,
        }
    }

    /// Create a WireConfig with a single timeout for both read and write operations
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            max_message_size: MAX_MESSAGE_SIZE,
            read_timeout: timeout,
            write_timeout: timeout,
        }
    }
}

/// Custom error types for wire protocol operations
#[derive(Error, Debug)]
pub enum WireProtocolError {
    #[error("Message too large: {size} bytes exceeds maximum of {max_size} bytes")]
    MessageTooLarge { size: usize, max_size: usize },

    #[error("Message too small: {size} bytes is below minimum of {min_size} bytes")]
    MessageTooSmall { size: usize, min_size: usize },

    #[error("Read operation timed out after {timeout:?}")]
    ReadTimeout { timeout: Duration },

    #[error("Write operation timed out after {timeout:?}")]
    WriteTimeout { timeout: Duration },

    #[error("Corrupted data: {reason}")]
    CorruptedData { reason: String },

    #[error("Unexpected end of file while reading {operation}")]
    UnexpectedEof { operation: String },

    #[error("Connection closed by peer")]
    Closed,

    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Length-prefixed bincode framing: a big-endian `u32` byte count followed
/// by the serialized message.
#[derive(Debug, Clone, Default)]
pub struct FramedMessage {
    wire_config: WireConfig,
}

impl FramedMessage {
    pub fn new(wire_config: WireConfig) -> Self {
        Self { wire_config }
    }

    pub fn wire_config(&self) -> &WireConfig {
        &self.wire_config
    }

    fn validate_message_size(&self, size: usize) -> Result<(), WireProtocolError> {
        if size < MIN_MESSAGE_SIZE {
            warn!(size = size, "Message size is below minimum threshold");
            return Err(WireProtocolError::MessageTooSmall {
                size,
                min_size: MIN_MESSAGE_SIZE,
            });
        }

        if size > self.wire_config.max_message_size {
            error!(
                size = size,
                max_size = self.wire_config.max_message_size,
                "Message size exceeds maximum allowed size"
            );
            return Err(WireProtocolError::MessageTooLarge {
                size,
                max_size: self.wire_config.max_message_size,
            });
        }

        Ok(())
    }

    /// Serialize `message` into a complete frame (prefix included)
    pub fn encode<T: Serialize>(&self, message: &T) -> Result<Vec<u8>, WireProtocolError> {
        let body = bincode::serialize(message).map_err(|e| {
            error!(error = %e, "Failed to serialize message with bincode");
            WireProtocolError::Serialization(e)
        })?;
        self.validate_message_size(body.len())?;
        let length = u32::try_from(body.len()).map_err(|_| WireProtocolError::MessageTooLarge {
            size: body.len(),
            max_size: MAX_PREFIX_LENGTH,
        })?;

        let mut frame = Vec::with_capacity(LENGTH_PREFIX_SIZE + body.len());
        frame.extend_from_slice(&length.to_be_bytes());
        frame.extend_from_slice(&body);
        trace!("Encoded frame of {} bytes", frame.len());
        Ok(frame)
    }

    fn decode_body<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, WireProtocolError> {
        bincode::deserialize(data).map_err(|e| {
            error!(error = %e, data_size = data.len(), "Failed to deserialize frame body");
            WireProtocolError::CorruptedData {
                reason: format!("Failed to deserialize message: {}", e),
            }
        })
    }

    /// Fill `buffer` completely. Returns how many bytes arrived before EOF on failure.
    async fn read_exact_with_recovery(
        reader: &mut (impl AsyncRead + Unpin),
        buffer: &mut [u8],
    ) -> Result<(), (usize, WireProtocolError)> {
        let mut total_read = 0;

        while total_read < buffer.len() {
            match reader.read(&mut buffer[total_read..]).await {
                Ok(0) => {
                    return Err((
                        total_read,
                        WireProtocolError::UnexpectedEof {
                            operation: format!(
                                "{} byte buffer (got {})",
                                buffer.len(),
                                total_read
                            ),
                        },
                    ));
                }
                Ok(read) => {
                    total_read += read;
                    trace!(read = read, total_read = total_read, "Partial read completed");
                }
                Err(e) => return Err((total_read, WireProtocolError::Io(e))),
            }
        }

        Ok(())
    }

    async fn read_body<T: DeserializeOwned>(
        &self,
        reader: &mut (impl AsyncRead + Unpin),
        length: usize,
    ) -> Result<T, WireProtocolError> {
        let mut body = vec![0u8; length];
        Self::read_exact_with_recovery(reader, &mut body)
            .await
            .map_err(|(_, e)| match e {
                WireProtocolError::UnexpectedEof { .. } => WireProtocolError::UnexpectedEof {
                    operation: format!("message body ({} bytes)", length),
                },
                other => other,
            })?;
        self.decode_body(&body)
    }

    /// Write one frame, bounded by the configured write timeout
    #[instrument(level = "debug", skip(self, writer, message))]
    pub async fn write_message<T: Serialize>(
        &self,
        writer: &mut (impl AsyncWrite + Unpin),
        message: &T,
    ) -> Result<(), WireProtocolError> {
        let frame = self.encode(message)?;
        let timeout = self.wire_config.write_timeout;

        let write = async {
            writer.write_all(&frame).await?;
            writer.flush().await?;
            Ok::<(), std::io::Error>(())
        };

        match tokio::time::timeout(timeout, write).await {
            Ok(result) => {
                result?;
                debug!("Wrote frame of {} bytes", frame.len());
                Ok(())
            }
            Err(_elapsed) => {
                error!(timeout = ?timeout, "Write operation timed out");
                Err(WireProtocolError::WriteTimeout { timeout })
            }
        }
    }

    /// Read one frame.
    ///
    /// Waiting for the length prefix is unbounded: an idle peer is normal
    /// between moves. Once a prefix has arrived the body must follow within
    /// the configured read timeout. A clean EOF before any prefix byte is
    /// reported as [`WireProtocolError::Closed`].
    #[instrument(level = "debug", skip(self, reader))]
    pub async fn read_message<T: DeserializeOwned>(
        &self,
        reader: &mut (impl AsyncRead + Unpin),
    ) -> Result<T, WireProtocolError> {
        let mut length_buffer = [0u8; LENGTH_PREFIX_SIZE];
        Self::read_exact_with_recovery(reader, &mut length_buffer)
            .await
            .map_err(|(read, e)| match e {
                WireProtocolError::UnexpectedEof { .. } if read == 0 => WireProtocolError::Closed,
                WireProtocolError::UnexpectedEof { .. } => WireProtocolError::UnexpectedEof {
                    operation: "length prefix".to_string(),
                },
                other => other,
            })?;

        let length = u32::from_be_bytes(length_buffer) as usize;
        self.validate_message_size(length)?;
        debug!("Read length prefix: {} bytes expected", length);

        let timeout = self.wire_config.read_timeout;
        match tokio::time::timeout(timeout, self.read_body(reader, length)).await {
            Ok(result) => result,
            Err(_elapsed) => {
                error!(timeout = ?timeout, "Timed out reading message body");
                Err(WireProtocolError::ReadTimeout { timeout })
            }
        }
    }
}
