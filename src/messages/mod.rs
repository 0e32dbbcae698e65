pub mod types;
pub mod wire;

pub use types::{ClientMessage, ServerMessage};
pub use wire::{
    FramedMessage, WireConfig, WireProtocolError, DEFAULT_READ_TIMEOUT, DEFAULT_WRITE_TIMEOUT,
    LENGTH_PREFIX_SIZE, MAX_MESSAGE_SIZE, MIN_MESSAGE_SIZE,
};
