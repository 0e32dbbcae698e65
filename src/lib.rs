pub mod chess;
pub mod cli;
pub mod game;
pub mod messages;
pub mod network;

// Re-export key types for easy testing
pub use chess::{Board, Color, Move, Position};
pub use game::{GameError, GameSession};
pub use messages::{ClientMessage, ServerMessage};
pub use network::{Client, Connection, RelayState, Server};
