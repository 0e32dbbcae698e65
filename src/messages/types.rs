use crate::chess::{Color, Move, Position};
use serde::{Deserialize, Serialize};

/// Messages a player's client sends to the relay
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ClientMessage {
    /// Opaque to the relay; forwarded to the other seat as `move-made`
    MakeMove { from: Position, to: Position },
    /// Ask the relay to reset both replicas
    ResetGame,
}

impl ClientMessage {
    pub fn make_move(mv: Move) -> Self {
        ClientMessage::MakeMove {
            from: mv.from,
            to: mv.to,
        }
    }

    /// Get the message type as a string
    pub fn message_type(&self) -> &'static str {
        match self {
            ClientMessage::MakeMove { .. } => "make-move",
            ClientMessage::ResetGame => "reset-game",
        }
    }
}

/// Messages the relay sends to connected clients
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ServerMessage {
    /// Sent once, right after a connection is seated
    PlayerAssigned {
        color: Color,
        #[serde(rename = "opponentConnected")]
        opponent_connected: bool,
    },
    OpponentConnected,
    OpponentDisconnected,
    MoveMade { from: Position, to: Position },
    GameReset,
    /// The session already has two players; the connection is closed after this
    GameFull,
}

impl ServerMessage {
    pub fn move_made(mv: Move) -> Self {
        ServerMessage::MoveMade {
            from: mv.from,
            to: mv.to,
        }
    }

    /// Get the message type as a string
    pub fn message_type(&self) -> &'static str {
        match self {
            ServerMessage::PlayerAssigned { .. } => "player-assigned",
            ServerMessage::OpponentConnected => "opponent-connected",
            ServerMessage::OpponentDisconnected => "opponent-disconnected",
            ServerMessage::MoveMade { .. } => "move-made",
            ServerMessage::GameReset => "game-reset",
            ServerMessage::GameFull => "game-full",
        }
    }
}
