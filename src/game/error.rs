use crate::chess::{ChessError, TurnError};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("Illegal move: {0}")]
    IllegalMove(String),

    #[error(transparent)]
    Turn(#[from] TurnError),

    #[error("No color has been assigned to this player yet")]
    NoColorAssigned,

    #[error(transparent)]
    Chess(#[from] ChessError),
}

pub type Result<T> = std::result::Result<T, GameError>;
