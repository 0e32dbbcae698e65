use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChessError {
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    #[error("Invalid piece type: {0}")]
    InvalidPieceType(String),

    #[error("Invalid position: {0}")]
    InvalidPosition(String),

    #[error("Invalid move: {0}")]
    InvalidMove(String),

    #[error("Invalid piece placement: {0}")]
    InvalidPlacement(String),

    #[error("No piece at {0}")]
    EmptySquare(String),
}
