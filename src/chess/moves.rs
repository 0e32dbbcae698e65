use super::error::ChessError;
use super::piece::Piece;
use super::position::Position;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A from/to pair. Promotion is implied by the board, never chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub from: Position,
    pub to: Position,
}

impl Move {
    /// Create a new move with validation
    pub fn new(from: Position, to: Position) -> Result<Self, ChessError> {
        if from == to {
            return Err(ChessError::InvalidMove(
                "Source and destination positions cannot be the same".to_string(),
            ));
        }

        Ok(Self { from, to })
    }

    /// Create a new move without validation (for internal use when validity is guaranteed)
    pub const fn new_unchecked(from: Position, to: Position) -> Self {
        Self { from, to }
    }

    /// The same squares travelled the other way
    pub fn reversed(&self) -> Self {
        Self {
            from: self.to,
            to: self.from,
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)
    }
}

/// Accepts `e2e4`, `e2-e4` and `e2 e4`.
impl FromStr for Move {
    type Err = ChessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s
            .trim()
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-')
            .collect();

        if compact.len() != 4 || !compact.is_ascii() {
            return Err(ChessError::InvalidMove(format!(
                "Invalid move format '{}'. Expected 'e2e4'.",
                s.trim()
            )));
        }

        let from = compact[0..2].parse::<Position>()?;
        let to = compact[2..4].parse::<Position>()?;
        Self::new(from, to)
    }
}

/// What happened on the board when a move was applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveOutcome {
    pub mv: Move,
    /// The piece as it stands on the destination after the move
    pub piece: Piece,
    pub captured: Option<Piece>,
    pub promoted: bool,
}
