pub use self::board::{Board, INITIAL_PLACEMENT};
pub use self::error::ChessError;
pub use self::moves::{Move, MoveOutcome};
pub use self::piece::{Color, Piece, PieceType};
pub use self::position::Position;
pub use self::rules::{RuleSet, SimplifiedRules};
pub use self::turn::{TurnController, TurnError};

mod board;
mod error;
pub mod movegen;
mod moves;
mod piece;
mod position;
mod rules;
mod turn;

impl Board {
    /// Destination squares for the piece on `origin` (see [`movegen::legal_targets`])
    pub fn legal_targets(&self, origin: Position) -> std::collections::BTreeSet<Position> {
        movegen::legal_targets(self, origin)
    }
}
