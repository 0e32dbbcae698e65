use super::moves::{Move, MoveOutcome};
use super::{movegen, Board, ChessError, Position};
use std::collections::BTreeSet;

/// Move generation and application as one pluggable unit.
///
/// [`SimplifiedRules`] is the only rule set shipped; a full rules engine
/// with check, castling and en-passant would implement this trait.
pub trait RuleSet {
    /// Destination squares for the piece on `origin`; empty if unoccupied
    fn targets(&self, board: &Board, origin: Position) -> BTreeSet<Position>;

    /// Apply an already-vetted move to `board`
    fn apply(&self, board: &mut Board, mv: Move) -> Result<MoveOutcome, ChessError>;

    fn is_legal(&self, board: &Board, mv: Move) -> bool {
        self.targets(board, mv.from).contains(&mv.to)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimplifiedRules;

impl RuleSet for SimplifiedRules {
    fn targets(&self, board: &Board, origin: Position) -> BTreeSet<Position> {
        movegen::legal_targets(board, origin)
    }

    fn apply(&self, board: &mut Board, mv: Move) -> Result<MoveOutcome, ChessError> {
        board.apply_move(mv)
    }
}
