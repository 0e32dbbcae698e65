//! Destination squares under the simplified rule set.
//!
//! No check detection, castling or en-passant: a king may walk into check
//! and the game never ends on its own. Each piece type has one pure
//! function; [`legal_targets`] dispatches on the type of the piece found
//! on the origin square.

use super::{Board, Color, PieceType, Position};
use std::collections::BTreeSet;

const ORTHOGONAL: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const DIAGONAL: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
const KNIGHT_JUMPS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];
const KING_STEPS: [(i8, i8); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

/// Squares the piece on `origin` may move to. Empty when `origin` is empty.
pub fn legal_targets(board: &Board, origin: Position) -> BTreeSet<Position> {
    let Some(piece) = board.get_piece(origin) else {
        return BTreeSet::new();
    };

    let color = piece.color;
    match piece.piece_type {
        PieceType::Pawn => pawn_targets(board, origin, color),
        PieceType::Knight => step_targets(board, origin, color, &KNIGHT_JUMPS),
        PieceType::King => step_targets(board, origin, color, &KING_STEPS),
        PieceType::Rook => slide_targets(board, origin, color, &ORTHOGONAL),
        PieceType::Bishop => slide_targets(board, origin, color, &DIAGONAL),
        PieceType::Queen => {
            let mut targets = slide_targets(board, origin, color, &ORTHOGONAL);
            targets.extend(slide_targets(board, origin, color, &DIAGONAL));
            targets
        }
    }
}

/// One step forward onto an empty square, two from the home rank when both
/// squares ahead are empty, and forward diagonals only onto enemy pieces.
pub fn pawn_targets(board: &Board, origin: Position, color: Color) -> BTreeSet<Position> {
    let mut targets = BTreeSet::new();
    let forward = color.forward();

    if let Some(one_step) = origin.offset(0, forward) {
        if board.is_empty_at(one_step) {
            targets.insert(one_step);

            if origin.rank == color.pawn_home_rank() {
                if let Some(two_step) = origin.offset(0, 2 * forward) {
                    if board.is_empty_at(two_step) {
                        targets.insert(two_step);
                    }
                }
            }
        }
    }

    for file_delta in [-1, 1] {
        if let Some(diagonal) = origin.offset(file_delta, forward) {
            if board.is_enemy_at(diagonal, color) {
                targets.insert(diagonal);
            }
        }
    }

    targets
}

/// Fixed-offset movers (knight, king): on-board and not occupied by a friend.
pub fn step_targets(
    board: &Board,
    origin: Position,
    color: Color,
    offsets: &[(i8, i8)],
) -> BTreeSet<Position> {
    offsets
        .iter()
        .filter_map(|&(df, dr)| origin.offset(df, dr))
        .filter(|&pos| board.is_empty_at(pos) || board.is_enemy_at(pos, color))
        .collect()
}

/// Ray movers: every empty square up to the first occupied one, which is
/// included only when it holds an enemy piece.
pub fn slide_targets(
    board: &Board,
    origin: Position,
    color: Color,
    directions: &[(i8, i8)],
) -> BTreeSet<Position> {
    let mut targets = BTreeSet::new();

    for &(df, dr) in directions {
        for pos in origin.ray(df, dr) {
            match board.get_piece(pos) {
                None => {
                    targets.insert(pos);
                }
                Some(blocker) => {
                    if blocker.color != color {
                        targets.insert(pos);
                    }
                    break;
                }
            }
        }
    }

    targets
}
