use super::moves::{Move, MoveOutcome};
use super::{ChessError, Color, Piece, PieceType, Position};

/// Piece placement of the standard starting position
pub const INITIAL_PLACEMENT: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR";

const BACK_RANK: [PieceType; 8] = [
    PieceType::Rook,
    PieceType::Knight,
    PieceType::Bishop,
    PieceType::Queen,
    PieceType::King,
    PieceType::Bishop,
    PieceType::Knight,
    PieceType::Rook,
];

/// Occupancy of the 64 squares. Whose turn it is lives in `TurnController`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    /// squares[rank][file] where rank 0 = rank 1, file 0 = file a
    squares: [[Option<Piece>; 8]; 8],
}

impl Board {
    /// Create a new board with the standard starting position
    pub fn new() -> Self {
        let mut board = Self::empty();
        board.setup_starting_position();
        board
    }

    /// A board with no pieces on it
    pub fn empty() -> Self {
        Self {
            squares: [[None; 8]; 8],
        }
    }

    /// Get the piece at the specified position, if any
    pub fn get_piece(&self, pos: Position) -> Option<Piece> {
        if pos.file > 7 || pos.rank > 7 {
            return None;
        }

        self.squares[pos.rank as usize][pos.file as usize]
    }

    /// Set (or clear, with `None`) the piece at the specified position
    pub fn set_piece(&mut self, pos: Position, piece: Option<Piece>) -> Result<(), ChessError> {
        if pos.file > 7 || pos.rank > 7 {
            let file = pos.file;
            let rank = pos.rank;
            return Err(ChessError::InvalidPosition(format!(
                "Position ({file},{rank}) is out of bounds"
            )));
        }

        self.squares[pos.rank as usize][pos.file as usize] = piece;
        Ok(())
    }

    /// Remove and return the piece at the specified position
    pub fn remove_piece(&mut self, pos: Position) -> Option<Piece> {
        if pos.file > 7 || pos.rank > 7 {
            return None;
        }

        self.squares[pos.rank as usize][pos.file as usize].take()
    }

    pub fn is_empty_at(&self, pos: Position) -> bool {
        self.get_piece(pos).is_none()
    }

    /// Whether `pos` holds a piece of the color opposing `color`
    pub fn is_enemy_at(&self, pos: Position, color: Color) -> bool {
        self.get_piece(pos).is_some_and(|piece| piece.color != color)
    }

    /// Occupied squares in a1..h8 order
    pub fn pieces(&self) -> impl Iterator<Item = (Position, Piece)> + '_ {
        Position::all_positions().filter_map(|pos| self.get_piece(pos).map(|piece| (pos, piece)))
    }

    pub fn piece_count(&self) -> usize {
        self.pieces().count()
    }

    fn setup_starting_position(&mut self) {
        self.squares = [[None; 8]; 8];

        for (file, &piece_type) in BACK_RANK.iter().enumerate() {
            self.squares[0][file] = Some(Piece::new(piece_type, Color::White));
            self.squares[7][file] = Some(Piece::new(piece_type, Color::Black));
        }

        for file in 0..8 {
            self.squares[1][file] = Some(Piece::new(PieceType::Pawn, Color::White));
            self.squares[6][file] = Some(Piece::new(PieceType::Pawn, Color::Black));
        }
    }

    /// Parse the piece placement field of a FEN string, e.g. `"8/8/8/8/8/8/4P3/8"`.
    /// Ranks run from 8 down to 1; digits stand for runs of empty squares.
    pub fn from_placement(placement: &str) -> Result<Board, ChessError> {
        let placement = placement.trim();
        if placement.is_empty() {
            return Err(ChessError::InvalidPlacement(
                "Piece placement cannot be empty".to_string(),
            ));
        }

        let ranks: Vec<&str> = placement.split('/').collect();
        if ranks.len() != 8 {
            let found_ranks = ranks.len();
            return Err(ChessError::InvalidPlacement(format!(
                "Piece placement must have exactly 8 ranks separated by '/', found {found_ranks}"
            )));
        }

        let mut board = Board::empty();

        for (rank_idx, rank_str) in ranks.iter().enumerate() {
            let board_rank = 7 - rank_idx;
            let fen_rank_number = 8 - rank_idx;

            if rank_str.is_empty() {
                return Err(ChessError::InvalidPlacement(format!(
                    "Rank {fen_rank_number} cannot be empty"
                )));
            }

            let mut file = 0usize;

            for c in rank_str.chars() {
                if file >= 8 {
                    return Err(ChessError::InvalidPlacement(format!(
                        "Rank {fen_rank_number} has more than 8 squares (found character '{c}')"
                    )));
                }

                if let Some(empty_squares) = c.to_digit(10) {
                    let empty_squares = empty_squares as usize;
                    if empty_squares == 0 || empty_squares > 8 {
                        return Err(ChessError::InvalidPlacement(format!(
                            "Invalid empty square count '{c}' in rank {fen_rank_number} (must be 1-8)"
                        )));
                    }
                    if file + empty_squares > 8 {
                        return Err(ChessError::InvalidPlacement(format!(
                            "Empty square count '{c}' in rank {fen_rank_number} would exceed 8 squares"
                        )));
                    }
                    file += empty_squares;
                } else {
                    let piece = Piece::from_fen_char(c).map_err(|_| {
                        let position = file + 1;
                        ChessError::InvalidPlacement(format!(
                            "Invalid piece character '{c}' in rank {fen_rank_number} at position {position} (valid pieces: KQRBNPkqrbnp)"
                        ))
                    })?;
                    board.squares[board_rank][file] = Some(piece);
                    file += 1;
                }
            }

            if file != 8 {
                return Err(ChessError::InvalidPlacement(format!(
                    "Rank {fen_rank_number} must represent exactly 8 squares, found {file}"
                )));
            }
        }

        Ok(board)
    }

    /// Inverse of [`Board::from_placement`]
    pub fn to_placement(&self) -> String {
        let mut ranks = Vec::with_capacity(8);

        for rank_idx in (0..8).rev() {
            let mut rank_string = String::new();
            let mut empty_count = 0;

            for file_idx in 0..8 {
                match self.squares[rank_idx][file_idx] {
                    Some(piece) => {
                        if empty_count > 0 {
                            rank_string.push_str(&empty_count.to_string());
                            empty_count = 0;
                        }
                        rank_string.push(piece.to_fen_char());
                    }
                    None => empty_count += 1,
                }
            }

            if empty_count > 0 {
                rank_string.push_str(&empty_count.to_string());
            }

            ranks.push(rank_string);
        }

        ranks.join("/")
    }

    /// Relocate the piece on `mv.from` to `mv.to`.
    ///
    /// Whatever stood on the destination is captured. A pawn arriving on its
    /// last rank becomes a queen of its color. Legality is the caller's
    /// business: this only fails when there is nothing to move.
    pub fn apply_move(&mut self, mv: Move) -> Result<MoveOutcome, ChessError> {
        let moving = self
            .get_piece(mv.from)
            .ok_or_else(|| ChessError::EmptySquare(mv.from.to_string()))?;

        let captured = self.remove_piece(mv.to);
        self.remove_piece(mv.from);

        let promoted =
            moving.piece_type == PieceType::Pawn && mv.to.rank == moving.color.promotion_rank();
        let placed = if promoted {
            Piece::new(PieceType::Queen, moving.color)
        } else {
            moving
        };
        self.set_piece(mv.to, Some(placed))?;

        Ok(MoveOutcome {
            mv,
            piece: placed,
            captured,
            promoted,
        })
    }

    /// The board that results from `mv`, leaving `self` untouched
    pub fn with_move(&self, mv: Move) -> Result<Board, ChessError> {
        let mut next = self.clone();
        next.apply_move(mv)?;
        Ok(next)
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}
