use super::error::{GameError, Result};
use crate::chess::{Board, Color, Move, MoveOutcome, Position, RuleSet, SimplifiedRules, TurnController};
use crate::messages::ServerMessage;
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::fmt;
use tracing::{debug, info, warn};

/// Where this client stands with the relay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Connecting,
    WaitingForOpponent,
    InProgress,
    OpponentDisconnected,
    GameFull,
}

impl SessionStatus {
    /// Moves are only possible while both players are present
    pub fn is_active(&self) -> bool {
        matches!(self, SessionStatus::InProgress)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStatus::Connecting => write!(f, "Connecting..."),
            SessionStatus::WaitingForOpponent => write!(f, "Waiting for opponent..."),
            SessionStatus::InProgress => write!(f, "Game in progress"),
            SessionStatus::OpponentDisconnected => {
                write!(f, "Opponent disconnected. Waiting for new opponent...")
            }
            SessionStatus::GameFull => write!(f, "Game is full"),
        }
    }
}

/// A piece picked up by the local player, with its highlighted destinations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub origin: Position,
    pub targets: BTreeSet<Position>,
}

impl Selection {
    pub fn is_highlighted(&self, pos: Position) -> bool {
        self.targets.contains(&pos)
    }
}

/// Result of a click on a square
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectOutcome {
    Selected(Selection),
    Moved(MoveOutcome),
    Deselected,
}

/// One peer's replica of the shared game.
///
/// Replicas converge only by replaying the same relayed moves in the same
/// order; nothing recomputes or arbitrates the board centrally.
#[derive(Debug, Clone)]
pub struct GameSession<R: RuleSet = SimplifiedRules> {
    rules: R,
    board: Board,
    turn: TurnController,
    player_color: Option<Color>,
    status: SessionStatus,
    selection: Option<Selection>,
}

impl GameSession<SimplifiedRules> {
    pub fn new() -> Self {
        Self::with_rules(SimplifiedRules)
    }
}

impl Default for GameSession<SimplifiedRules> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RuleSet> GameSession<R> {
    pub fn with_rules(rules: R) -> Self {
        Self {
            rules,
            board: Board::new(),
            turn: TurnController::new(),
            player_color: None,
            status: SessionStatus::Connecting,
            selection: None,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Replace the board, keeping turn and status. Clears any selection.
    pub fn set_board(&mut self, board: Board) {
        self.board = board;
        self.selection = None;
    }

    /// Color to move next
    pub fn turn(&self) -> Color {
        self.turn.current()
    }

    pub fn player_color(&self) -> Option<Color> {
        self.player_color
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    pub fn is_my_turn(&self) -> bool {
        self.is_active() && self.player_color == Some(self.turn.current())
    }

    /// Destination squares for whatever stands on `origin`
    pub fn targets(&self, origin: Position) -> BTreeSet<Position> {
        self.rules.targets(&self.board, origin)
    }

    fn own_color(&self) -> Result<Color> {
        self.player_color.ok_or(GameError::NoColorAssigned)
    }

    /// Click semantics: pick up an own piece, then either drop it on a
    /// highlighted square or anywhere else to put it back.
    pub fn select(&mut self, square: Position) -> Result<SelectOutcome> {
        let color = self.own_color()?;
        self.turn.authorize(color, self.is_active())?;

        if let Some(selection) = self.selection.take() {
            if selection.is_highlighted(square) {
                let outcome = self.request_move(selection.origin, square)?;
                return Ok(SelectOutcome::Moved(outcome));
            }
            debug!("Deselected {}", selection.origin);
            return Ok(SelectOutcome::Deselected);
        }

        match self.board.get_piece(square) {
            Some(piece) if piece.color == color => {
                let selection = Selection {
                    origin: square,
                    targets: self.targets(square),
                };
                debug!(
                    "Selected {} on {} with {} targets",
                    piece.piece_type,
                    square,
                    selection.targets.len()
                );
                self.selection = Some(selection.clone());
                Ok(SelectOutcome::Selected(selection))
            }
            _ => Err(GameError::IllegalMove(format!(
                "no {} piece on {}",
                color.to_string().to_lowercase(),
                square
            ))),
        }
    }

    /// Make a move for the local player. Nothing changes on rejection.
    pub fn request_move(&mut self, from: Position, to: Position) -> Result<MoveOutcome> {
        let color = self.own_color()?;
        self.turn.authorize(color, self.is_active())?;

        let mv = Move::new(from, to)?;
        let piece = self
            .board
            .get_piece(from)
            .ok_or_else(|| GameError::IllegalMove(format!("no piece on {}", from)))?;
        if piece.color != color {
            return Err(GameError::IllegalMove(format!(
                "the piece on {} belongs to {}",
                from, piece.color
            )));
        }
        if !self.rules.is_legal(&self.board, mv) {
            return Err(GameError::IllegalMove(format!(
                "{} on {} cannot reach {}",
                piece.piece_type, from, to
            )));
        }

        self.commit(mv, color)
    }

    /// Replay a move relayed from the opponent.
    ///
    /// Legality is trusted to the sending replica; only the turn and the
    /// presence of a piece on the origin are checked.
    pub fn apply_remote_move(&mut self, mv: Move) -> Result<MoveOutcome> {
        let piece = self
            .board
            .get_piece(mv.from)
            .ok_or_else(|| GameError::IllegalMove(format!("no piece on {}", mv.from)))?;

        if self.player_color == Some(piece.color) {
            return Err(GameError::IllegalMove(format!(
                "relayed move {} moves one of this player's own pieces",
                mv
            )));
        }
        self.turn.authorize(piece.color, self.is_active())?;

        self.commit(mv, piece.color)
    }

    fn commit(&mut self, mv: Move, mover: Color) -> Result<MoveOutcome> {
        let outcome = self.rules.apply(&mut self.board, mv)?;
        self.turn.accept(mover, true)?;
        self.selection = None;

        if outcome.promoted {
            info!("{} pawn promoted to queen on {}", mover, mv.to);
        }
        debug!(
            fingerprint = %self.fingerprint(),
            "Applied {} for {}, {} to move",
            mv,
            mover,
            self.turn.current()
        );
        Ok(outcome)
    }

    /// Back to the 32-piece layout with White to move. Never turn-gated.
    pub fn reset(&mut self) {
        self.board = Board::new();
        self.turn.reset();
        self.selection = None;
        info!("Game reset");
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// Update the replica for a relay message. Returns the applied move, if any.
    pub fn handle_server_message(&mut self, message: ServerMessage) -> Result<Option<MoveOutcome>> {
        match message {
            ServerMessage::PlayerAssigned {
                color,
                opponent_connected,
            } => {
                self.player_color = Some(color);
                self.status = if opponent_connected {
                    SessionStatus::InProgress
                } else {
                    SessionStatus::WaitingForOpponent
                };
                info!("Assigned color {} ({})", color, self.status);
            }
            ServerMessage::OpponentConnected => {
                self.status = SessionStatus::InProgress;
            }
            ServerMessage::OpponentDisconnected => {
                self.status = SessionStatus::OpponentDisconnected;
                self.selection = None;
            }
            ServerMessage::MoveMade { from, to } => {
                let mv = Move::new(from, to)?;
                return match self.apply_remote_move(mv) {
                    Ok(outcome) => Ok(Some(outcome)),
                    Err(e) => {
                        warn!("Rejected relayed move {}: {}", mv, e);
                        Err(e)
                    }
                };
            }
            ServerMessage::GameReset => self.reset(),
            ServerMessage::GameFull => {
                self.status = SessionStatus::GameFull;
            }
        }
        Ok(None)
    }

    /// SHA-256 over piece placement and side to move, hex encoded.
    /// Two replicas in agreement produce the same value.
    pub fn fingerprint(&self) -> String {
        let side = match self.turn.current() {
            Color::White => "w",
            Color::Black => "b",
        };
        let mut hasher = Sha256::new();
        hasher.update(self.board.to_placement().as_bytes());
        hasher.update(b" ");
        hasher.update(side.as_bytes());
        hex::encode(hasher.finalize())
    }
}
