use super::Color;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TurnError {
    #[error("Session is not active: waiting for an opponent")]
    SessionInactive,

    #[error("It is {expected}'s turn, not {got}'s")]
    OutOfTurn { expected: Color, got: Color },
}

/// Side to move. Starts with White, flips once per accepted move and has no
/// terminal state; only [`TurnController::reset`] brings it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TurnController {
    current: Color,
}

impl TurnController {
    pub fn new() -> Self {
        Self {
            current: Color::White,
        }
    }

    pub fn current(&self) -> Color {
        self.current
    }

    /// Check whether `mover` may move now, without changing anything
    pub fn authorize(&self, mover: Color, session_active: bool) -> Result<(), TurnError> {
        if !session_active {
            return Err(TurnError::SessionInactive);
        }
        if mover != self.current {
            return Err(TurnError::OutOfTurn {
                expected: self.current,
                got: mover,
            });
        }
        Ok(())
    }

    /// Authorize `mover` and hand the turn to the other side.
    /// Returns the color now to move.
    pub fn accept(&mut self, mover: Color, session_active: bool) -> Result<Color, TurnError> {
        self.authorize(mover, session_active)?;
        self.current = self.current.opposite();
        Ok(self.current)
    }

    pub fn reset(&mut self) {
        self.current = Color::White;
    }
}

impl Default for TurnController {
    fn default() -> Self {
        Self::new()
    }
}
