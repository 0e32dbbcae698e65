//! A single peer's replica of the shared game and the event loop core
//! that drives it.

pub mod error;
pub mod events;
pub mod session;

pub use error::GameError;
pub use events::{ClientEvent, Effect, UserCommand};
pub use session::{GameSession, SelectOutcome, Selection, SessionStatus};
