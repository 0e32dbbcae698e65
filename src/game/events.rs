use super::error::GameError;
use super::session::{GameSession, SelectOutcome};
use crate::chess::{Move, MoveOutcome, Position, RuleSet};
use crate::messages::{ClientMessage, ServerMessage};
use tracing::debug;

/// Something the local player asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserCommand {
    /// Click on a square
    Select(Position),
    /// Move directly, bypassing selection
    Move(Move),
    Reset,
    Show,
    Quit,
}

/// Everything the client loop reacts to, merged into one ordered stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    Input(UserCommand),
    Server(ServerMessage),
    ConnectionLost(String),
}

/// What the client loop must do after an event was handled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Send(ClientMessage),
    Render,
    Notice(String),
    Quit,
}

impl<R: RuleSet> GameSession<R> {
    /// Handle one event to completion before the next is looked at.
    pub fn dispatch(&mut self, event: ClientEvent) -> Vec<Effect> {
        debug!("Dispatching {:?}", event);
        match event {
            ClientEvent::Input(command) => self.dispatch_command(command),
            ClientEvent::Server(message) => self.dispatch_server(message),
            ClientEvent::ConnectionLost(reason) => {
                self.clear_selection();
                vec![
                    Effect::Notice(format!("Connection to relay lost: {}", reason)),
                    Effect::Quit,
                ]
            }
        }
    }

    fn dispatch_command(&mut self, command: UserCommand) -> Vec<Effect> {
        match command {
            UserCommand::Select(square) => match self.select(square) {
                Ok(SelectOutcome::Moved(outcome)) => local_move_effects(&outcome),
                Ok(SelectOutcome::Selected(_)) | Ok(SelectOutcome::Deselected) => {
                    vec![Effect::Render]
                }
                Err(e) => rejected(e),
            },
            UserCommand::Move(mv) => {
                self.clear_selection();
                match self.request_move(mv.from, mv.to) {
                    Ok(outcome) => local_move_effects(&outcome),
                    Err(e) => rejected(e),
                }
            }
            UserCommand::Reset => {
                if self.player_color().is_none() {
                    return rejected(GameError::NoColorAssigned);
                }
                vec![
                    Effect::Send(ClientMessage::ResetGame),
                    Effect::Notice("Reset requested".to_string()),
                ]
            }
            UserCommand::Show => vec![Effect::Render],
            UserCommand::Quit => vec![Effect::Quit],
        }
    }

    fn dispatch_server(&mut self, message: ServerMessage) -> Vec<Effect> {
        let notice = match &message {
            ServerMessage::PlayerAssigned { color, .. } => Some(format!("You play {}", color)),
            ServerMessage::OpponentConnected => Some("Opponent connected".to_string()),
            ServerMessage::OpponentDisconnected => Some("Opponent disconnected".to_string()),
            ServerMessage::GameReset => Some("Game reset, White to move".to_string()),
            ServerMessage::GameFull => Some("Game is full, try again later".to_string()),
            ServerMessage::MoveMade { .. } => None,
        };
        let full = matches!(message, ServerMessage::GameFull);

        let mut effects = Vec::new();
        match self.handle_server_message(message) {
            Ok(Some(outcome)) => {
                let mut text = format!("Opponent played {}", outcome.mv);
                if let Some(captured) = outcome.captured {
                    text.push_str(&format!(", capturing {}", captured.piece_type));
                }
                if outcome.promoted {
                    text.push_str(", promoting to queen");
                }
                effects.push(Effect::Render);
                effects.push(Effect::Notice(text));
            }
            Ok(None) => {
                effects.push(Effect::Render);
                effects.extend(notice.map(Effect::Notice));
            }
            Err(e) => {
                effects.push(Effect::Notice(format!("Ignored relayed move: {}", e)));
            }
        }
        if full {
            effects.push(Effect::Quit);
        }
        effects
    }
}

fn local_move_effects(outcome: &MoveOutcome) -> Vec<Effect> {
    let mut effects = vec![Effect::Send(ClientMessage::make_move(outcome.mv)), Effect::Render];
    if outcome.promoted {
        effects.push(Effect::Notice(format!("Promoted to queen on {}", outcome.mv.to)));
    }
    effects
}

fn rejected(error: GameError) -> Vec<Effect> {
    debug!("Rejected input: {}", error);
    vec![Effect::Notice(error.to_string())]
}
