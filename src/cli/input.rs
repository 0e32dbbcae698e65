use crate::chess::{Move, Position};
use crate::game::UserCommand;
use regex::Regex;
use std::sync::OnceLock;

pub const HELP_TEXT: &str = "\
Commands:
  e2            select the piece on e2, or move the selected piece there
  e2e4          move directly (also: e2-e4, move e2 e4)
  reset         ask the relay to reset both boards
  board         redraw the board
  help          show this help
  quit          leave the game";

/// A line typed by the player
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputLine {
    Command(UserCommand),
    Help,
    Empty,
    Invalid(String),
}

fn square_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^([a-h][1-8])$").expect("valid square regex"))
}

fn move_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(?:move\s+)?([a-h][1-8])(?:\s*-\s*|\s+)?([a-h][1-8])$").expect("valid move regex")
    })
}

fn square(text: &str) -> Result<Position, String> {
    text.parse().map_err(|e| format!("{}", e))
}

/// Parse one line of interactive input. Case and surrounding whitespace
/// are ignored.
pub fn parse_line(line: &str) -> InputLine {
    let line = line.trim().to_lowercase();
    match line.as_str() {
        "" => return InputLine::Empty,
        "help" | "h" | "?" => return InputLine::Help,
        "quit" | "exit" | "q" => return InputLine::Command(UserCommand::Quit),
        "reset" => return InputLine::Command(UserCommand::Reset),
        "board" | "show" => return InputLine::Command(UserCommand::Show),
        _ => {}
    }

    if let Some(caps) = square_pattern().captures(&line) {
        return match square(&caps[1]) {
            Ok(pos) => InputLine::Command(UserCommand::Select(pos)),
            Err(e) => InputLine::Invalid(e),
        };
    }

    if let Some(caps) = move_pattern().captures(&line) {
        let parsed = square(&caps[1])
            .and_then(|from| square(&caps[2]).map(|to| (from, to)))
            .and_then(|(from, to)| Move::new(from, to).map_err(|e| e.to_string()));
        return match parsed {
            Ok(mv) => InputLine::Command(UserCommand::Move(mv)),
            Err(e) => InputLine::Invalid(e),
        };
    }

    InputLine::Invalid(format!("Unrecognized input '{}', type 'help' for commands", line))
}
