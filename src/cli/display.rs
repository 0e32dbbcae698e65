use crate::chess::{Board, Color, Piece, Position, RuleSet};
use crate::game::{GameSession, Selection};
use crate::network::PeerView;
use std::collections::BTreeSet;
use std::fmt::Write as _;

const TOP_BORDER: &str = "  ┌───┬───┬───┬───┬───┬───┬───┬───┐";
const SEPARATOR: &str = "  ├───┼───┼───┼───┼───┼───┼───┼───┤";
const BOTTOM_BORDER: &str = "  └───┴───┴───┴───┴───┴───┴───┴───┘";

/// How pieces and highlights are drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardStyle {
    pub unicode: bool,
}

impl BoardStyle {
    fn piece_symbol(&self, piece: Piece) -> char {
        if self.unicode {
            piece.to_unicode()
        } else {
            piece.to_fen_char()
        }
    }

    fn empty_target(&self) -> char {
        if self.unicode {
            '·'
        } else {
            '*'
        }
    }
}

fn cell(board: &Board, pos: Position, selection: Option<&Selection>, style: BoardStyle) -> String {
    let piece = board.get_piece(pos);
    let symbol = piece.map(|p| style.piece_symbol(p)).unwrap_or(' ');

    match selection {
        Some(selection) if selection.origin == pos => format!("[{}]", symbol),
        Some(selection) if selection.is_highlighted(pos) => match piece {
            Some(_) => format!("({})", symbol),
            None => format!(" {} ", style.empty_target()),
        },
        _ => format!(" {} ", symbol),
    }
}

/// Draw the board with the given color at the bottom.
///
/// The selected square is bracketed; reachable empty squares are dotted and
/// capturable pieces are parenthesized.
pub fn render_board(
    board: &Board,
    perspective: Color,
    selection: Option<&Selection>,
    style: BoardStyle,
) -> String {
    let (ranks, files): (Vec<u8>, Vec<u8>) = match perspective {
        Color::White => ((0..8).rev().collect(), (0..8).collect()),
        Color::Black => ((0..8).collect(), (0..8).rev().collect()),
    };

    let mut out = String::new();
    let _ = writeln!(out, "{}", TOP_BORDER);
    for (row, &rank) in ranks.iter().enumerate() {
        let rank_number = rank + 1;
        let _ = write!(out, "{} │", rank_number);
        for &file in &files {
            let pos = Position::new_unchecked(file, rank);
            let _ = write!(out, "{}│", cell(board, pos, selection, style));
        }
        let _ = writeln!(out, " {}", rank_number);
        if row < 7 {
            let _ = writeln!(out, "{}", SEPARATOR);
        }
    }
    let _ = writeln!(out, "{}", BOTTOM_BORDER);

    let labels: Vec<String> = files
        .iter()
        .map(|&file| ((b'a' + file) as char).to_string())
        .collect();
    let _ = writeln!(out, "    {}", labels.join("   "));
    out
}

/// One line describing connection state and whose turn it is
pub fn status_line<R: RuleSet>(session: &GameSession<R>) -> String {
    let mut line = session.status().to_string();
    if let Some(color) = session.player_color() {
        let _ = write!(line, " | You: {}", color);
    }
    if session.is_active() {
        if session.is_my_turn() {
            line.push_str(" | Your turn");
        } else {
            let _ = write!(line, " | {} to move", session.turn());
        }
    }
    line
}

/// Full view of a session: board from the player's side plus status
pub fn render_session<R: RuleSet>(session: &GameSession<R>, style: BoardStyle) -> String {
    let perspective = session.player_color().unwrap_or(Color::White);
    let mut out = render_board(session.board(), perspective, session.selection(), style);
    if let Some(selection) = session.selection() {
        let targets: Vec<String> = selection.targets.iter().map(|t| t.to_string()).collect();
        if targets.is_empty() {
            let _ = writeln!(out, "{} selected, no moves available", selection.origin);
        } else {
            let _ = writeln!(out, "{} selected: {}", selection.origin, targets.join(" "));
        }
    }
    let _ = writeln!(out, "{}", status_line(session));
    out
}

/// Board for a standalone origin query, marking its destinations
pub fn render_targets(board: &Board, origin: Position, targets: &BTreeSet<Position>, style: BoardStyle) -> String {
    let selection = Selection {
        origin,
        targets: targets.clone(),
    };
    render_board(board, Color::White, Some(&selection), style)
}

/// Check if terminal supports Unicode chess pieces
pub fn supports_unicode() -> bool {
    std::env::var("TERM")
        .map(|term| {
            term.contains("xterm")
                || term.contains("screen")
                || term.contains("tmux")
                || term == "alacritty"
                || term == "kitty"
        })
        .unwrap_or(false)
        || std::env::var("TERM_PROGRAM").is_ok()
}

/// Terminal front end for an interactive session
#[derive(Debug, Clone, Copy)]
pub struct TerminalView {
    style: BoardStyle,
}

impl TerminalView {
    pub fn new(style: BoardStyle) -> Self {
        Self { style }
    }
}

impl PeerView for TerminalView {
    fn render<R: RuleSet>(&mut self, session: &GameSession<R>) {
        println!();
        print!("{}", render_session(session, self.style));
    }

    fn notice(&mut self, text: &str) {
        println!("{}", text);
    }
}
