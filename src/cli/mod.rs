pub mod app;
pub mod commands;
pub mod display;
pub mod input;

pub use app::{Config, WireSettings, DEFAULT_PORT, PORT_ENV};
pub use commands::{Cli, Commands, ConfigCommand};
pub use display::{render_board, render_session, render_targets, status_line, supports_unicode, BoardStyle, TerminalView};
pub use input::{parse_line, InputLine, HELP_TEXT};
