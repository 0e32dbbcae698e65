use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "duel")]
#[command(about = "Two-player chess over a turn-sync relay")]
pub struct Cli {
    /// Configuration file to use instead of the default location
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the relay
    ///
    /// Seats the first two connections as White and Black and forwards
    /// moves between them. The PORT environment variable overrides the
    /// configured port.
    ///
    /// Examples:
    ///   duel serve
    ///   duel serve --bind 127.0.0.1:4000
    Serve {
        /// Address to listen on (default from config, port 3000)
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Join the game on a relay
    ///
    /// Examples:
    ///   duel play
    ///   duel play 192.168.1.20:3000
    Play {
        /// Relay address (default from config)
        address: Option<String>,
        /// Force ASCII pieces even when Unicode is configured
        #[arg(long)]
        ascii: bool,
    },

    /// List the squares a piece can move to
    ///
    /// Examples:
    ///   duel moves g1
    ///   duel moves d4 --placement 8/8/8/8/3Q4/8/8/8
    Moves {
        /// Square of the piece to inspect
        square: String,
        /// Piece placement field of a FEN string (default: starting position)
        #[arg(short, long)]
        placement: Option<String>,
    },

    /// Configuration management commands
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show the default configuration file path
    Path,
    /// Print the effective configuration
    Show,
    /// Write a default configuration file if none exists
    Init,
}
