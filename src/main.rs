use anyhow::{Context, Result};
use clap::Parser;
use duel::chess::{Board, Position};
use duel::cli::{
    parse_line, render_targets, supports_unicode, BoardStyle, Cli, Commands, Config, ConfigCommand,
    InputLine, TerminalView, HELP_TEXT,
};
use duel::game::{ClientEvent, GameSession};
use duel::network::{run_peer, Client, PeerView, Server};
use std::io::BufRead;
use std::path::Path;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const EVENT_QUEUE_DEPTH: usize = 64;

fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = match cli.command {
        Commands::Serve { .. } => "info",
        _ => "warn",
    };
    init_tracing(default_level);

    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve { bind } => serve(&config, bind).await,
        Commands::Play { address, ascii } => play(&config, address, ascii).await,
        Commands::Moves { square, placement } => show_moves(&config, &square, placement.as_deref()),
        Commands::Config { command } => handle_config(&config, cli.config.as_deref(), command),
    }
}

async fn serve(config: &Config, bind: Option<String>) -> Result<()> {
    let addr = match bind {
        Some(addr) => addr,
        None => config.effective_bind_addr()?,
    };
    let server = Server::bind_with_config(&addr, config.wire_config()).await?;
    println!("Relay listening on {}", server.local_addr()?);

    tokio::select! {
        result = server.run() => result,
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for shutdown signal")?;
            info!("Shutting down relay");
            Ok(())
        }
    }
}

/// Read stdin on a dedicated thread so a pending read never holds up
/// runtime shutdown.
fn spawn_stdin_reader(events: mpsc::Sender<ClientEvent>) {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    warn!("Failed to read input: {}", e);
                    break;
                }
            };
            match parse_line(&line) {
                InputLine::Command(command) => {
                    if events.blocking_send(ClientEvent::Input(command)).is_err() {
                        return;
                    }
                }
                InputLine::Help => println!("{}", HELP_TEXT),
                InputLine::Empty => {}
                InputLine::Invalid(reason) => println!("{}", reason),
            }
        }
        let _ = events.blocking_send(ClientEvent::Input(duel::game::UserCommand::Quit));
    });
}

async fn play(config: &Config, address: Option<String>, ascii: bool) -> Result<()> {
    let addr = address.unwrap_or_else(|| config.server_addr.clone());
    let client = Client::new(config.wire_config());
    let connection = client.connect(&addr).await?;

    let style = BoardStyle {
        unicode: config.unicode && !ascii && supports_unicode(),
    };
    let mut view = TerminalView::new(style);
    view.notice(&format!("Connected to {}. Type 'help' for commands.", addr));

    let (events_tx, events_rx) = mpsc::channel(EVENT_QUEUE_DEPTH);
    spawn_stdin_reader(events_tx.clone());

    let mut session = GameSession::new();
    if let Err(e) = run_peer(connection, &mut session, events_rx, events_tx, &mut view).await {
        error!("Session ended with error: {}", e);
        return Err(e.into());
    }
    Ok(())
}

fn show_moves(config: &Config, square: &str, placement: Option<&str>) -> Result<()> {
    let board = match placement {
        Some(placement) => Board::from_placement(placement)?,
        None => Board::new(),
    };
    let origin: Position = square.parse()?;
    let targets = board.legal_targets(origin);

    let style = BoardStyle {
        unicode: config.unicode && supports_unicode(),
    };
    print!("{}", render_targets(&board, origin, &targets, style));

    match board.get_piece(origin) {
        None => println!("No piece on {}", origin),
        Some(piece) => {
            let list: Vec<String> = targets.iter().map(|t| t.to_string()).collect();
            println!(
                "{} {} on {}: {}",
                piece.color,
                piece.piece_type,
                origin,
                if list.is_empty() { "no moves".to_string() } else { list.join(" ") }
            );
        }
    }
    Ok(())
}

fn handle_config(config: &Config, explicit: Option<&Path>, command: ConfigCommand) -> Result<()> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => Config::default_config_file()?,
    };

    match command {
        ConfigCommand::Path => {
            println!("{}", path.display());
            if !path.exists() {
                println!("(not created yet, run 'duel config init')");
            }
        }
        ConfigCommand::Show => {
            let text = toml::to_string_pretty(config).context("Failed to serialize configuration")?;
            print!("{}", text);
        }
        ConfigCommand::Init => {
            if Config::init_at(&path)? {
                println!("Created {}", path.display());
            } else {
                println!("Configuration already exists at {}", path.display());
            }
        }
    }
    Ok(())
}
