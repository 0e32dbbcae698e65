use super::connection::{Connection, ConnectionError};
use crate::chess::RuleSet;
use crate::game::{ClientEvent, Effect, GameSession};
use crate::messages::wire::WireConfig;
use crate::messages::ServerMessage;
use anyhow::{Context, Result};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task;
use tracing::{debug, info, instrument, warn};

/// Where a peer's session is shown to the player
pub trait PeerView {
    fn render<R: RuleSet>(&mut self, session: &GameSession<R>);
    fn notice(&mut self, text: &str);
}

pub struct Client {
    wire_config: WireConfig,
}

impl Client {
    pub fn new(wire_config: WireConfig) -> Self {
        Self { wire_config }
    }

    pub async fn connect(&self, addr: &str) -> Result<Connection> {
        info!("Connecting to relay at {}", addr);
        let stream = TcpStream::connect(addr)
            .await
            .with_context(|| format!("Failed to connect to relay at {}", addr))?;
        let connection = Connection::new_with_config(stream, self.wire_config.clone())
            .context("Failed to set up relay connection")?;
        info!("Connected to relay at {}", connection.peer_addr());
        Ok(connection)
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new(WireConfig::default())
    }
}

/// Drive one player's session until it quits or the relay goes away.
///
/// Relay messages are pushed into `events_tx` by a reader task, so local
/// input arriving through the same channel and remote moves are applied
/// strictly one at a time in arrival order.
#[instrument(skip_all, fields(peer = %connection.peer_addr()))]
pub async fn run_peer<R, V>(
    connection: Connection,
    session: &mut GameSession<R>,
    mut events: mpsc::Receiver<ClientEvent>,
    events_tx: mpsc::Sender<ClientEvent>,
    view: &mut V,
) -> Result<(), ConnectionError>
where
    R: RuleSet,
    V: PeerView,
{
    let (mut reader, mut writer) = connection.into_split();

    let network_reader = task::spawn(async move {
        loop {
            let event = match reader.receive::<ServerMessage>().await {
                Ok(message) => ClientEvent::Server(message),
                Err(e) => {
                    debug!("Relay reader stopped: {}", e);
                    let _ = events_tx.send(ClientEvent::ConnectionLost(e.to_string())).await;
                    break;
                }
            };
            if events_tx.send(event).await.is_err() {
                break;
            }
        }
    });

    let mut result = Ok(());
    'events: while let Some(event) = events.recv().await {
        for effect in session.dispatch(event) {
            match effect {
                Effect::Send(message) => {
                    if let Err(e) = writer.send(&message).await {
                        warn!("Failed to send {}: {}", message.message_type(), e);
                        view.notice(&format!("Failed to reach relay: {}", e));
                        result = Err(e);
                        break 'events;
                    }
                }
                Effect::Render => view.render(session),
                Effect::Notice(text) => view.notice(&text),
                Effect::Quit => break 'events,
            }
        }
    }

    network_reader.abort();
    if let Err(e) = writer.close().await {
        debug!("Error closing relay connection: {}", e);
    }
    info!("Session ended");
    result
}
