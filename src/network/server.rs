use super::connection::{Connection, ConnectionError};
use super::relay::{Outbound, PeerId, RelayError, RelayState};
use crate::messages::wire::{WireConfig, WireProtocolError};
use crate::messages::{ClientMessage, ServerMessage};
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::net::SocketAddr;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot};
use tokio::task::{self, JoinHandle};
use tracing::{debug, error, info, instrument, warn};

const HUB_QUEUE_DEPTH: usize = 64;

/// Events the connection tasks report to the hub
#[derive(Debug)]
enum HubEvent {
    Joined {
        peer: PeerId,
        outbox: mpsc::UnboundedSender<ServerMessage>,
        admitted: oneshot::Sender<bool>,
    },
    Received {
        peer: PeerId,
        message: ClientMessage,
    },
    Left {
        peer: PeerId,
    },
}

/// The turn-sync relay.
///
/// A single hub task owns the [`RelayState`] and the per-peer outboxes, so
/// every seat change and forwarded message is handled in arrival order.
pub struct Server {
    listener: TcpListener,
    wire_config: WireConfig,
}

impl Server {
    pub async fn bind(addr: &str) -> Result<Self> {
        Self::bind_with_config(addr, WireConfig::default()).await
    }

    /// Create a server with custom wire configuration
    pub async fn bind_with_config(addr: &str, wire_config: WireConfig) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind relay to address: {}", addr))?;

        info!("Relay bound to address: {}", addr);
        debug!(
            "Wire config - max_message_size: {}, read_timeout: {:?}, write_timeout: {:?}",
            wire_config.max_message_size, wire_config.read_timeout, wire_config.write_timeout
        );

        Ok(Self {
            listener,
            wire_config,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener
            .local_addr()
            .context("Failed to read relay listen address")
    }

    pub async fn run(self) -> Result<()> {
        info!("Relay listening on {}", self.local_addr()?);

        let (hub_tx, hub_rx) = mpsc::channel(HUB_QUEUE_DEPTH);
        let hub = task::spawn(Self::run_hub(hub_rx));

        let mut active_connections: HashMap<PeerId, JoinHandle<()>> = HashMap::new();
        let mut connection_counter: PeerId = 0;

        loop {
            match self.listener.accept().await {
                Ok((stream, peer_addr)) => {
                    connection_counter += 1;
                    let peer = connection_counter;
                    info!("Accepted connection {} from {}", peer, peer_addr);

                    let hub_tx = hub_tx.clone();
                    let wire_config = self.wire_config.clone();
                    let handle = task::spawn(async move {
                        if let Err(e) = Self::handle_connection(stream, peer, hub_tx, wire_config).await {
                            error!("Connection {} failed: {}", peer, e);
                        } else {
                            debug!("Connection {} finished", peer);
                        }
                    });
                    active_connections.insert(peer, handle);

                    active_connections.retain(|id, handle| {
                        if handle.is_finished() {
                            debug!("Cleaning up completed connection {}", id);
                            false
                        } else {
                            true
                        }
                    });
                }
                Err(e) => {
                    error!("Failed to accept connection: {}", e);
                    if hub.is_finished() {
                        anyhow::bail!("Relay hub stopped unexpectedly");
                    }
                }
            }
        }
    }

    async fn run_hub(mut events: mpsc::Receiver<HubEvent>) {
        let mut relay = RelayState::new();
        let mut outboxes: HashMap<PeerId, mpsc::UnboundedSender<ServerMessage>> = HashMap::new();

        while let Some(event) = events.recv().await {
            match event {
                HubEvent::Joined {
                    peer,
                    outbox,
                    admitted,
                } => match relay.connect(peer) {
                    Ok(outbound) => {
                        outboxes.insert(peer, outbox);
                        let _ = admitted.send(true);
                        Self::deliver(&outboxes, outbound);
                    }
                    Err(RelayError::SessionFull) | Err(RelayError::UnknownPeer(_)) => {
                        let _ = outbox.send(ServerMessage::GameFull);
                        let _ = admitted.send(false);
                    }
                },
                HubEvent::Received { peer, message } => match relay.handle(peer, message) {
                    Ok(outbound) => Self::deliver(&outboxes, outbound),
                    Err(e) => warn!("Ignoring message from connection {}: {}", peer, e),
                },
                HubEvent::Left { peer } => {
                    outboxes.remove(&peer);
                    let outbound = relay.disconnect(peer);
                    Self::deliver(&outboxes, outbound);
                }
            }
        }
        debug!("Relay hub stopped");
    }

    fn deliver(outboxes: &HashMap<PeerId, mpsc::UnboundedSender<ServerMessage>>, outbound: Vec<Outbound>) {
        for Outbound { to, message } in outbound {
            match outboxes.get(&to) {
                Some(outbox) => {
                    if outbox.send(message).is_err() {
                        debug!("Outbox for connection {} already closed", to);
                    }
                }
                None => debug!("No outbox for connection {}", to),
            }
        }
    }

    /// Handle individual connection lifecycle
    #[instrument(skip(stream, hub, wire_config), fields(connection_id = peer))]
    async fn handle_connection(
        stream: TcpStream,
        peer: PeerId,
        hub: mpsc::Sender<HubEvent>,
        wire_config: WireConfig,
    ) -> Result<()> {
        let connection = Connection::new_with_config(stream, wire_config)?;
        let (mut reader, mut writer) = connection.into_split();

        let (outbox_tx, mut outbox_rx) = mpsc::unbounded_channel::<ServerMessage>();
        let writer_task = task::spawn(async move {
            while let Some(message) = outbox_rx.recv().await {
                if let Err(e) = writer.send(&message).await {
                    warn!("Failed to send {} to connection {}: {}", message.message_type(), peer, e);
                    break;
                }
            }
            if let Err(e) = writer.close().await {
                debug!("Error shutting down connection {}: {}", peer, e);
            }
        });

        let (admitted_tx, admitted_rx) = oneshot::channel();
        hub.send(HubEvent::Joined {
            peer,
            outbox: outbox_tx,
            admitted: admitted_tx,
        })
        .await
        .context("Relay hub is not running")?;

        if !admitted_rx.await.unwrap_or(false) {
            info!("Connection {} refused: game full", peer);
            let _ = writer_task.await;
            return Ok(());
        }

        loop {
            match reader.receive::<ClientMessage>().await {
                Ok(message) => {
                    debug!("Received {} from connection {}", message.message_type(), peer);
                    if hub.send(HubEvent::Received { peer, message }).await.is_err() {
                        break;
                    }
                }
                Err(ConnectionError::ConnectionClosed) => {
                    info!("Connection {} closed by peer", peer);
                    break;
                }
                Err(ConnectionError::WireProtocol(WireProtocolError::ReadTimeout { .. })) => {
                    debug!("Read timeout on connection {}, closing", peer);
                    break;
                }
                Err(e) => {
                    warn!("Error receiving from connection {}: {}", peer, e);
                    break;
                }
            }
        }

        let _ = hub.send(HubEvent::Left { peer }).await;
        let _ = writer_task.await;
        Ok(())
    }
}
