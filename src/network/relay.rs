use crate::chess::Color;
use crate::messages::{ClientMessage, ServerMessage};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Relay-assigned identifier for one accepted connection
pub type PeerId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RelayError {
    #[error("Session already has two players")]
    SessionFull,

    #[error("Peer {0} does not hold a seat")]
    UnknownPeer(PeerId),
}

/// A message addressed to one seated peer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outbound {
    pub to: PeerId,
    pub message: ServerMessage,
}

impl Outbound {
    fn new(to: PeerId, message: ServerMessage) -> Self {
        Self { to, message }
    }
}

/// Seat bookkeeping for the single shared session.
///
/// The relay never looks inside a move and keeps no board. It only decides
/// who sits where and which peer a message goes to.
#[derive(Debug, Default, Clone)]
pub struct RelayState {
    white: Option<PeerId>,
    black: Option<PeerId>,
}

impl RelayState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seat_of(&self, peer: PeerId) -> Option<Color> {
        if self.white == Some(peer) {
            Some(Color::White)
        } else if self.black == Some(peer) {
            Some(Color::Black)
        } else {
            None
        }
    }

    pub fn peer_for(&self, color: Color) -> Option<PeerId> {
        match color {
            Color::White => self.white,
            Color::Black => self.black,
        }
    }

    pub fn player_count(&self) -> usize {
        self.white.iter().chain(self.black.iter()).count()
    }

    /// Both seats taken
    pub fn is_active(&self) -> bool {
        self.white.is_some() && self.black.is_some()
    }

    fn seat_mut(&mut self, color: Color) -> &mut Option<PeerId> {
        match color {
            Color::White => &mut self.white,
            Color::Black => &mut self.black,
        }
    }

    /// Seat a new peer. White is handed out first; afterwards whichever
    /// seat is free.
    pub fn connect(&mut self, peer: PeerId) -> Result<Vec<Outbound>, RelayError> {
        let color = if self.white.is_none() {
            Color::White
        } else if self.black.is_none() {
            Color::Black
        } else {
            warn!("Refusing peer {}: session is full", peer);
            return Err(RelayError::SessionFull);
        };

        *self.seat_mut(color) = Some(peer);
        let opponent = self.peer_for(color.opposite());
        info!("Peer {} seated as {}", peer, color);

        let mut outbound = vec![Outbound::new(
            peer,
            ServerMessage::PlayerAssigned {
                color,
                opponent_connected: opponent.is_some(),
            },
        )];
        if let Some(opponent) = opponent {
            outbound.push(Outbound::new(opponent, ServerMessage::OpponentConnected));
        }
        Ok(outbound)
    }

    /// Route a message from a seated peer
    pub fn handle(&mut self, from: PeerId, message: ClientMessage) -> Result<Vec<Outbound>, RelayError> {
        let color = self.seat_of(from).ok_or(RelayError::UnknownPeer(from))?;
        debug!("Peer {} ({}) sent {}", from, color, message.message_type());

        let outbound = match message {
            ClientMessage::MakeMove { from: origin, to } => match self.peer_for(color.opposite()) {
                Some(opponent) => vec![Outbound::new(
                    opponent,
                    ServerMessage::MoveMade { from: origin, to },
                )],
                None => {
                    debug!("Dropping move {}{} from peer {}: no opponent", origin, to, from);
                    Vec::new()
                }
            },
            ClientMessage::ResetGame => {
                info!("Peer {} requested a reset", from);
                self.white
                    .iter()
                    .chain(self.black.iter())
                    .map(|&peer| Outbound::new(peer, ServerMessage::GameReset))
                    .collect()
            }
        };
        Ok(outbound)
    }

    /// Free the peer's seat. Unseated peers produce nothing.
    pub fn disconnect(&mut self, peer: PeerId) -> Vec<Outbound> {
        let Some(color) = self.seat_of(peer) else {
            return Vec::new();
        };
        *self.seat_mut(color) = None;
        info!("Peer {} left the {} seat", peer, color);

        self.peer_for(color.opposite())
            .map(|opponent| Outbound::new(opponent, ServerMessage::OpponentDisconnected))
            .into_iter()
            .collect()
    }
}
