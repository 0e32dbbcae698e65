pub mod client;
pub mod connection;
pub mod relay;
pub mod server;

pub use client::{run_peer, Client, PeerView};
pub use connection::{Connection, ConnectionError, FrameReader, FrameWriter};
pub use relay::{Outbound, PeerId, RelayError, RelayState};
pub use server::Server;
