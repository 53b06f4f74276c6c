#![warn(rust_2018_idioms)]

//! Client for the Minecraft server list ping.
//!
//! A query opens a TCP connection, sends a handshake asking for the status state followed by
//! a status request, and decodes the single length-prefixed response frame into the JSON
//! document the server advertises (MOTD, version, player counts, favicon).

use std::time::Duration;

pub mod cache;
pub mod error;
pub mod fsm;
pub mod packet;
pub mod pinger;
pub mod status;
pub mod varint;

pub use cache::StatusCache;
pub use error::{ErrorKind, PingError, ProtocolError};
pub use fsm::{Fsm, State};
pub use pinger::StatusPinger;
pub use status::{MotdSummary, PlayerSample, ServerStatus};

pub const DEFAULT_PORT: u16 = 25565;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);

/// Status requests are answered regardless of version, so an old one is sent.
pub const DEFAULT_PROTOCOL_VERSION: u32 = 47;

/// Queries `host:port`, failing after `timeout_ms` milliseconds.
pub async fn query(host: &str, port: u16, timeout_ms: u64) -> Result<ServerStatus, PingError> {
    StatusPinger::new(host)
        .port(port)
        .timeout(Duration::from_millis(timeout_ms))
        .query()
        .await
}
