use std::io;
use std::time::Duration;

use thiserror::Error;

/// Everything that can end a status query early.
#[derive(Error, Debug)]
pub enum PingError {
    #[error("no complete status response within {after:?}")]
    Timeout { after: Duration },
    #[error("connection failed: {0}")]
    Connection(#[from] io::Error),
    #[error("connection was closed before a complete response arrived")]
    ConnectionClosed,
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
    #[error("query was cancelled")]
    Cancelled,
}

#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("VarInt bigger than 5 bytes sent")]
    VarIntTooLong,
    #[error("unexpected packet id {0}")]
    UnexpectedPacketId(u32),
    #[error("packet size {0} exceeded limit")]
    PacketTooLarge(u32),
    #[error("payload runs past the end of its frame")]
    LengthMismatch,
    #[error("payload is not valid UTF-8")]
    InvalidUtf8(#[from] std::str::Utf8Error),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Coarse classification of a [`PingError`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Timeout,
    Connection,
    Protocol,
    Cancelled,
}

impl PingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PingError::Timeout { .. } => ErrorKind::Timeout,
            PingError::Connection(_) | PingError::ConnectionClosed => ErrorKind::Connection,
            PingError::Protocol(_) => ErrorKind::Protocol,
            PingError::Cancelled => ErrorKind::Cancelled,
        }
    }
}
