use bytes::Bytes;

use crate::messages::{PlayerId, ProtocolError};

/// Logical channel a payload was delivered on.
pub type ChannelId = u8;

/// Why a connection ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisconnectReason {
    /// The local side asked to leave.
    Graceful,
    /// The remote peer closed the connection.
    Closed,
    /// No traffic within the keep-alive window.
    Timeout,
}

/// Errors raised by transports.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("transport not connected")]
    NotConnected,
    #[error("transport already connected")]
    AlreadyConnected,
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
    #[error("{0}")]
    Other(String),
}

/// Events surfaced by a client transport, drained once per frame.
#[derive(Debug)]
pub enum ClientEvent {
    /// The connection is up; `client_id` is the identity the remote peer
    /// assigned to this session.
    Connected { client_id: PlayerId },
    /// A reliable, ordered payload from the remote peer.
    Message { channel: ChannelId, payload: Bytes },
    Disconnected { reason: DisconnectReason },
    Error { error: TransportError },
}
