//! Gameplay protocol between the world client and its remote peer.
//!
//! Payloads travel as `bincode` (standard config) encoded [`ServerMessage`]s.
//! The variant names mirror the protocol-level event names
//! (`currentPlayers`, `newPlayer`, `disconnect`).

use std::collections::BTreeMap;
use std::fmt;

use bincode::config::{Config, standard};
use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Upper bound for one encoded message. Length prefixes claiming more are
/// rejected before anything is allocated.
pub const MAX_MESSAGE_BYTES: usize = 64 * 1024;

fn wire_config() -> impl Config {
    standard().with_limit::<MAX_MESSAGE_BYTES>()
}

/// Stable identity of a connected peer.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for PlayerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Position of one player as announced by the remote peer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub x: f32,
    pub y: f32,
    pub player_id: PlayerId,
}

impl PlayerInfo {
    pub fn new(player_id: impl Into<PlayerId>, x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            player_id: player_id.into(),
        }
    }
}

/// Messages sent from the remote peer to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ServerMessage {
    /// Every connected player, keyed by identity. Sent once, first.
    CurrentPlayers(BTreeMap<PlayerId, PlayerInfo>),
    /// A player joined after the snapshot.
    NewPlayer(PlayerInfo),
    /// A player left.
    Disconnect(PlayerId),
}

impl ServerMessage {
    /// Builds a `CurrentPlayers` snapshot keyed by each entry's own id.
    pub fn current_players(players: impl IntoIterator<Item = PlayerInfo>) -> Self {
        Self::CurrentPlayers(
            players
                .into_iter()
                .map(|info| (info.player_id.clone(), info))
                .collect(),
        )
    }

    /// Protocol-level event name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CurrentPlayers(_) => "currentPlayers",
            Self::NewPlayer(_) => "newPlayer",
            Self::Disconnect(_) => "disconnect",
        }
    }

    pub fn encode(&self) -> Result<Bytes, ProtocolError> {
        let buffer = bincode::serde::encode_to_vec(self, wire_config())?;
        Ok(Bytes::from(buffer))
    }

    /// Decodes one message; trailing bytes are a protocol violation.
    pub fn decode(payload: &[u8]) -> Result<Self, ProtocolError> {
        let (message, consumed) =
            bincode::serde::decode_from_slice::<Self, _>(payload, wire_config())?;
        if consumed != payload.len() {
            return Err(ProtocolError::TrailingBytes {
                consumed,
                len: payload.len(),
            });
        }
        Ok(message)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("failed to encode message: {0}")]
    Encode(#[from] bincode::error::EncodeError),
    #[error("failed to decode message: {0}")]
    Decode(#[from] bincode::error::DecodeError),
    #[error("message used {consumed} of {len} bytes")]
    TrailingBytes { consumed: usize, len: usize },
}
