/// Transport level events shared by client & transports
pub mod events;
/// Gameplay messages exchanged with the remote peer
pub mod messages;
/// Transport implementations
pub mod transport;

pub use events::{ChannelId, ClientEvent, DisconnectReason, TransportError};
pub use messages::{MAX_MESSAGE_BYTES, PlayerId, PlayerInfo, ProtocolError, ServerMessage};
pub use transport::{ClientTransport, TransportResult};

/// Logical channel carrying gameplay messages (`ServerMessage`).
pub const GAMEPLAY_CHANNEL: ChannelId = 0;
