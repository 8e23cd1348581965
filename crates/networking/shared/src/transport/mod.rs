//! Transport layer seam between the world client and its remote peer.

pub mod loopback;

pub use loopback::{LoopbackClientTransport, LoopbackPair, LoopbackServerTransport};

use crate::{ClientEvent, TransportError};

pub type TransportResult<T> = Result<T, TransportError>;

/// Client half of a connection to the remote source of truth.
///
/// Transports buffer whatever arrives between frames; the client drains
/// them with [`poll_events`](Self::poll_events) on its own loop, so event
/// handling never runs concurrently with a frame tick.
pub trait ClientTransport: Send + Sync + 'static {
    /// Moves every buffered event into `output`, oldest first.
    fn poll_events(&mut self, output: &mut Vec<ClientEvent>);

    fn connect(&mut self) -> TransportResult<()>;

    fn disconnect(&mut self) -> TransportResult<()>;

    fn is_connected(&self) -> bool;
}
