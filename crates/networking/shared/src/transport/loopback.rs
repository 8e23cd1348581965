//! Loopback transport for in-memory client/peer communication.
//!
//! Keeps the client and a scripted remote peer in the same process without
//! touching the network stack. Used for local runs and tests.

use std::{
    collections::VecDeque,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicBool, Ordering},
    },
};

use bytes::Bytes;
use tracing::debug;

use crate::{
    ChannelId, ClientEvent, DisconnectReason, GAMEPLAY_CHANNEL, PlayerId, ServerMessage,
    TransportError,
};

use super::{ClientTransport, TransportResult};

#[derive(Debug)]
struct SharedLoopbackState {
    connected: AtomicBool,
    client_id: PlayerId,
    client_events: Mutex<VecDeque<ClientEvent>>,
}

impl SharedLoopbackState {
    fn new(client_id: PlayerId) -> Self {
        Self {
            connected: AtomicBool::new(false),
            client_id,
            client_events: Mutex::new(VecDeque::new()),
        }
    }

    /// Recovers a poisoned lock; no queue operation leaves the deque half-written.
    fn queue(&self) -> MutexGuard<'_, VecDeque<ClientEvent>> {
        self.client_events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn push_client_event(&self, event: ClientEvent) {
        self.queue().push_back(event);
    }

    fn ensure_connected(&self) -> TransportResult<()> {
        if self.connected.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(TransportError::NotConnected)
        }
    }
}

/// A pair of connected loopback transports (client half and peer half).
pub struct LoopbackPair {
    pub client: LoopbackClientTransport,
    pub server: LoopbackServerTransport,
}

impl LoopbackPair {
    /// Creates a pair whose client is assigned a fresh random identity.
    pub fn new() -> Self {
        Self::with_client_id(uuid::Uuid::new_v4().to_string())
    }

    /// Creates a pair whose client will be told it is `client_id` on connect.
    pub fn with_client_id(client_id: impl Into<PlayerId>) -> Self {
        let state = Arc::new(SharedLoopbackState::new(client_id.into()));
        Self {
            client: LoopbackClientTransport {
                state: Arc::clone(&state),
            },
            server: LoopbackServerTransport { state },
        }
    }
}

impl Default for LoopbackPair {
    fn default() -> Self {
        Self::new()
    }
}

/// Client-side loopback transport implementation.
pub struct LoopbackClientTransport {
    state: Arc<SharedLoopbackState>,
}

impl std::fmt::Debug for LoopbackClientTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoopbackClientTransport")
            .field("connected", &self.state.connected.load(Ordering::SeqCst))
            .finish()
    }
}

impl ClientTransport for LoopbackClientTransport {
    fn poll_events(&mut self, output: &mut Vec<ClientEvent>) {
        output.extend(self.state.queue().drain(..));
    }

    fn connect(&mut self) -> TransportResult<()> {
        if self
            .state
            .connected
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(TransportError::AlreadyConnected);
        }

        self.state.push_client_event(ClientEvent::Connected {
            client_id: self.state.client_id.clone(),
        });
        Ok(())
    }

    fn disconnect(&mut self) -> TransportResult<()> {
        self.state.ensure_connected()?;
        self.state.connected.store(false, Ordering::SeqCst);

        self.state.push_client_event(ClientEvent::Disconnected {
            reason: DisconnectReason::Graceful,
        });
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.state.connected.load(Ordering::SeqCst)
    }
}

/// Peer-side loopback transport: stands in for the remote source of truth.
pub struct LoopbackServerTransport {
    state: Arc<SharedLoopbackState>,
}

impl LoopbackServerTransport {
    /// Returns the identity handed to the loopback client.
    pub fn client_id(&self) -> &PlayerId {
        &self.state.client_id
    }

    /// Encodes and delivers a gameplay message to the client.
    pub fn send(&mut self, message: &ServerMessage) -> TransportResult<()> {
        self.state.ensure_connected()?;
        let payload = message.encode()?;
        debug!("loopback peer sends {} ({} bytes)", message.name(), payload.len());
        self.send_raw(GAMEPLAY_CHANNEL, payload)
    }

    /// Delivers raw bytes to the client without any encoding.
    pub fn send_raw(&mut self, channel: ChannelId, payload: Bytes) -> TransportResult<()> {
        self.state.ensure_connected()?;
        self.state
            .push_client_event(ClientEvent::Message { channel, payload });
        Ok(())
    }

    /// Forces the loopback client to disconnect with the provided reason.
    pub fn force_disconnect(&mut self, reason: DisconnectReason) -> TransportResult<()> {
        if self
            .state
            .connected
            .compare_exchange(true, false, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(TransportError::NotConnected);
        }

        self.state
            .push_client_event(ClientEvent::Disconnected { reason });
        Ok(())
    }
}

impl std::fmt::Debug for LoopbackServerTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoopbackServerTransport")
            .field("client_id", &self.state.client_id)
            .field("connected", &self.state.connected.load(Ordering::SeqCst))
            .finish()
    }
}
