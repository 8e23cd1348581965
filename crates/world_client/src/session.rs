//! Binds the transport to the remote player registry and the local player
//! controller.
//!
//! Every inbound event goes through [`SyncSession::handle_event`]. Events that
//! break the expected order (snapshot first, exactly once) are logged and
//! dropped so one bad message never corrupts the other players' records.

use bevy::prelude::*;
use shared::{ClientEvent, GAMEPLAY_CHANNEL, PlayerId, PlayerInfo, ServerMessage};
use tracing::{debug, error, info, warn};

use app::LOG_SYNC;

use crate::controller::LocalPlayerController;
use crate::registry::RemotePlayerRegistry;

/// Inbound gameplay event, already decoded.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Snapshot(Vec<PlayerInfo>),
    Join(PlayerInfo),
    Leave(PlayerId),
}

impl From<ServerMessage> for SessionEvent {
    fn from(message: ServerMessage) -> Self {
        match message {
            ServerMessage::CurrentPlayers(players) => Self::Snapshot(players.into_values().collect()),
            ServerMessage::NewPlayer(info) => Self::Join(info),
            ServerMessage::Disconnect(identity) => Self::Leave(identity),
        }
    }
}

/// What an event changed, for the rendering side to mirror.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionChange {
    LocalPlayerSpawned { identity: PlayerId, position: Vec2 },
    LocalPlayerDespawned { identity: PlayerId },
    RemotePlayerAdded { identity: PlayerId, position: Vec2 },
    RemotePlayerReplaced { identity: PlayerId, position: Vec2 },
    RemotePlayerRemoved { identity: PlayerId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    AwaitingIdentity,
    AwaitingSnapshot,
    Synchronized,
}

#[derive(Resource, Debug)]
pub struct SyncSession {
    identity: Option<PlayerId>,
    phase: SessionPhase,
    registry: RemotePlayerRegistry,
    controller: LocalPlayerController,
}

impl SyncSession {
    pub fn new(registry: RemotePlayerRegistry, controller: LocalPlayerController) -> Self {
        Self {
            identity: None,
            phase: SessionPhase::AwaitingIdentity,
            registry,
            controller,
        }
    }

    pub fn identity(&self) -> Option<&PlayerId> {
        self.identity.as_ref()
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn registry(&self) -> &RemotePlayerRegistry {
        &self.registry
    }

    pub fn controller(&self) -> &LocalPlayerController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut LocalPlayerController {
        &mut self.controller
    }

    /// Records the identity the transport assigned to this client. Binding
    /// again starts a fresh session.
    pub fn bind_identity(&mut self, identity: PlayerId) -> Vec<SessionChange> {
        let changes = if self.phase == SessionPhase::AwaitingIdentity {
            Vec::new()
        } else {
            warn!(target: LOG_SYNC, "Identity rebound to {}, resetting session", identity);
            self.reset()
        };

        info!(target: LOG_SYNC, "Session bound to identity {}", identity);
        self.identity = Some(identity);
        self.phase = SessionPhase::AwaitingSnapshot;
        changes
    }

    pub fn handle_event(&mut self, event: SessionEvent) -> Vec<SessionChange> {
        match event {
            SessionEvent::Snapshot(players) => match (self.phase, &self.identity) {
                (SessionPhase::AwaitingSnapshot, Some(identity)) => {
                    self.phase = SessionPhase::Synchronized;
                    info!(
                        target: LOG_SYNC,
                        "Applying snapshot of {} players", players.len()
                    );
                    self.registry
                        .on_snapshot(players, identity, &mut self.controller)
                }
                (SessionPhase::Synchronized, _) => {
                    warn!(target: LOG_SYNC, "Dropping repeated snapshot");
                    Vec::new()
                }
                _ => {
                    error!(target: LOG_SYNC, "Dropping snapshot received before identity");
                    Vec::new()
                }
            },
            SessionEvent::Join(info) => {
                if self.phase != SessionPhase::Synchronized {
                    warn!(
                        target: LOG_SYNC,
                        "Dropping join of {} received before snapshot", info.player_id
                    );
                    return Vec::new();
                }
                if self.identity.as_ref() == Some(&info.player_id) {
                    warn!(target: LOG_SYNC, "Dropping join for own identity {}", info.player_id);
                    return Vec::new();
                }
                vec![self.registry.on_join(info)]
            }
            SessionEvent::Leave(identity) => {
                if self.identity.as_ref() == Some(&identity) {
                    debug!(target: LOG_SYNC, "Ignoring leave for own identity {}", identity);
                    return Vec::new();
                }
                self.registry.on_leave(&identity).into_iter().collect()
            }
        }
    }

    /// Applies one transport event: binds the identity on connect, decodes
    /// gameplay payloads and resets on disconnect.
    pub fn handle_client_event(&mut self, event: ClientEvent) -> Vec<SessionChange> {
        match event {
            ClientEvent::Connected { client_id } => self.bind_identity(client_id),
            ClientEvent::Message { channel, payload } => {
                if channel != GAMEPLAY_CHANNEL {
                    debug!(target: LOG_SYNC, "Ignoring message on channel {}", channel);
                    return Vec::new();
                }
                match ServerMessage::decode(&payload) {
                    Ok(message) => {
                        debug!(target: LOG_SYNC, "Received {}", message.name());
                        self.handle_event(message.into())
                    }
                    Err(err) => {
                        warn!(
                            target: LOG_SYNC,
                            "Dropping undecodable payload ({} bytes): {}", payload.len(), err
                        );
                        Vec::new()
                    }
                }
            }
            ClientEvent::Disconnected { reason } => {
                info!(target: LOG_SYNC, "Disconnected: {:?}", reason);
                self.reset()
            }
            ClientEvent::Error { error } => {
                warn!(target: LOG_SYNC, "Transport error: {}", error);
                Vec::new()
            }
        }
    }

    /// Forgets the identity and every player record.
    pub fn reset(&mut self) -> Vec<SessionChange> {
        let mut changes: Vec<SessionChange> = self
            .registry
            .clear()
            .into_iter()
            .map(|identity| SessionChange::RemotePlayerRemoved { identity })
            .collect();
        if let Some(player) = self.controller.despawn() {
            changes.push(SessionChange::LocalPlayerDespawned {
                identity: player.identity,
            });
        }
        self.identity = None;
        self.phase = SessionPhase::AwaitingIdentity;
        changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn session(identity: &str) -> SyncSession {
        let mut session = SyncSession::new(
            RemotePlayerRegistry::with_rng(StdRng::seed_from_u64(0)),
            LocalPlayerController::new(80.0),
        );
        session.bind_identity(identity.into());
        session
    }

    fn snapshot(entries: &[(&str, f32, f32)]) -> SessionEvent {
        SessionEvent::Snapshot(
            entries
                .iter()
                .map(|(id, x, y)| PlayerInfo::new(*id, *x, *y))
                .collect(),
        )
    }

    #[test]
    fn message_maps_to_event() {
        let event: SessionEvent =
            ServerMessage::current_players([PlayerInfo::new("a", 1.0, 1.0)]).into();
        assert_eq!(event, snapshot(&[("a", 1.0, 1.0)]));
        assert_eq!(
            SessionEvent::from(ServerMessage::Disconnect("a".into())),
            SessionEvent::Leave("a".into())
        );
    }

    #[test]
    fn join_before_snapshot_is_dropped() {
        let mut session = session("A");
        let changes = session.handle_event(SessionEvent::Join(PlayerInfo::new("B", 0.0, 0.0)));
        assert!(changes.is_empty());
        assert!(session.registry().is_empty());
    }

    #[test]
    fn snapshot_before_identity_is_dropped() {
        let mut session = SyncSession::new(
            RemotePlayerRegistry::new(),
            LocalPlayerController::new(80.0),
        );
        assert!(session.handle_event(snapshot(&[("B", 0.0, 0.0)])).is_empty());
        assert_eq!(session.phase(), SessionPhase::AwaitingIdentity);
        assert!(session.registry().is_empty());
    }

    #[test]
    fn second_snapshot_is_dropped() {
        let mut session = session("A");
        session.handle_event(snapshot(&[("A", 0.0, 0.0), ("B", 0.0, 0.0)]));
        let changes = session.handle_event(snapshot(&[("C", 0.0, 0.0)]));

        assert!(changes.is_empty());
        assert_eq!(session.registry().len(), 1);
        assert!(session.registry().contains(&"B".into()));
    }

    #[test]
    fn own_identity_never_becomes_remote() {
        let mut session = session("A");
        session.handle_event(snapshot(&[("A", 0.0, 0.0)]));

        assert!(session
            .handle_event(SessionEvent::Join(PlayerInfo::new("A", 9.0, 9.0)))
            .is_empty());
        assert!(session.handle_event(SessionEvent::Leave("A".into())).is_empty());
        assert!(session.registry().is_empty());
        assert!(session.controller().is_spawned());
    }

    #[test]
    fn reset_reports_every_removal() {
        let mut session = session("A");
        session.handle_event(snapshot(&[("A", 0.0, 0.0), ("B", 0.0, 0.0), ("C", 0.0, 0.0)]));

        let changes = session.reset();
        assert_eq!(
            changes,
            vec![
                SessionChange::RemotePlayerRemoved { identity: "B".into() },
                SessionChange::RemotePlayerRemoved { identity: "C".into() },
                SessionChange::LocalPlayerDespawned { identity: "A".into() },
            ]
        );
        assert_eq!(session.identity(), None);
        assert_eq!(session.phase(), SessionPhase::AwaitingIdentity);
    }

    #[test]
    fn transport_errors_leave_state_intact() {
        let mut session = session("A");
        session.handle_event(snapshot(&[("A", 0.0, 0.0), ("B", 0.0, 0.0)]));

        let changes = session.handle_client_event(ClientEvent::Error {
            error: shared::TransportError::Other("socket hiccup".into()),
        });
        assert!(changes.is_empty());
        assert_eq!(session.registry().len(), 1);
        assert_eq!(session.phase(), SessionPhase::Synchronized);
    }

    #[test]
    fn other_channels_are_ignored() {
        let mut session = session("A");
        let payload = ServerMessage::current_players([PlayerInfo::new("B", 0.0, 0.0)])
            .encode()
            .unwrap();
        let changes = session.handle_client_event(ClientEvent::Message {
            channel: GAMEPLAY_CHANNEL + 1,
            payload,
        });
        assert!(changes.is_empty());
        assert_eq!(session.phase(), SessionPhase::AwaitingSnapshot);
    }
}
