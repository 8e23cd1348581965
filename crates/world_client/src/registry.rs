//! Visual records of every other player in the session.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shared::{PlayerId, PlayerInfo};
use tracing::{debug, info, warn};

use app::LOG_SYNC;

use crate::controller::LocalPlayerController;
use crate::session::SessionChange;

/// One remote peer as drawn by the client.
#[derive(Debug, Clone, PartialEq)]
pub struct RemotePlayer {
    pub identity: PlayerId,
    pub position: Vec2,
    /// Cosmetic only.
    pub tint: Color,
}

/// Remote players keyed by identity.
///
/// Only the session writes to the registry; renderers read it through
/// [`iter`](Self::iter).
#[derive(Debug)]
pub struct RemotePlayerRegistry {
    players: BTreeMap<PlayerId, RemotePlayer>,
    rng: StdRng,
}

impl Default for RemotePlayerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RemotePlayerRegistry {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Registry whose tints come from `rng`.
    pub fn with_rng(rng: StdRng) -> Self {
        Self {
            players: BTreeMap::new(),
            rng,
        }
    }

    /// Splits a snapshot: the entry for `self_identity` goes to the
    /// controller, every other entry becomes a remote player.
    pub fn on_snapshot(
        &mut self,
        players: Vec<PlayerInfo>,
        self_identity: &PlayerId,
        controller: &mut LocalPlayerController,
    ) -> Vec<SessionChange> {
        let mut changes = Vec::with_capacity(players.len());
        for info in players {
            if &info.player_id == self_identity {
                let position = Vec2::new(info.x, info.y);
                if controller.spawn(info.player_id.clone(), position) {
                    changes.push(SessionChange::LocalPlayerSpawned {
                        identity: info.player_id,
                        position,
                    });
                }
            } else {
                changes.push(self.on_join(info));
            }
        }
        changes
    }

    /// Adds a remote player. A record that already exists for the identity
    /// is replaced by a fresh one with a new tint.
    pub fn on_join(&mut self, info: PlayerInfo) -> SessionChange {
        let position = Vec2::new(info.x, info.y);
        let tint = self.random_tint();
        let identity = info.player_id;
        let player = RemotePlayer {
            identity: identity.clone(),
            position,
            tint,
        };

        match self.players.entry(identity.clone()) {
            Entry::Occupied(mut entry) => {
                warn!(
                    target: LOG_SYNC,
                    "Player {} joined twice, replacing previous record", identity
                );
                entry.insert(player);
                SessionChange::RemotePlayerReplaced { identity, position }
            }
            Entry::Vacant(entry) => {
                info!(
                    target: LOG_SYNC,
                    "Player {} joined at ({}, {})", identity, position.x, position.y
                );
                entry.insert(player);
                SessionChange::RemotePlayerAdded { identity, position }
            }
        }
    }

    /// Removes the player if present; unknown identities are ignored.
    pub fn on_leave(&mut self, identity: &PlayerId) -> Option<SessionChange> {
        match self.players.remove(identity) {
            Some(player) => {
                info!(target: LOG_SYNC, "Player {} left", identity);
                Some(SessionChange::RemotePlayerRemoved {
                    identity: player.identity,
                })
            }
            None => {
                debug!(target: LOG_SYNC, "Ignoring leave of unknown player {}", identity);
                None
            }
        }
    }

    pub fn get(&self, identity: &PlayerId) -> Option<&RemotePlayer> {
        self.players.get(identity)
    }

    pub fn contains(&self, identity: &PlayerId) -> bool {
        self.players.contains_key(identity)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RemotePlayer> {
        self.players.values()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Drops every record, returning their identities in order.
    pub fn clear(&mut self) -> Vec<PlayerId> {
        std::mem::take(&mut self.players).into_keys().collect()
    }

    fn random_tint(&mut self) -> Color {
        let rgb: u32 = self.rng.gen_range(0..=0x00FF_FFFF);
        Color::srgb_u8((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
    }
}
