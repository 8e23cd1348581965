use bevy::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use shared::{ClientEvent, ClientTransport};
use tracing::{error, info};

use app::LOG_WORLD;

use crate::bounds::WorldBounds;
use crate::config::{PlayerSettings, WorldSettings};
use crate::controller::{InputState, LocalPlayerController};
use crate::placement::{EntityKind, EntitySpawn, place_entities};
use crate::registry::RemotePlayerRegistry;
use crate::session::{SessionChange, SyncSession};

#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum ClientSets {
    Receive,
    InputHandling,
    Movement,
}

/// Connection to the remote peer, drained once per frame.
#[derive(Resource)]
pub struct SessionTransport(Box<dyn ClientTransport>);

impl SessionTransport {
    pub fn new(transport: impl ClientTransport) -> Self {
        Self(Box::new(transport))
    }

    pub fn get(&self) -> &dyn ClientTransport {
        self.0.as_ref()
    }

    pub fn get_mut(&mut self) -> &mut dyn ClientTransport {
        self.0.as_mut()
    }
}

/// Static entities placed when the world starts.
#[derive(Resource, Debug, Default, Clone)]
pub struct WorldSpawns(pub Vec<EntitySpawn>);

/// Mirrors every [`SessionChange`] for renderers and other observers.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct SessionChanged(pub SessionChange);

/// Wires spawn placement, the sync session and local steering into the app.
///
/// Insert a [`SessionTransport`] to start synchronizing; without one the
/// world still seeds its spawns and the session waits for an identity.
#[derive(Default)]
pub struct WorldClientPlugin {
    pub world: WorldSettings,
    pub player: PlayerSettings,
}

impl WorldClientPlugin {
    pub fn new(world: WorldSettings, player: PlayerSettings) -> Self {
        Self { world, player }
    }
}

impl Plugin for WorldClientPlugin {
    fn build(&self, app: &mut App) {
        // Tints use their own stream so they never shift the spawn layout.
        let registry = match self.world.seed {
            Some(seed) => RemotePlayerRegistry::with_rng(StdRng::seed_from_u64(seed.wrapping_add(1))),
            None => RemotePlayerRegistry::new(),
        };

        app.insert_resource(self.world.bounds())
            .insert_resource(self.world.clone())
            .insert_resource(self.player.clone())
            .insert_resource(SyncSession::new(
                registry,
                LocalPlayerController::new(self.player.speed),
            ))
            .init_resource::<WorldSpawns>()
            .add_event::<SessionChanged>()
            .configure_sets(
                Update,
                (
                    ClientSets::Receive,
                    ClientSets::InputHandling,
                    ClientSets::Movement,
                )
                    .chain(),
            )
            .add_systems(Startup, seed_world_spawns)
            .add_systems(
                Update,
                (
                    pump_session_events
                        .in_set(ClientSets::Receive)
                        .run_if(resource_exists::<SessionTransport>),
                    drive_local_player.in_set(ClientSets::InputHandling),
                    advance_local_player.in_set(ClientSets::Movement),
                ),
            );
    }
}

/// Runs placement once; a failed run leaves the world without static entities.
pub fn seed_world_spawns(
    settings: Res<WorldSettings>,
    bounds: Res<WorldBounds>,
    mut spawns: ResMut<WorldSpawns>,
) {
    let mut rng = settings.rng();
    match place_entities(
        settings.spawn_count,
        settings.spawn_box(),
        *bounds,
        settings.max_placement_attempts,
        &mut rng,
        EntityKind::random,
    ) {
        Ok(placed) => {
            info!(target: LOG_WORLD, "Seeded {} world entities", placed.len());
            spawns.0 = placed;
        }
        Err(err) => error!(target: LOG_WORLD, "Spawn placement failed: {}", err),
    }
}

/// Feeds buffered transport events through the session in arrival order.
pub fn pump_session_events(
    mut transport: ResMut<SessionTransport>,
    mut session: ResMut<SyncSession>,
    mut changes: EventWriter<SessionChanged>,
) {
    let mut events: Vec<ClientEvent> = Vec::new();
    transport.get_mut().poll_events(&mut events);

    for event in events {
        for change in session.handle_client_event(event) {
            changes.write(SessionChanged(change));
        }
    }
}

/// Samples the arrow keys into the controller every frame.
pub fn drive_local_player(
    keyboard: Option<Res<ButtonInput<KeyCode>>>,
    mut session: ResMut<SyncSession>,
) {
    // Return early until the local player exists
    if !session.controller().is_spawned() {
        return;
    }

    let input = keyboard
        .map(|keyboard| InputState::from_keyboard(&keyboard))
        .unwrap_or_default();
    session.controller_mut().update(input);
}

pub fn advance_local_player(
    time: Res<Time>,
    bounds: Res<WorldBounds>,
    player_settings: Res<PlayerSettings>,
    mut session: ResMut<SyncSession>,
) {
    if let Some(player) = session.controller_mut().player_mut() {
        player.advance(time.delta_secs(), &bounds, player_settings.body_size);
    }
}
