//! Runs the plugin in a headless app, driving frames by hand.

use std::time::Duration;

use bevy::prelude::*;
use shared::transport::{LoopbackPair, LoopbackServerTransport};
use shared::{ClientTransport, PlayerInfo, ServerMessage};
use world_client::{
    Animation, Direction, PlayerSettings, SessionChange, SessionChanged, SessionTransport,
    SyncSession, WorldClientPlugin, WorldSettings, WorldSpawns,
};

fn world_settings() -> WorldSettings {
    WorldSettings {
        width: 320.0,
        height: 240.0,
        spawn_count: 12,
        seed: Some(17),
        ..Default::default()
    }
}

fn headless_app(world: WorldSettings) -> App {
    let mut app = App::new();
    app.init_resource::<Time>()
        .init_resource::<ButtonInput<KeyCode>>()
        .add_plugins(WorldClientPlugin::new(world, PlayerSettings::default()));
    app
}

fn connected_app() -> (App, LoopbackServerTransport) {
    let LoopbackPair { mut client, server } = LoopbackPair::with_client_id("A");
    client.connect().unwrap();

    let mut app = headless_app(world_settings());
    app.insert_resource(SessionTransport::new(client));
    (app, server)
}

fn advance_time(app: &mut App, seconds: f32) {
    app.world_mut()
        .resource_mut::<Time>()
        .advance_by(Duration::from_secs_f32(seconds));
}

#[test]
fn test_startup_seeds_spawns_inside_bounds() {
    let mut app = headless_app(world_settings());
    app.update();

    let spawns = &app.world().resource::<WorldSpawns>().0;
    assert_eq!(spawns.len(), 12);
    for spawn in spawns {
        assert!(spawn.x >= 0.0 && spawn.x < 320.0);
        assert!(spawn.y >= 0.0 && spawn.y < 240.0);
    }
}

#[test]
fn test_same_seed_same_world() {
    let mut first = headless_app(world_settings());
    let mut second = headless_app(world_settings());
    first.update();
    second.update();

    assert_eq!(
        first.world().resource::<WorldSpawns>().0,
        second.world().resource::<WorldSpawns>().0
    );
}

#[test]
fn test_failed_placement_leaves_world_empty() {
    let mut app = headless_app(WorldSettings {
        width: 16.0,
        height: 16.0,
        spawn_count: 5,
        max_placement_attempts: 100,
        ..world_settings()
    });
    app.update();
    assert!(app.world().resource::<WorldSpawns>().0.is_empty());
}

#[test]
fn test_transport_events_reach_session_and_observers() {
    let (mut app, mut server) = connected_app();
    server
        .send(&ServerMessage::current_players([
            PlayerInfo::new("A", 100.0, 100.0),
            PlayerInfo::new("B", 50.0, 50.0),
        ]))
        .unwrap();
    app.update();

    let session = app.world().resource::<SyncSession>();
    assert_eq!(session.registry().len(), 1);
    assert!(session.controller().is_spawned());

    let events = app.world().resource::<Events<SessionChanged>>();
    let changes: Vec<SessionChange> = events
        .iter_current_update_events()
        .map(|event| event.0.clone())
        .collect();
    assert_eq!(changes.len(), 2);
    assert!(matches!(changes[0], SessionChange::LocalPlayerSpawned { .. }));
    assert!(matches!(changes[1], SessionChange::RemotePlayerAdded { .. }));
}

#[test]
fn test_arrow_keys_move_local_player() {
    let (mut app, mut server) = connected_app();
    server
        .send(&ServerMessage::current_players([PlayerInfo::new("A", 100.0, 100.0)]))
        .unwrap();
    app.update();

    app.world_mut()
        .resource_mut::<ButtonInput<KeyCode>>()
        .press(KeyCode::ArrowLeft);
    app.world_mut()
        .resource_mut::<ButtonInput<KeyCode>>()
        .press(KeyCode::ArrowUp);
    advance_time(&mut app, 0.5);
    app.update();

    let session = app.world().resource::<SyncSession>();
    let player = session.controller().player().unwrap();
    assert_eq!(player.animation, Animation::Walk(Direction::Left));
    assert_eq!(player.velocity, Vec2::new(-80.0, -80.0));
    assert_eq!(player.position, Vec2::new(60.0, 60.0));
    assert!(player.flipped);
}

#[test]
fn test_local_player_stays_inside_world() {
    let (mut app, mut server) = connected_app();
    server
        .send(&ServerMessage::current_players([PlayerInfo::new("A", 10.0, 10.0)]))
        .unwrap();
    app.update();

    app.world_mut()
        .resource_mut::<ButtonInput<KeyCode>>()
        .press(KeyCode::ArrowLeft);
    advance_time(&mut app, 5.0);
    app.update();

    let session = app.world().resource::<SyncSession>();
    assert_eq!(
        session.controller().player().unwrap().position,
        Vec2::new(0.0, 10.0)
    );
}

#[test]
fn test_app_without_transport_waits_for_identity() {
    let mut app = headless_app(world_settings());
    app.update();
    app.update();

    let session = app.world().resource::<SyncSession>();
    assert!(session.identity().is_none());
    assert!(!session.controller().is_spawned());
}
