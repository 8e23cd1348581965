use app::{AppBuilder, Application, BoxError, LOG_CLIENT};
use bevy::input::InputPlugin;
use bevy::prelude::*;
use shared::transport::{LoopbackPair, LoopbackServerTransport};
use shared::{ClientTransport, PlayerInfo, ServerMessage};
use tracing::info;
use world_client::{
    ClientError, SessionTransport, SyncSession, WorldClientPlugin, WorldSpawns, load_settings,
};

const SETTINGS_FILE: &str = "client.toml";
/// Environment variable naming a directory for an additional log file.
const LOG_DIR_VAR: &str = "WORLD_CLIENT_LOG_DIR";
const DEMO_FRAMES: usize = 120;

struct WorldClient;

impl Application for WorldClient {
    const APP_ID: &'static str = "world_client";
}

/// Plays the remote peer's side of a short session: a snapshot with this
/// client and one other player, a late joiner, then one of them leaving.
fn script_peer(server: &mut LoopbackServerTransport) -> Result<(), ClientError> {
    let self_id = server.client_id().clone();
    server.send(&ServerMessage::current_players([
        PlayerInfo::new(self_id, 120.0, 96.0),
        PlayerInfo::new("wanderer", 300.0, 200.0),
    ]))?;
    server.send(&ServerMessage::NewPlayer(PlayerInfo::new(
        "latecomer",
        48.0,
        400.0,
    )))?;
    server.send(&ServerMessage::Disconnect("wanderer".into()))?;
    Ok(())
}

fn main() -> Result<(), BoxError> {
    let version = env!("CARGO_PKG_VERSION");
    let builder = match std::env::var_os(LOG_DIR_VAR) {
        Some(dir) => AppBuilder::<WorldClient>::with_log_dir(version, dir)?,
        None => AppBuilder::<WorldClient>::new(version)?,
    };
    let (world, player) = load_settings(SETTINGS_FILE)?;

    let LoopbackPair {
        mut client,
        mut server,
    } = LoopbackPair::new();
    client.connect()?;
    script_peer(&mut server)?;

    let mut app = builder.build_with_bevy(|mut app, _ctx| {
        app.add_plugins((MinimalPlugins, InputPlugin))
            .add_plugins(WorldClientPlugin::new(world, player))
            .insert_resource(SessionTransport::new(client));
        app
    });
    if let Some(log_file) = app.context().log_file() {
        info!(target: LOG_CLIENT, "Writing log to {}", log_file.display());
    }
    app.run_frames(DEMO_FRAMES);

    let world = app.world();
    let session = world.resource::<SyncSession>();
    let spawns = world.resource::<WorldSpawns>();
    let connected = world.resource::<SessionTransport>().get().is_connected();
    info!(
        target: LOG_CLIENT,
        "{} v{} after {} frames: session {:?} (connected: {}), {} remote players, local player {:?}, {} world entities",
        app.context().app_id(),
        app.context().version(),
        DEMO_FRAMES,
        session.phase(),
        connected,
        session.registry().len(),
        session.controller().player().map(|player| &player.identity),
        spawns.0.len()
    );
    Ok(())
}
