//! Client-side core of the multiplayer world.
//!
//! Keeps the view of remote players in step with the peer, steers the local
//! player from keyboard input and places the world's static entities without
//! overlap. [`WorldClientPlugin`] wires all of it into a Bevy app.

pub mod bounds;
pub mod config;
pub mod controller;
pub mod error;
pub mod placement;
pub mod plugin;
pub mod registry;
pub mod session;

pub use bounds::WorldBounds;
pub use config::{PlayerSettings, WorldSettings, load_settings};
pub use controller::{
    Animation, ControllerOutput, Direction, InputState, LocalPlayer, LocalPlayerController, steer,
};
pub use error::{ClientError, PlacementError};
pub use placement::{BoxSize, EntityKind, EntitySpawn, place_entities};
pub use plugin::{ClientSets, SessionChanged, SessionTransport, WorldClientPlugin, WorldSpawns};
pub use registry::{RemotePlayer, RemotePlayerRegistry};
pub use session::{SessionChange, SessionEvent, SessionPhase, SyncSession};
