//! User-tunable client settings, read from the `[world]` and `[player]`
//! tables of the settings file.

use std::path::Path;

use bevy::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use settings::{Settings, SettingsStore};

use crate::bounds::WorldBounds;
use crate::error::ClientError;
use crate::placement::BoxSize;

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldSettings {
    pub width: f32,
    pub height: f32,
    /// Number of static entities placed at startup.
    pub spawn_count: usize,
    pub spawn_width: f32,
    pub spawn_height: f32,
    /// Candidate draws allowed for the whole placement run.
    pub max_placement_attempts: usize,
    /// Fixed seed for reproducible layouts.
    pub seed: Option<u64>,
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            width: 640.0,
            height: 480.0,
            spawn_count: 20,
            spawn_width: 16.0,
            spawn_height: 16.0,
            max_placement_attempts: 10_000,
            seed: None,
        }
    }
}

impl Settings for WorldSettings {
    const SECTION: &'static str = "world";
}

impl WorldSettings {
    pub fn bounds(&self) -> WorldBounds {
        WorldBounds::new(self.width, self.height)
    }

    pub fn spawn_box(&self) -> BoxSize {
        BoxSize::new(self.spawn_width, self.spawn_height)
    }

    pub fn rng(&self) -> StdRng {
        self.seed
            .map(StdRng::seed_from_u64)
            .unwrap_or_else(StdRng::from_entropy)
    }
}

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSettings {
    /// Units per second along each held axis.
    pub speed: f32,
    /// Edge length of the square player body, used for world clamping.
    pub body_size: f32,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            speed: 80.0,
            body_size: 16.0,
        }
    }
}

impl Settings for PlayerSettings {
    const SECTION: &'static str = "player";
}

/// Loads both sections from `path`; a missing file yields the defaults.
pub fn load_settings(path: impl AsRef<Path>) -> Result<(WorldSettings, PlayerSettings), ClientError> {
    let mut store = SettingsStore::builder()
        .with_settings_file(path.as_ref())
        .build()?;
    Ok((store.load()?, store.load()?))
}
