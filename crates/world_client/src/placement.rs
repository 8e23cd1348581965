//! Random, non-overlapping placement of the world's static entities.
//!
//! Candidates are drawn uniformly inside the world bounds and rejected when
//! their box intersects any box placed before them. The attempt budget is
//! shared by the whole call, so a crowded world fails instead of looping.

use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumCount, EnumIter, IntoEnumIterator};
use tracing::debug;

use app::LOG_WORLD;

use crate::bounds::WorldBounds;
use crate::error::PlacementError;

/// Kind of a static world entity. The kind only selects the visual asset;
/// `as_ref()` yields the asset key (`"golem"`, `"ent"`, ...).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    AsRefStr,
    EnumCount,
    EnumIter,
)]
#[strum(serialize_all = "lowercase")]
pub enum EntityKind {
    Golem,
    Ent,
    Demon,
    Worm,
    Wolf,
}

impl EntityKind {
    /// Uniform choice over all kinds.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let index = rng.gen_range(0..Self::COUNT);
        Self::iter().nth(index).unwrap_or(EntityKind::Golem)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxSize {
    pub width: f32,
    pub height: f32,
}

impl BoxSize {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    fn is_degenerate(&self) -> bool {
        !(self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0)
    }
}

/// A placed entity: the half-open box `[x, x + width) x [y, y + height)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EntitySpawn {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub kind: EntityKind,
}

impl EntitySpawn {
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x
            && point.x < self.x + self.width
            && point.y >= self.y
            && point.y < self.y + self.height
    }

    pub fn intersects(&self, other: &EntitySpawn) -> bool {
        self.overlaps_box(other.x, other.y, BoxSize::new(other.width, other.height))
    }

    fn overlaps_box(&self, x: f32, y: f32, size: BoxSize) -> bool {
        x < self.x + self.width
            && self.x < x + size.width
            && y < self.y + self.height
            && self.y < y + size.height
    }
}

/// Places `count` boxes of `box_size` inside `bounds` without overlap.
///
/// `max_attempts` caps the total number of candidate draws. Hitting the cap
/// fails the whole call with [`PlacementError::Exhausted`].
pub fn place_entities<R, F>(
    count: usize,
    box_size: BoxSize,
    bounds: WorldBounds,
    max_attempts: usize,
    rng: &mut R,
    mut kind_selector: F,
) -> Result<Vec<EntitySpawn>, PlacementError>
where
    R: Rng + ?Sized,
    F: FnMut(&mut R) -> EntityKind,
{
    if bounds.is_degenerate() {
        return Err(PlacementError::InvalidBounds {
            width: bounds.width,
            height: bounds.height,
        });
    }
    if box_size.is_degenerate() {
        return Err(PlacementError::InvalidBoxSize {
            width: box_size.width,
            height: box_size.height,
        });
    }

    let mut placed: Vec<EntitySpawn> = Vec::with_capacity(count);
    let mut attempts = 0;

    while placed.len() < count {
        if attempts == max_attempts {
            return Err(PlacementError::Exhausted {
                placed: placed.len(),
                requested: count,
                attempts,
            });
        }
        attempts += 1;

        let x = rng.gen_range(0.0..bounds.width);
        let y = rng.gen_range(0.0..bounds.height);
        if placed.iter().any(|spawn| spawn.overlaps_box(x, y, box_size)) {
            continue;
        }

        let kind = kind_selector(rng);
        placed.push(EntitySpawn {
            x,
            y,
            width: box_size.width,
            height: box_size.height,
            kind,
        });
    }

    debug!(
        target: LOG_WORLD,
        "Placed {} entities in {} attempts",
        placed.len(),
        attempts
    );
    Ok(placed)
}
