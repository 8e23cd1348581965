//! World extents shared by spawn placement and local movement.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Size of the playable world in spatial units (pixels of the tile map).
///
/// Fixed once the world is created; the origin is the top-left corner and
/// `y` grows downwards.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldBounds {
    pub width: f32,
    pub height: f32,
}

impl WorldBounds {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Bounds of a tile map with `columns` x `rows` square tiles.
    pub fn from_tiles(columns: u32, rows: u32, tile_size: f32) -> Self {
        Self::new(columns as f32 * tile_size, rows as f32 * tile_size)
    }

    /// True unless both extents are finite and positive.
    pub fn is_degenerate(&self) -> bool {
        !(self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0)
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= 0.0 && point.y >= 0.0 && point.x < self.width && point.y < self.height
    }

    /// Clamps the top-left corner of a body of size `body` so that the whole
    /// body stays inside the world. Bodies larger than the world are pinned
    /// to the origin.
    pub fn clamp(&self, position: Vec2, body: Vec2) -> Vec2 {
        let max = (Vec2::new(self.width, self.height) - body).max(Vec2::ZERO);
        position.clamp(Vec2::ZERO, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tile_map_size_in_pixels() {
        let bounds = WorldBounds::from_tiles(40, 30, 16.0);
        assert_eq!(bounds, WorldBounds::new(640.0, 480.0));
    }

    #[test]
    fn degenerate_bounds() {
        assert!(WorldBounds::new(0.0, 10.0).is_degenerate());
        assert!(WorldBounds::new(10.0, -1.0).is_degenerate());
        assert!(WorldBounds::new(f32::NAN, 10.0).is_degenerate());
        assert!(WorldBounds::new(f32::INFINITY, 10.0).is_degenerate());
        assert!(!WorldBounds::new(1.0, 1.0).is_degenerate());
    }

    #[test]
    fn clamp_keeps_body_inside() {
        let bounds = WorldBounds::new(100.0, 50.0);
        let body = Vec2::splat(16.0);

        assert_eq!(bounds.clamp(Vec2::new(-5.0, 20.0), body), Vec2::new(0.0, 20.0));
        assert_eq!(bounds.clamp(Vec2::new(99.0, 49.0), body), Vec2::new(84.0, 34.0));
        assert_eq!(
            WorldBounds::new(8.0, 8.0).clamp(Vec2::new(3.0, 3.0), body),
            Vec2::ZERO
        );
    }

    #[test]
    fn contains_is_half_open() {
        let bounds = WorldBounds::new(10.0, 10.0);
        assert!(bounds.contains(Vec2::ZERO));
        assert!(!bounds.contains(Vec2::new(10.0, 5.0)));
    }
}
