//! Grid/world coordinate conversion.
//!
//! Every subsystem that places things on the battlefield goes through one
//! [`CoordinateTransform`], so the tile size and world offset live in exactly
//! one place.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::GridPosition;

/// Linear mapping between grid cells and world space.
///
/// `world = grid * tile_size + offset`, and the inverse floors back onto the
/// cell. Because `tile_size` is an integer, converting a grid position to
/// world space and back always returns the original position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoordinateTransform {
    tile_size: u32,
    offset: Vec2,
}

impl CoordinateTransform {
    /// Create a transform with the given tile size and world offset.
    ///
    /// A tile size of zero is promoted to one.
    #[must_use]
    pub fn new(tile_size: u32, offset: Vec2) -> Self {
        Self {
            tile_size: tile_size.max(1),
            offset,
        }
    }

    /// Size of one tile in world units.
    #[must_use]
    pub const fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// World-space position of cell `(0, 0)`.
    #[must_use]
    pub const fn offset(&self) -> Vec2 {
        self.offset
    }

    /// World-space position of a grid cell.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn grid_to_world(&self, pos: GridPosition) -> Vec2 {
        let size = self.tile_size as f32;
        Vec2::new(pos.x as f32 * size, pos.y as f32 * size) + self.offset
    }

    /// Grid cell containing a world-space point.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn world_to_grid(&self, world: Vec2) -> GridPosition {
        let local = (world - self.offset) / self.tile_size as f32;
        GridPosition::new(local.x.floor() as i32, local.y.floor() as i32)
    }
}

impl Default for CoordinateTransform {
    fn default() -> Self {
        Self::new(1, Vec2::ZERO)
    }
}
