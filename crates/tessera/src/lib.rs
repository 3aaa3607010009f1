//! # Tessera
//!
//! Tile grid substrate for tactical combat.
//!
//! Tessera represents a battlefield as a fixed rectangle of tiles keyed by
//! integer coordinates. Each tile carries a terrain kind and at most one
//! occupant. On top of that it provides:
//!
//! - **Coordinate conversion**: a single [`CoordinateTransform`] shared by
//!   everything that maps between grid cells and world space
//! - **Metrics**: Manhattan distance and 4-directional adjacency
//! - **Reachability**: breadth-first flood fill bounded by a movement range
//! - **Map dressing**: a seeded obstacle scatterer for test and demo maps
//!
//! ## Quick Start
//!
//! ```
//! use tessera::{Grid, GridPosition, Terrain};
//!
//! let mut grid = Grid::new(5, 5, 32).unwrap();
//! grid.set_terrain(GridPosition::new(1, 0), Terrain::Wall).unwrap();
//!
//! assert!(!grid.is_passable(GridPosition::new(1, 0)));
//! assert_eq!(grid.distance(GridPosition::new(0, 0), GridPosition::new(2, 3)), 5);
//!
//! let reachable = grid.reachable_within(GridPosition::new(0, 0), 2);
//! assert!(reachable.contains(&GridPosition::new(0, 2)));
//! assert!(!reachable.contains(&GridPosition::new(1, 0)));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod grid;
pub mod scatter;
pub mod tile;
pub mod transform;

// Re-exports for convenience
pub use grid::{Grid, GridError};
pub use scatter::ScatterConfig;
pub use tile::{OccupantId, Terrain, Tile};
pub use transform::CoordinateTransform;

use std::fmt;

use glam::IVec2;
use serde::{Deserialize, Serialize};

/// Integer grid coordinate: `x` is the column, `y` the row.
///
/// Ordering is row-major (`y` first, then `x`) so that sorted collections of
/// positions read like the grid itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPosition {
    /// Column
    pub x: i32,
    /// Row
    pub y: i32,
}

impl GridPosition {
    /// Create a position from column and row.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Offset this position by a delta, or `None` if either axis overflows.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Option<Self> {
        match (self.x.checked_add(dx), self.y.checked_add(dy)) {
            (Some(x), Some(y)) => Some(Self::new(x, y)),
            _ => None,
        }
    }

    /// Manhattan distance to another position, saturating at `u32::MAX`.
    #[must_use]
    pub const fn manhattan(self, other: Self) -> u32 {
        self.x.abs_diff(other.x).saturating_add(self.y.abs_diff(other.y))
    }
}

impl Ord for GridPosition {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.y, self.x).cmp(&(other.y, other.x))
    }
}

impl PartialOrd for GridPosition {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for GridPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(i32, i32)> for GridPosition {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

impl From<IVec2> for GridPosition {
    fn from(v: IVec2) -> Self {
        Self::new(v.x, v.y)
    }
}

impl From<GridPosition> for IVec2 {
    fn from(pos: GridPosition) -> Self {
        IVec2::new(pos.x, pos.y)
    }
}
