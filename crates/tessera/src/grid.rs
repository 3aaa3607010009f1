//! The battlefield grid.
//!
//! A [`Grid`] owns one [`Tile`] for every in-bounds position and nothing
//! else: lookups outside the rectangle return `None` and never create tiles.
//!
//! # Occupancy
//!
//! [`Grid::set_occupied`] is an unconditional write. The grid does not enforce
//! that a unit appears on only one tile; callers moving a unit clear the old
//! tile before setting the new one.

use std::collections::{BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tile::{OccupantId, Terrain, Tile};
use crate::transform::CoordinateTransform;
use crate::GridPosition;

/// Orthogonal step offsets in neighbour order: up, right, down, left.
const ORTHOGONAL: [(i32, i32); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];

/// Errors raised by grid construction and mutation.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum GridError {
    /// Width or height was zero, or too large to index.
    #[error("invalid grid dimensions {width}x{height}")]
    InvalidDimensions {
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
    },

    /// Tile size was zero.
    #[error("tile size must be positive")]
    InvalidTileSize,

    /// Position lies outside the grid.
    #[error("position {0} is outside the grid")]
    OutOfBounds(GridPosition),

    /// Stored tiles do not cover the grid rectangle exactly.
    #[error("grid expects {expected} tiles but {found} were supplied")]
    TileCountMismatch {
        /// `width * height`
        expected: usize,
        /// Tiles actually present
        found: usize,
    },
}

/// Fixed-size rectangle of tiles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GridData")]
pub struct Grid {
    width: u32,
    height: u32,
    transform: CoordinateTransform,
    /// Row-major tile storage, `width * height` entries.
    tiles: Vec<Tile>,
}

/// Unchecked wire form of [`Grid`].
#[derive(Deserialize)]
struct GridData {
    width: u32,
    height: u32,
    transform: CoordinateTransform,
    tiles: Vec<Tile>,
}

impl TryFrom<GridData> for Grid {
    type Error = GridError;

    fn try_from(data: GridData) -> Result<Self, Self::Error> {
        if data.transform.tile_size() == 0 {
            return Err(GridError::InvalidTileSize);
        }
        let mut grid = Self::with_transform(data.width, data.height, data.transform)?;
        if data.tiles.len() != grid.tiles.len() {
            return Err(GridError::TileCountMismatch {
                expected: grid.tiles.len(),
                found: data.tiles.len(),
            });
        }
        grid.tiles = data.tiles;
        Ok(grid)
    }
}

impl Grid {
    /// Create an all-floor grid with the given tile size and no world offset.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidDimensions`] for a zero or oversized side
    /// and [`GridError::InvalidTileSize`] for a zero tile size.
    pub fn new(width: u32, height: u32, tile_size: u32) -> Result<Self, GridError> {
        if tile_size == 0 {
            return Err(GridError::InvalidTileSize);
        }
        Self::with_transform(
            width,
            height,
            CoordinateTransform::new(tile_size, glam::Vec2::ZERO),
        )
    }

    /// Create an all-floor grid using an existing coordinate transform.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidDimensions`] for a zero or oversized side.
    pub fn with_transform(
        width: u32,
        height: u32,
        transform: CoordinateTransform,
    ) -> Result<Self, GridError> {
        if width == 0 || height == 0 || i32::try_from(width).is_err() || i32::try_from(height).is_err()
        {
            return Err(GridError::InvalidDimensions { width, height });
        }
        let count = width as usize * height as usize;
        Ok(Self {
            width,
            height,
            transform,
            tiles: vec![Tile::default(); count],
        })
    }

    /// Number of columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// The grid's world-space mapping.
    #[must_use]
    pub const fn transform(&self) -> &CoordinateTransform {
        &self.transform
    }

    /// Whether a position lies inside the grid.
    #[must_use]
    pub fn contains(&self, pos: GridPosition) -> bool {
        self.index(pos).is_some()
    }

    #[allow(clippy::cast_sign_loss)]
    fn index(&self, pos: GridPosition) -> Option<usize> {
        let in_x = pos.x >= 0 && (pos.x as u32) < self.width;
        let in_y = pos.y >= 0 && (pos.y as u32) < self.height;
        (in_x && in_y).then(|| pos.y as usize * self.width as usize + pos.x as usize)
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    fn position_of(&self, index: usize) -> GridPosition {
        let width = self.width as usize;
        GridPosition::new((index % width) as i32, (index / width) as i32)
    }

    /// The tile at `pos`, or `None` outside the grid.
    #[must_use]
    pub fn tile_at(&self, pos: GridPosition) -> Option<&Tile> {
        self.index(pos).map(|i| &self.tiles[i])
    }

    fn tile_at_mut(&mut self, pos: GridPosition) -> Result<&mut Tile, GridError> {
        match self.index(pos) {
            Some(i) => Ok(&mut self.tiles[i]),
            None => Err(GridError::OutOfBounds(pos)),
        }
    }

    /// Whether a unit could step onto `pos`: the tile exists, its terrain is
    /// passable, and nobody stands there.
    #[must_use]
    pub fn is_passable(&self, pos: GridPosition) -> bool {
        self.tile_at(pos).is_some_and(Tile::is_open)
    }

    /// Overwrite the occupant of a tile. `None` clears it.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OutOfBounds`] if `pos` is outside the grid.
    pub fn set_occupied(
        &mut self,
        pos: GridPosition,
        occupant: Option<OccupantId>,
    ) -> Result<(), GridError> {
        self.tile_at_mut(pos)?.set_occupant(occupant);
        tracing::trace!(%pos, ?occupant, "tile occupancy set");
        Ok(())
    }

    /// Change the terrain of a tile.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OutOfBounds`] if `pos` is outside the grid.
    pub fn set_terrain(&mut self, pos: GridPosition, terrain: Terrain) -> Result<(), GridError> {
        self.tile_at_mut(pos)?.set_terrain(terrain);
        Ok(())
    }

    /// Manhattan distance between two positions.
    #[must_use]
    pub const fn distance(&self, a: GridPosition, b: GridPosition) -> u32 {
        a.manhattan(b)
    }

    /// The up-to-four orthogonally adjacent in-bounds positions, in the order
    /// up, right, down, left.
    #[must_use]
    pub fn neighbors(&self, pos: GridPosition) -> Vec<GridPosition> {
        ORTHOGONAL
            .iter()
            .filter_map(|&(dx, dy)| pos.offset(dx, dy))
            .filter(|&p| self.contains(p))
            .collect()
    }

    /// Positions reachable from `from` in at most `move_range` orthogonal
    /// steps through passable tiles.
    ///
    /// The origin itself is excluded and is expanded regardless of its own
    /// occupancy (the mover usually stands there). Each position is visited
    /// at most once.
    #[must_use]
    pub fn reachable_within(&self, from: GridPosition, move_range: u32) -> BTreeSet<GridPosition> {
        let mut reachable = BTreeSet::new();
        if !self.contains(from) || move_range == 0 {
            return reachable;
        }

        let mut visited = BTreeSet::from([from]);
        let mut frontier = VecDeque::from([(from, 0u32)]);

        while let Some((pos, steps)) = frontier.pop_front() {
            if steps >= move_range {
                continue;
            }
            for next in self.neighbors(pos) {
                if !visited.insert(next) || !self.is_passable(next) {
                    continue;
                }
                reachable.insert(next);
                frontier.push_back((next, steps + 1));
            }
        }

        reachable
    }

    /// Iterate over every tile with its position, row by row.
    pub fn tiles(&self) -> impl Iterator<Item = (GridPosition, &Tile)> + '_ {
        self.tiles
            .iter()
            .enumerate()
            .map(|(i, tile)| (self.position_of(i), tile))
    }

    /// Position of the tile holding `occupant`, if any.
    #[must_use]
    pub fn find_occupant(&self, occupant: OccupantId) -> Option<GridPosition> {
        self.tiles()
            .find(|(_, tile)| tile.occupant() == Some(occupant))
            .map(|(pos, _)| pos)
    }

    /// Number of occupied tiles.
    #[must_use]
    pub fn occupied_count(&self) -> usize {
        self.tiles.iter().filter(|t| t.is_occupied()).count()
    }
}
