//! Tiles: terrain plus single-unit occupancy.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of the unit standing on a tile.
///
/// Tessera does not know what a unit is; the combat layer converts its own
/// unit ids into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OccupantId(u64);

impl OccupantId {
    /// Wrap a raw id.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Raw id value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for OccupantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of ground a tile is made of.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Terrain {
    /// Open floor
    #[default]
    Floor,
    /// Grass, walkable
    Grass,
    /// Broken ground, walkable
    Rubble,
    /// Solid wall
    Wall,
    /// Deep water
    Water,
}

impl Terrain {
    /// Whether units can stand on this terrain at all.
    #[must_use]
    pub const fn is_passable(self) -> bool {
        matches!(self, Self::Floor | Self::Grass | Self::Rubble)
    }
}

impl fmt::Display for Terrain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Floor => write!(f, "floor"),
            Self::Grass => write!(f, "grass"),
            Self::Rubble => write!(f, "rubble"),
            Self::Wall => write!(f, "wall"),
            Self::Water => write!(f, "water"),
        }
    }
}

/// A single grid cell.
///
/// `passable` is a static property derived from the terrain. Occupancy is
/// stored as an optional occupant, so "occupied" and "has an occupant id"
/// cannot disagree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tile {
    terrain: Terrain,
    passable: bool,
    occupant: Option<OccupantId>,
}

impl Tile {
    /// Create an unoccupied tile of the given terrain.
    #[must_use]
    pub const fn new(terrain: Terrain) -> Self {
        Self {
            terrain,
            passable: terrain.is_passable(),
            occupant: None,
        }
    }

    /// Terrain kind.
    #[must_use]
    pub const fn terrain(&self) -> Terrain {
        self.terrain
    }

    /// Whether the terrain allows standing here (ignores occupancy).
    #[must_use]
    pub const fn is_terrain_passable(&self) -> bool {
        self.passable
    }

    /// Whether a unit stands here.
    #[must_use]
    pub const fn is_occupied(&self) -> bool {
        self.occupant.is_some()
    }

    /// The unit standing here, if any.
    #[must_use]
    pub const fn occupant(&self) -> Option<OccupantId> {
        self.occupant
    }

    /// Walkable terrain and nobody standing on it.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.passable && self.occupant.is_none()
    }

    pub(crate) fn set_terrain(&mut self, terrain: Terrain) {
        self.terrain = terrain;
        self.passable = terrain.is_passable();
    }

    pub(crate) fn set_occupant(&mut self, occupant: Option<OccupantId>) {
        self.occupant = occupant;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tile_is_open_floor() {
        let tile = Tile::default();
        assert_eq!(tile.terrain(), Terrain::Floor);
        assert!(tile.is_terrain_passable());
        assert!(!tile.is_occupied());
        assert!(tile.is_open());
    }

    #[test]
    fn wall_is_not_passable() {
        let tile = Tile::new(Terrain::Wall);
        assert!(!tile.is_terrain_passable());
        assert!(!tile.is_open());
    }

    #[test]
    fn occupant_drives_occupied_flag() {
        let mut tile = Tile::new(Terrain::Grass);
        tile.set_occupant(Some(OccupantId::new(7)));
        assert!(tile.is_occupied());
        assert_eq!(tile.occupant(), Some(OccupantId::new(7)));
        assert!(!tile.is_open());

        tile.set_occupant(None);
        assert!(!tile.is_occupied());
        assert!(tile.is_open());
    }

    #[test]
    fn retyping_terrain_updates_passability() {
        let mut tile = Tile::default();
        tile.set_terrain(Terrain::Water);
        assert!(!tile.is_terrain_passable());
        tile.set_terrain(Terrain::Rubble);
        assert!(tile.is_terrain_passable());
    }
}
