//! Arena: the battlefield grid plus every unit standing on it.
//!
//! The Arena is the container handed to the orchestrator. It provides:
//! - Unit storage with deterministic iteration order (`BTreeMap`)
//! - The battlefield [`Grid`] with its coordinate transform
//! - Unit spawning (deployment) that keeps tile occupancy in step
//!
//! # Occupancy
//!
//! Spawning marks the unit's tile as occupied. After that, occupancy is only
//! changed by the orchestrator while executing actions. Edits made through
//! [`Arena::get_mut`] or [`Arena::grid_mut`] before the encounter starts are
//! checked by [`CombatOrchestrator::initialize`].
//!
//! # Example
//!
//! ```
//! use skirmish_core::arena::Arena;
//! use skirmish_core::entity::{TeamTag, UnitProfile};
//! use tessera::{Grid, GridPosition};
//!
//! let mut arena = Arena::new(Grid::new(5, 5, 32).unwrap());
//! let knight = arena.spawn_at(
//!     UnitProfile::new("Knight", TeamTag::player()),
//!     GridPosition::new(1, 2),
//! );
//!
//! assert_eq!(arena.grid_position(knight), Some(GridPosition::new(1, 2)));
//! assert_eq!(arena.unit_at(GridPosition::new(1, 2)).map(|u| u.id()), Some(knight));
//! ```
//!
//! [`CombatOrchestrator::initialize`]: crate::orchestrator::CombatOrchestrator::initialize

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tessera::{Grid, GridPosition};

use crate::entity::{TeamTag, Unit, UnitId, UnitProfile};

/// Battlefield container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    /// Monotonically increasing unit ID counter.
    next_id: u64,
    /// Unit storage with deterministic iteration order.
    units: BTreeMap<UnitId, Unit>,
    /// Terrain and occupancy.
    grid: Grid,
}

impl Arena {
    /// Creates an arena over `grid` with no units.
    #[must_use]
    pub fn new(grid: Grid) -> Self {
        Self {
            next_id: 0,
            units: BTreeMap::new(),
            grid,
        }
    }

    /// Spawns a unit at the world position stored in its profile.
    ///
    /// The unit receives the next id and, if its position falls inside the
    /// grid, its tile is marked occupied. Units placed outside the grid are
    /// kept but will be rejected when the encounter starts.
    pub fn spawn(&mut self, profile: UnitProfile) -> UnitId {
        let id = UnitId::new(self.next_id);
        self.next_id += 1;

        let unit = profile.into_unit(id);
        let cell = self.grid.transform().world_to_grid(unit.position);
        if self.grid.set_occupied(cell, Some(id.into())).is_err() {
            tracing::warn!(unit = %id, %cell, "spawned outside the grid");
        }

        self.units.insert(id, unit);
        id
    }

    /// Spawns a unit on a grid cell, overriding the profile's world position
    /// with the cell's world coordinates.
    pub fn spawn_at(&mut self, profile: UnitProfile, cell: GridPosition) -> UnitId {
        let position = self.grid.transform().grid_to_world(cell);
        self.spawn(profile.at(position))
    }

    /// Returns a unit by id.
    #[must_use]
    pub fn get(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(&id)
    }

    /// Returns a mutable unit by id.
    #[must_use]
    pub fn get_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.get_mut(&id)
    }

    /// Unit ids in ascending order.
    pub fn unit_ids_sorted(&self) -> impl Iterator<Item = UnitId> + '_ {
        self.units.keys().copied()
    }

    /// Units in ascending id order.
    pub fn units_sorted(&self) -> impl Iterator<Item = &Unit> + '_ {
        self.units.values()
    }

    /// Mutable units in ascending id order.
    pub fn units_sorted_mut(&mut self) -> impl Iterator<Item = &mut Unit> + '_ {
        self.units.values_mut()
    }

    /// Living members of a team, in id order.
    pub fn living_members<'a>(&'a self, team: &'a TeamTag) -> impl Iterator<Item = &'a Unit> + 'a {
        self.units
            .values()
            .filter(move |u| u.is_alive() && u.team() == Some(team))
    }

    /// Number of units.
    #[must_use]
    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    /// True if no units have been spawned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// The battlefield grid.
    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Mutable access to the grid for setup.
    #[must_use]
    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    /// Grid cell a unit stands on, derived from its world position.
    #[must_use]
    pub fn grid_position(&self, id: UnitId) -> Option<GridPosition> {
        self.get(id)
            .map(|u| self.grid.transform().world_to_grid(u.position))
    }

    /// The unit recorded as occupying `pos`.
    #[must_use]
    pub fn unit_at(&self, pos: GridPosition) -> Option<&Unit> {
        self.grid
            .tile_at(pos)
            .and_then(|tile| tile.occupant())
            .and_then(|occupant| self.get(occupant.into()))
    }
}
