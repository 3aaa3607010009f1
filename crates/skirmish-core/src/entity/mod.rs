//! Units taking part in an encounter.
//!
//! This module provides the participant types:
//! - [`UnitId`]: Unique identifier for units
//! - [`TeamTag`]: Team affiliation used for grouping and hostility
//! - [`UnitProfile`]: Caller-supplied description used to spawn a unit
//! - [`Unit`]: The complete unit, including combat components once attached
//!
//! # Example
//!
//! ```
//! use skirmish_core::entity::{TeamTag, UnitId, UnitProfile};
//! use glam::Vec2;
//!
//! let unit = UnitProfile::new("Ser Aldric", TeamTag::player())
//!     .at(Vec2::new(64.0, 32.0))
//!     .into_unit(UnitId::new(1));
//!
//! assert_eq!(unit.id().as_u64(), 1);
//! assert!(unit.is_alive());
//! assert!(!unit.can_act()); // no combat state until the encounter starts
//! ```

pub mod components;

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use tessera::OccupantId;

pub use components::{
    ActionPoints, CombatState, MovementBudget, StatusFlags, UnitRole, UnitStats,
};

/// Unique identifier for a unit.
///
/// Ordered by numeric value, which is also spawn order.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UnitId(u64);

impl UnitId {
    /// Creates a new `UnitId` from a raw value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UnitId({})", self.0)
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<UnitId> for OccupantId {
    fn from(id: UnitId) -> Self {
        OccupantId::new(id.0)
    }
}

impl From<OccupantId> for UnitId {
    fn from(id: OccupantId) -> Self {
        Self(id.as_u64())
    }
}

/// Team affiliation.
///
/// Only a label: units sharing a tag are allies, everyone else is hostile.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamTag(String);

impl TeamTag {
    /// Creates a tag from a name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The conventional player-side tag, `"Player"`.
    #[must_use]
    pub fn player() -> Self {
        Self::new("Player")
    }

    /// The conventional opposing tag, `"Enemy"`.
    #[must_use]
    pub fn enemy() -> Self {
        Self::new("Enemy")
    }

    /// The tag name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TeamTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TeamTag {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Caller-side description of a unit before it is spawned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitProfile {
    /// Display name
    pub name: String,
    /// Team affiliation; `None` is rejected when the encounter starts
    pub team: Option<TeamTag>,
    /// Combat attributes
    pub stats: UnitStats,
    /// Role, deciding the AP pool
    pub role: UnitRole,
    /// World-space position
    pub position: Vec2,
    /// Optional legacy per-turn movement allowance
    pub movement: Option<MovementBudget>,
}

impl UnitProfile {
    /// Profile with default stats and role at the world origin.
    #[must_use]
    pub fn new(name: impl Into<String>, team: TeamTag) -> Self {
        Self {
            name: name.into(),
            team: Some(team),
            stats: UnitStats::default(),
            role: UnitRole::default(),
            position: Vec2::ZERO,
            movement: None,
        }
    }

    /// Set the world-space position.
    #[must_use]
    pub fn at(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    /// Set the combat attributes.
    #[must_use]
    pub fn with_stats(mut self, stats: UnitStats) -> Self {
        self.stats = stats;
        self
    }

    /// Set the role.
    #[must_use]
    pub fn with_role(mut self, role: UnitRole) -> Self {
        self.role = role;
        self
    }

    /// Give the unit a legacy per-turn movement allowance.
    #[must_use]
    pub fn with_movement(mut self, per_turn: u32) -> Self {
        self.movement = Some(MovementBudget::new(per_turn));
        self
    }

    /// Remove the team tag.
    #[must_use]
    pub fn without_team(mut self) -> Self {
        self.team = None;
        self
    }

    /// Build the unit with the given id.
    #[must_use]
    pub fn into_unit(self, id: UnitId) -> Unit {
        Unit {
            id,
            name: self.name,
            team: self.team,
            stats: self.stats,
            role: self.role,
            position: self.position,
            movement: self.movement,
            action_points: None,
            combat: None,
        }
    }
}

/// A participant in the encounter.
///
/// `action_points` and `combat` are `None` until the orchestrator attaches
/// them; a unit without them can never act.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    id: UnitId,
    /// Display name
    pub name: String,
    /// Team affiliation as supplied by the caller
    pub team: Option<TeamTag>,
    /// Combat attributes
    pub stats: UnitStats,
    /// Role, deciding the AP pool
    pub role: UnitRole,
    /// World-space position
    pub position: Vec2,
    /// Optional legacy per-turn movement allowance
    pub movement: Option<MovementBudget>,
    /// Action points, attached at combat start
    pub action_points: Option<ActionPoints>,
    /// Combat state, attached at combat start
    pub combat: Option<CombatState>,
}

impl Unit {
    /// The unit's id.
    #[must_use]
    pub const fn id(&self) -> UnitId {
        self.id
    }

    /// Health above zero.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.stats.health > 0
    }

    /// Team from the combat state, falling back to the caller-supplied tag.
    #[must_use]
    pub fn team(&self) -> Option<&TeamTag> {
        self.combat
            .as_ref()
            .map(|c| &c.team)
            .or(self.team.as_ref())
    }

    /// Whether two units are on different teams. Units without a team are
    /// hostile to nobody.
    #[must_use]
    pub fn is_hostile_to(&self, other: &Unit) -> bool {
        match (self.team(), other.team()) {
            (Some(a), Some(b)) => a != b,
            _ => false,
        }
    }

    /// Remaining action points, zero before combat state is attached.
    #[must_use]
    pub fn current_action_points(&self) -> u32 {
        self.action_points.map_or(0, |ap| ap.current())
    }

    /// The single acting-eligibility predicate: alive, action points left,
    /// and the `CAN_ACT` bit set.
    #[must_use]
    pub fn can_act(&self) -> bool {
        self.is_alive()
            && self.action_points.is_some_and(|ap| !ap.is_exhausted())
            && self.combat.as_ref().is_some_and(CombatState::can_act)
    }

    /// Attach fresh combat components for an encounter.
    pub(crate) fn attach_combat(&mut self, team: TeamTag) {
        self.action_points = Some(ActionPoints::new(self.role.max_action_points()));
        self.combat = Some(CombatState::new(team, self.stats.speed));
    }

    /// Start-of-turn refresh: refill AP and movement, re-enable acting unless
    /// the unit is defeated.
    pub(crate) fn begin_turn(&mut self) {
        if let Some(ap) = self.action_points.as_mut() {
            ap.restore();
        }
        if let Some(movement) = self.movement.as_mut() {
            movement.remaining = movement.per_turn;
        }
        if let Some(combat) = self.combat.as_mut() {
            if !combat.is_defeated() {
                combat.status_flags.insert(StatusFlags::CAN_ACT);
            }
        }
    }

    /// Give up the rest of this turn.
    pub(crate) fn forfeit(&mut self) {
        if let Some(ap) = self.action_points.as_mut() {
            ap.drain();
        }
    }

    /// Subtract damage, clamping at zero. Returns `true` if this blow
    /// defeated the unit.
    pub(crate) fn take_damage(&mut self, amount: u32) -> bool {
        let was_alive = self.is_alive();
        self.stats.health = self.stats.health.saturating_sub(amount);
        let defeated = was_alive && !self.is_alive();
        if defeated {
            if let Some(combat) = self.combat.as_mut() {
                combat.status_flags.insert(StatusFlags::DEFEATED);
                combat.status_flags.remove(StatusFlags::CAN_ACT);
            }
        }
        defeated
    }
}
