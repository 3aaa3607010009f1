//! Component structs attached to units.
//!
//! [`UnitStats`], [`UnitRole`] and [`MovementBudget`] come from the caller.
//! [`ActionPoints`] and [`CombatState`] are attached by the orchestrator when
//! the encounter starts.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use super::TeamTag;

// =============================================================================
// Stats
// =============================================================================

/// Core combat attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitStats {
    /// Current health; zero means defeated
    pub health: u32,
    /// Maximum health
    pub max_health: u32,
    /// Attack power
    pub attack: u32,
    /// Damage reduction
    pub defense: u32,
    /// Initiative source
    pub speed: u32,
}

impl UnitStats {
    /// Fully healed stats.
    #[must_use]
    pub const fn new(max_health: u32, attack: u32, defense: u32, speed: u32) -> Self {
        Self {
            health: max_health,
            max_health,
            attack,
            defense,
            speed,
        }
    }
}

impl Default for UnitStats {
    fn default() -> Self {
        Self::new(20, 5, 2, 5)
    }
}

/// Battlefield role, which decides the action-point pool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitRole {
    /// Front-line fighter
    #[default]
    Vanguard,
    /// Fast flanker
    Skirmisher,
    /// Spellcaster
    Caster,
    /// Healer or buffer
    Support,
    /// Explicit pool size
    Custom {
        /// Maximum AP
        action_points: u32,
    },
}

impl UnitRole {
    /// Maximum action points granted by this role.
    #[must_use]
    pub const fn max_action_points(self) -> u32 {
        match self {
            Self::Vanguard => 4,
            Self::Skirmisher => 5,
            Self::Caster | Self::Support => 3,
            Self::Custom { action_points } => action_points,
        }
    }
}

/// Legacy per-turn tile allowance, tracked alongside AP for units that
/// carry one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementBudget {
    /// Tiles left this turn
    pub remaining: u32,
    /// Tiles granted each turn
    pub per_turn: u32,
}

impl MovementBudget {
    /// Full budget of `per_turn` tiles.
    #[must_use]
    pub const fn new(per_turn: u32) -> Self {
        Self {
            remaining: per_turn,
            per_turn,
        }
    }
}

// =============================================================================
// Action Points
// =============================================================================

/// Per-turn spendable resource.
///
/// `current` never exceeds `maximum` and never goes below zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionPoints {
    current: u32,
    maximum: u32,
}

impl ActionPoints {
    /// Fully charged pool.
    #[must_use]
    pub const fn new(maximum: u32) -> Self {
        Self {
            current: maximum,
            maximum,
        }
    }

    /// Points left.
    #[must_use]
    pub const fn current(&self) -> u32 {
        self.current
    }

    /// Pool size.
    #[must_use]
    pub const fn maximum(&self) -> u32 {
        self.maximum
    }

    /// Whether `cost` points are available.
    #[must_use]
    pub const fn can_afford(&self, cost: u32) -> bool {
        self.current >= cost
    }

    /// Whether no points are left.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.current == 0
    }

    /// Deduct `cost` points. Returns `false` and leaves the pool untouched
    /// when the cost is not affordable.
    pub fn spend(&mut self, cost: u32) -> bool {
        if !self.can_afford(cost) {
            return false;
        }
        self.current -= cost;
        true
    }

    /// Refill to maximum.
    pub fn restore(&mut self) {
        self.current = self.maximum;
    }

    /// Drop to zero.
    pub fn drain(&mut self) {
        self.current = 0;
    }
}

// =============================================================================
// Combat State
// =============================================================================

bitflags! {
    /// Per-unit combat status bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct StatusFlags: u8 {
        /// Unit may take actions this team turn.
        const CAN_ACT = 0b0000_0001;
        /// Unit's health reached zero.
        const DEFEATED = 0b0000_0010;
    }
}

impl Default for StatusFlags {
    fn default() -> Self {
        Self::CAN_ACT
    }
}

/// Encounter-scoped state attached to a unit at combat start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatState {
    /// Team the unit fights for
    pub team: TeamTag,
    /// Initiative score, fixed for the encounter
    pub initiative: u32,
    /// Status bits
    pub status_flags: StatusFlags,
}

impl CombatState {
    /// Fresh state for a unit on `team` with the given initiative.
    #[must_use]
    pub fn new(team: TeamTag, initiative: u32) -> Self {
        Self {
            team,
            initiative,
            status_flags: StatusFlags::default(),
        }
    }

    /// Whether the `CAN_ACT` bit is set.
    #[must_use]
    pub const fn can_act(&self) -> bool {
        self.status_flags.contains(StatusFlags::CAN_ACT)
    }

    /// Whether the `DEFEATED` bit is set.
    #[must_use]
    pub const fn is_defeated(&self) -> bool {
        self.status_flags.contains(StatusFlags::DEFEATED)
    }
}
