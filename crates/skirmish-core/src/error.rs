//! Error types for encounter setup and action validation.
//!
//! [`SetupError`]s abort [`CombatOrchestrator::initialize`] before the
//! encounter starts. [`ActionError`]s are recoverable: the offending action is
//! refused, nothing is mutated, and the acting side may try again.
//!
//! [`CombatOrchestrator::initialize`]: crate::orchestrator::CombatOrchestrator::initialize

use serde::{Deserialize, Serialize};
use thiserror::Error;

use tessera::{GridError, GridPosition, Terrain};

use crate::action::ActionKind;
use crate::entity::UnitId;
use crate::orchestrator::Phase;

/// Fatal problems with the unit list handed to the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SetupError {
    /// A unit has no team tag.
    #[error("unit {0} has no team")]
    MissingTeam(UnitId),

    /// Fewer than two distinct non-empty teams.
    #[error("an encounter needs at least two teams, found {found}")]
    InsufficientTeams {
        /// Number of distinct teams present
        found: usize,
    },

    /// A unit stands outside the grid.
    #[error("unit {unit} is outside the grid at {position}")]
    UnitOutOfBounds {
        /// Offending unit
        unit: UnitId,
        /// Its grid position
        position: GridPosition,
    },

    /// A unit's tile does not record it as the occupant.
    #[error("tile {position} does not hold unit {unit}")]
    OccupancyMismatch {
        /// Offending unit
        unit: UnitId,
        /// Its grid position
        position: GridPosition,
    },
}

/// Reasons an action was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ActionError {
    /// No unit with this id exists.
    #[error("unknown unit {0}")]
    UnknownUnit(UnitId),

    /// The unit was never attached to the encounter.
    #[error("unit {0} has no combat state")]
    MissingCombatState(UnitId),

    /// The encounter has ended.
    #[error("combat is no longer active")]
    CombatInactive,

    /// The actor's team is driven by the AI controller.
    #[error("unit {0} is controlled by the AI")]
    AiControlled(UnitId),

    /// Actions can only be submitted while a team turn waits for input.
    #[error("cannot accept actions during {0}")]
    NotAwaitingInput(Phase),

    /// The single pending-action slot is already taken.
    #[error("an action is already pending")]
    ActionPending,

    /// The actor's team is not the active team.
    #[error("it is not {0}'s turn")]
    NotActorsTurn(UnitId),

    /// The actor has no health left.
    #[error("unit {0} is defeated")]
    ActorDefeated(UnitId),

    /// The actor is out of action points or its turn is over.
    #[error("unit {0} cannot act")]
    ActorCannotAct(UnitId),

    /// Move target outside the grid.
    #[error("{0} is outside the battlefield")]
    OutOfBounds(GridPosition),

    /// Move target equals the current position.
    #[error("already standing at {0}")]
    AlreadyAtPosition(GridPosition),

    /// Move target terrain cannot be entered.
    #[error("{position} is impassable {terrain}")]
    Impassable {
        /// Target position
        position: GridPosition,
        /// Terrain there
        terrain: Terrain,
    },

    /// Move target already holds a unit.
    #[error("{position} is occupied by unit {occupant}")]
    Occupied {
        /// Target position
        position: GridPosition,
        /// Unit standing there
        occupant: UnitId,
    },

    /// Not enough action points.
    #[error("unit {unit} needs {required} AP but has {available}")]
    InsufficientActionPoints {
        /// Acting unit
        unit: UnitId,
        /// Points required
        required: u32,
        /// Points remaining
        available: u32,
    },

    /// Not enough per-turn movement left.
    #[error("unit {unit} needs {required} movement but has {available}")]
    InsufficientMovement {
        /// Acting unit
        unit: UnitId,
        /// Tiles required
        required: u32,
        /// Tiles remaining
        available: u32,
    },

    /// The submitted cost does not match the recomputed one.
    #[error("action cost {submitted} does not match expected {expected}")]
    CostMismatch {
        /// Recomputed cost
        expected: u32,
        /// Cost carried by the action
        submitted: u32,
    },

    /// The action kind needs a target that was not supplied.
    #[error("{0} action is missing its target")]
    MissingTarget(ActionKind),

    /// The attack target has no health left.
    #[error("target {0} is already defeated")]
    TargetDefeated(UnitId),

    /// Attacker and target share a team.
    #[error("unit {attacker} cannot attack ally {target}")]
    FriendlyTarget {
        /// Attacking unit
        attacker: UnitId,
        /// Targeted ally
        target: UnitId,
    },

    /// Target beyond attack range.
    #[error("target is {distance} tiles away, range is {range}")]
    OutOfRange {
        /// Manhattan distance to target
        distance: u32,
        /// Maximum range
        range: u32,
    },

    /// No resolver handles this action kind.
    #[error("no resolver handles {0} actions")]
    Unsupported(ActionKind),

    /// The action was flagged invalid when it was created.
    #[error("action was not validated")]
    Invalidated,

    /// Grid write failed.
    #[error(transparent)]
    Grid(#[from] GridError),
}

/// Result alias for action validation and execution.
pub type ActionResult<T> = std::result::Result<T, ActionError>;
