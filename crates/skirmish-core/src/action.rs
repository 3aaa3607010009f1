//! Combat actions.
//!
//! A [`CombatAction`] describes one attempted action. Actions are created by
//! the orchestrator's factory methods, which validate them against the state
//! at creation time, and are validated again when executed. The fields are
//! public so that callers can store or inspect actions; a tampered action is
//! caught by the re-validation (see [`ActionError::CostMismatch`]).
//!
//! [`ActionError::CostMismatch`]: crate::error::ActionError::CostMismatch

use std::fmt;

use serde::{Deserialize, Serialize};
use tessera::GridPosition;

use crate::entity::UnitId;

/// Kind of action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    /// Step to another tile
    Move,
    /// Strike an adjacent hostile unit
    Attack,
    /// Finish the unit's (or team's) turn
    Wait,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Move => write!(f, "Move"),
            Self::Attack => write!(f, "Attack"),
            Self::Wait => write!(f, "Wait"),
        }
    }
}

/// One attempted action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatAction {
    /// Action kind
    pub kind: ActionKind,
    /// Acting unit
    pub actor: UnitId,
    /// Unit being attacked
    pub target_unit: Option<UnitId>,
    /// Destination of a move
    pub target_position: Option<GridPosition>,
    /// AP cost computed at creation
    pub cost: u32,
    /// Set by the factory that validated the action
    pub valid: bool,
    /// Human-readable summary
    pub description: String,
    /// Wait only: end the whole team's turn
    pub ends_team_turn: bool,
}

impl CombatAction {
    /// A validated move.
    #[must_use]
    pub fn movement(actor: UnitId, to: GridPosition, cost: u32, description: String) -> Self {
        Self {
            kind: ActionKind::Move,
            actor,
            target_unit: None,
            target_position: Some(to),
            cost,
            valid: true,
            description,
            ends_team_turn: false,
        }
    }

    /// A validated attack.
    #[must_use]
    pub fn attack(actor: UnitId, target: UnitId, cost: u32, description: String) -> Self {
        Self {
            kind: ActionKind::Attack,
            actor,
            target_unit: Some(target),
            target_position: None,
            cost,
            valid: true,
            description,
            ends_team_turn: false,
        }
    }

    /// A wait. `ends_team_turn` finishes every member of the actor's team.
    #[must_use]
    pub fn wait(actor: UnitId, ends_team_turn: bool, description: String) -> Self {
        Self {
            kind: ActionKind::Wait,
            actor,
            target_unit: None,
            target_position: None,
            cost: 0,
            valid: true,
            description,
            ends_team_turn,
        }
    }
}

impl fmt::Display for CombatAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_fill_targets() {
        let mv = CombatAction::movement(UnitId::new(1), GridPosition::new(2, 2), 3, "m".into());
        assert_eq!(mv.kind, ActionKind::Move);
        assert_eq!(mv.target_position, Some(GridPosition::new(2, 2)));
        assert!(mv.target_unit.is_none());
        assert!(mv.valid);

        let atk = CombatAction::attack(UnitId::new(1), UnitId::new(2), 2, "a".into());
        assert_eq!(atk.target_unit, Some(UnitId::new(2)));
        assert_eq!(atk.cost, 2);

        let wait = CombatAction::wait(UnitId::new(1), true, "w".into());
        assert_eq!(wait.cost, 0);
        assert!(wait.ends_team_turn);
    }

    #[test]
    fn display_uses_description() {
        let wait = CombatAction::wait(UnitId::new(1), false, "Knight waits".into());
        assert_eq!(wait.to_string(), "Knight waits");
    }
}
