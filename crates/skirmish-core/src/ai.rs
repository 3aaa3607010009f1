//! Enemy decision making.
//!
//! A [`Controller`] picks actions for AI teams. It reads the encounter through
//! a [`BattleView`], which only hands out shared references, and returns an
//! [`AiDecision`] that the orchestrator applies. Controllers never mutate
//! state themselves.
//!
//! # Example
//!
//! ```
//! use skirmish_core::ai::{AdjacentStrike, Controller};
//!
//! let controller = AdjacentStrike;
//! assert_eq!(controller.name(), "adjacent-strike");
//! ```

use crate::action::CombatAction;
use crate::arena::Arena;
use crate::config::CombatConfig;
use crate::entity::{Unit, UnitId};
use crate::resolver::plan_attack;
use crate::team::{TeamId, TeamRoster};

/// Read-only snapshot handed to a [`Controller`].
#[derive(Debug, Clone, Copy)]
pub struct BattleView<'a> {
    arena: &'a Arena,
    roster: &'a TeamRoster,
    config: &'a CombatConfig,
}

impl<'a> BattleView<'a> {
    /// Wrap the encounter state.
    #[must_use]
    pub const fn new(arena: &'a Arena, roster: &'a TeamRoster, config: &'a CombatConfig) -> Self {
        Self {
            arena,
            roster,
            config,
        }
    }

    /// Units and grid.
    #[must_use]
    pub const fn arena(&self) -> &'a Arena {
        self.arena
    }

    /// Teams and initiative order.
    #[must_use]
    pub const fn roster(&self) -> &'a TeamRoster {
        self.roster
    }

    /// Encounter rules.
    #[must_use]
    pub const fn config(&self) -> &'a CombatConfig {
        self.config
    }

    /// Living hostile units on the tiles orthogonally adjacent to `unit`, in
    /// neighbour order.
    #[must_use]
    pub fn adjacent_hostiles(&self, unit: &Unit) -> Vec<&'a Unit> {
        let Some(pos) = self.arena.grid_position(unit.id()) else {
            return Vec::new();
        };
        self.arena
            .grid()
            .neighbors(pos)
            .into_iter()
            .filter_map(|n| self.arena.unit_at(n))
            .filter(|other| other.is_alive() && unit.is_hostile_to(other))
            .collect()
    }
}

/// What a controller wants done this step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AiDecision {
    /// Units that give up the rest of their turn, in order.
    pub forfeits: Vec<UnitId>,
    /// The action to execute, if any. `None` ends the team's turn.
    pub action: Option<CombatAction>,
}

/// Picks actions for AI-controlled teams.
pub trait Controller: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Decide the next step for `team`.
    fn decide(&self, view: &BattleView<'_>, team: TeamId) -> AiDecision;
}

/// Minimal melee AI.
///
/// Walks the team's members in order. The first unit that can act and has a
/// hostile neighbour it can legally attack strikes it. Units that can act but
/// find nothing to hit forfeit. AI units never move.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdjacentStrike;

impl Controller for AdjacentStrike {
    fn name(&self) -> &str {
        "adjacent-strike"
    }

    fn decide(&self, view: &BattleView<'_>, team: TeamId) -> AiDecision {
        let mut decision = AiDecision::default();
        let Some(info) = view.roster().get(team) else {
            return decision;
        };
        let arena = view.arena();

        for &member in info.members() {
            let Some(unit) = arena.get(member) else {
                continue;
            };
            if !unit.can_act() {
                continue;
            }
            let strike = view
                .adjacent_hostiles(unit)
                .into_iter()
                .find_map(|target| plan_attack(arena, view.config(), member, target.id()).ok());
            if let Some(plan) = strike {
                decision.action = Some(plan.into_action(arena));
                return decision;
            }
            decision.forfeits.push(member);
        }

        decision
    }
}
