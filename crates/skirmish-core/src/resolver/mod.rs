//! Action resolvers.
//!
//! Resolvers turn a pending [`CombatAction`] into state mutations. Each
//! resolver declares which action kinds it handles via [`Resolver::handles()`]
//! and the orchestrator routes the action to the first resolver that claims
//! its kind.
//!
//! # Check, then apply
//!
//! Every resolver re-validates the action against the current state before
//! touching anything. A refused action returns an [`ActionError`] and leaves
//! the arena, the event log and the movement history exactly as they were.
//! Only after every check has passed does the resolver mutate.
//!
//! # Available Resolvers
//!
//! - [`MovementResolver`]: step to a reachable tile, spending AP per tile
//! - [`AttackResolver`]: strike an adjacent hostile unit
//! - [`WaitResolver`]: give up the rest of a unit's (or team's) turn

mod attack;
mod movement;
mod wait;

pub use attack::{damage, plan_attack, AttackPlan, AttackResolver, ATTACK_RANGE, MIN_DAMAGE};
pub use movement::{plan_move, MovePlan, MoveRecord, MovementResolver};
pub use wait::WaitResolver;

use crate::action::{ActionKind, CombatAction};
use crate::arena::Arena;
use crate::config::CombatConfig;
use crate::entity::{Unit, UnitId};
use crate::error::{ActionError, ActionResult};
use crate::event::{CombatEvent, EventLog};

/// Mutable state a resolver may touch while applying an action.
pub struct ResolveContext<'a> {
    /// Units and grid
    pub arena: &'a mut Arena,
    /// Encounter rules
    pub config: &'a CombatConfig,
    /// Event outbox
    pub events: &'a mut EventLog,
    /// Completed moves, oldest first
    pub history: &'a mut Vec<MoveRecord>,
    /// Current round
    pub round: u32,
}

impl ResolveContext<'_> {
    /// Record an event stamped with the current round.
    pub fn emit(&mut self, event: CombatEvent) {
        self.events.record(self.round, event);
    }
}

/// What the orchestrator should do after a successful action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Resolution {
    /// The actor's whole team is done for this round.
    pub ends_team_turn: bool,
}

/// Validates and applies one kind of action.
///
/// # Implementation Guidelines
///
/// 1. **Determinism**: the same action against the same state must produce
///    the same mutations and events.
///
/// 2. **Atomicity**: run every check in [`Resolver::validate`] first. Once
///    mutation starts it must not fail halfway.
///
/// # Example
///
/// ```
/// use skirmish_core::action::{ActionKind, CombatAction};
/// use skirmish_core::arena::Arena;
/// use skirmish_core::config::CombatConfig;
/// use skirmish_core::error::ActionResult;
/// use skirmish_core::resolver::{ResolveContext, Resolution, Resolver};
///
/// struct Shout;
///
/// impl Resolver for Shout {
///     fn handles(&self) -> &[ActionKind] {
///         &[ActionKind::Wait]
///     }
///
///     fn validate(&self, _: &CombatAction, _: &Arena, _: &CombatConfig) -> ActionResult<()> {
///         Ok(())
///     }
///
///     fn resolve(&self, _: &CombatAction, _: &mut ResolveContext<'_>) -> ActionResult<Resolution> {
///         Ok(Resolution::default())
///     }
/// }
/// ```
pub trait Resolver: Send + Sync {
    /// Action kinds this resolver handles.
    fn handles(&self) -> &[ActionKind];

    /// Check the action against the current state without mutating anything.
    ///
    /// # Errors
    ///
    /// Returns the first [`ActionError`] that makes the action illegal.
    fn validate(
        &self,
        action: &CombatAction,
        arena: &Arena,
        config: &CombatConfig,
    ) -> ActionResult<()>;

    /// Validate, then apply the action.
    ///
    /// # Errors
    ///
    /// Returns an [`ActionError`] if validation fails; nothing has been
    /// mutated in that case.
    fn resolve(
        &self,
        action: &CombatAction,
        ctx: &mut ResolveContext<'_>,
    ) -> ActionResult<Resolution>;
}

/// The built-in resolver set, one per [`ActionKind`].
#[must_use]
pub fn default_resolvers() -> Vec<Box<dyn Resolver>> {
    vec![
        Box::new(MovementResolver::new()),
        Box::new(AttackResolver::new()),
        Box::new(WaitResolver::new()),
    ]
}

/// Look up a unit that has been attached to the encounter.
pub(crate) fn combatant(arena: &Arena, id: UnitId) -> ActionResult<&Unit> {
    let unit = arena.get(id).ok_or(ActionError::UnknownUnit(id))?;
    if unit.combat.is_none() || unit.action_points.is_none() {
        return Err(ActionError::MissingCombatState(id));
    }
    Ok(unit)
}

/// Look up a unit that is alive and allowed to act right now.
pub(crate) fn ready_actor(arena: &Arena, id: UnitId) -> ActionResult<&Unit> {
    let unit = combatant(arena, id)?;
    if !unit.is_alive() {
        return Err(ActionError::ActorDefeated(id));
    }
    if !unit.can_act() {
        return Err(ActionError::ActorCannotAct(id));
    }
    Ok(unit)
}

/// Refuse actions that were never validated by a factory.
pub(crate) fn ensure_flagged_valid(action: &CombatAction) -> ActionResult<()> {
    if action.valid {
        Ok(())
    } else {
        Err(ActionError::Invalidated)
    }
}
