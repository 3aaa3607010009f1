//! Wait resolver.

use crate::action::{ActionKind, CombatAction};
use crate::arena::Arena;
use crate::config::CombatConfig;
use crate::error::{ActionError, ActionResult};
use crate::event::CombatEvent;

use super::{combatant, ensure_flagged_valid, ResolveContext, Resolution, Resolver};

/// Resolver for [`ActionKind::Wait`].
///
/// Waiting costs nothing and needs no remaining AP: it drains the actor's
/// pool so the turn moves on. A wait flagged `ends_team_turn` drains every
/// member of the actor's team and tells the orchestrator to close the turn.
#[derive(Debug, Clone, Default)]
pub struct WaitResolver;

impl WaitResolver {
    /// Creates a new wait resolver.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Resolver for WaitResolver {
    fn handles(&self) -> &[ActionKind] {
        &[ActionKind::Wait]
    }

    fn validate(
        &self,
        action: &CombatAction,
        arena: &Arena,
        _config: &CombatConfig,
    ) -> ActionResult<()> {
        ensure_flagged_valid(action)?;
        let unit = combatant(arena, action.actor)?;
        if !unit.is_alive() {
            return Err(ActionError::ActorDefeated(action.actor));
        }
        Ok(())
    }

    fn resolve(
        &self,
        action: &CombatAction,
        ctx: &mut ResolveContext<'_>,
    ) -> ActionResult<Resolution> {
        self.validate(action, ctx.arena, ctx.config)?;

        let team = ctx.arena.get(action.actor).and_then(|u| u.team().cloned());
        for unit in ctx.arena.units_sorted_mut() {
            let drains = unit.id() == action.actor
                || (action.ends_team_turn && team.is_some() && unit.team() == team.as_ref());
            if drains {
                unit.forfeit();
            }
        }

        tracing::debug!(unit = %action.actor, ends_team_turn = action.ends_team_turn, "unit waited");
        ctx.emit(CombatEvent::UnitWaited { unit: action.actor });

        Ok(Resolution {
            ends_team_turn: action.ends_team_turn,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{TeamTag, UnitId, UnitProfile};
    use crate::event::EventLog;
    use crate::resolver::MoveRecord;
    use tessera::{Grid, GridPosition};

    fn setup() -> (Arena, [UnitId; 3]) {
        let mut arena = Arena::new(Grid::new(4, 4, 16).unwrap());
        let a = arena.spawn_at(UnitProfile::new("a", TeamTag::player()), GridPosition::new(0, 0));
        let b = arena.spawn_at(UnitProfile::new("b", TeamTag::player()), GridPosition::new(1, 0));
        let c = arena.spawn_at(UnitProfile::new("c", TeamTag::enemy()), GridPosition::new(3, 3));
        for id in [a, b, c] {
            let unit = arena.get_mut(id).unwrap();
            let team = unit.team.clone().unwrap();
            unit.attach_combat(team);
        }
        (arena, [a, b, c])
    }

    fn run(arena: &mut Arena, action: &CombatAction) -> ActionResult<Resolution> {
        let config = CombatConfig::default();
        let mut events = EventLog::new();
        let mut history: Vec<MoveRecord> = Vec::new();
        let mut ctx = ResolveContext {
            arena,
            config: &config,
            events: &mut events,
            history: &mut history,
            round: 1,
        };
        WaitResolver::new().resolve(action, &mut ctx)
    }

    #[test]
    fn wait_finishes_only_the_actor() {
        let (mut arena, [a, b, c]) = setup();
        let outcome = run(&mut arena, &CombatAction::wait(a, false, "a waits".into())).unwrap();

        assert!(!outcome.ends_team_turn);
        assert!(!arena.get(a).unwrap().can_act());
        assert!(arena.get(b).unwrap().can_act());
        assert!(arena.get(c).unwrap().can_act());
    }

    #[test]
    fn end_turn_finishes_the_whole_team() {
        let (mut arena, [a, b, c]) = setup();
        let outcome = run(&mut arena, &CombatAction::wait(a, true, "end".into())).unwrap();

        assert!(outcome.ends_team_turn);
        assert!(!arena.get(a).unwrap().can_act());
        assert!(!arena.get(b).unwrap().can_act());
        assert!(arena.get(c).unwrap().can_act());
    }

    #[test]
    fn exhausted_unit_may_still_wait() {
        let (mut arena, [a, ..]) = setup();
        arena.get_mut(a).unwrap().forfeit();
        assert!(run(&mut arena, &CombatAction::wait(a, false, "again".into())).is_ok());
    }

    #[test]
    fn defeated_unit_cannot_wait() {
        let (mut arena, [a, ..]) = setup();
        arena.get_mut(a).unwrap().take_damage(1000);
        assert_eq!(
            run(&mut arena, &CombatAction::wait(a, false, "ghost".into())),
            Err(ActionError::ActorDefeated(a))
        );
    }
}
