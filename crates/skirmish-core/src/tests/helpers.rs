//! Test helper functions for building encounters and driving them.

use tessera::{Grid, GridPosition};

use crate::arena::Arena;
use crate::config::CombatConfig;
use crate::entity::{TeamTag, UnitId, UnitProfile, UnitRole, UnitStats};
use crate::event::CombatEvent;
use crate::orchestrator::{CombatOrchestrator, Phase};

/// Route `tracing` output through the test harness. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Empty arena over an all-floor grid.
pub fn empty_arena(width: u32, height: u32) -> Arena {
    Arena::new(Grid::new(width, height, 32).expect("valid test grid"))
}

/// Spawn a unit with explicit stats and AP pool at `cell`.
pub fn spawn_unit(
    arena: &mut Arena,
    name: &str,
    team: &TeamTag,
    cell: (i32, i32),
    stats: UnitStats,
    action_points: u32,
) -> UnitId {
    arena.spawn_at(
        UnitProfile::new(name, team.clone())
            .with_stats(stats)
            .with_role(UnitRole::Custom { action_points }),
        GridPosition::new(cell.0, cell.1),
    )
}

/// Start an encounter, panicking on setup errors.
pub fn start(arena: Arena, config: CombatConfig) -> CombatOrchestrator {
    init_tracing();
    CombatOrchestrator::initialize(arena, config).expect("valid encounter")
}

/// Call `update` until the player has to act or the encounter ends.
///
/// Returns the number of updates performed.
pub fn run_until_player_input(combat: &mut CombatOrchestrator, max_updates: usize) -> usize {
    for step in 0..max_updates {
        let waiting = combat.phase() == Phase::TeamTurn
            && combat.pending_action().is_none()
            && combat
                .active_team()
                .is_some_and(|t| t.is_player_controlled() && t.has_able_members(combat.arena()));
        if waiting || combat.phase() == Phase::Ended {
            return step;
        }
        combat.update();
    }
    max_updates
}

/// Call `update` until the phase equals `phase`, at most `max_updates` times.
pub fn run_until_phase(combat: &mut CombatOrchestrator, phase: Phase, max_updates: usize) -> bool {
    for _ in 0..max_updates {
        if combat.phase() == phase {
            return true;
        }
        combat.update();
    }
    combat.phase() == phase
}

/// Submit an action and step until it has been executed or rejected.
pub fn execute(combat: &mut CombatOrchestrator, action: crate::action::CombatAction) {
    combat.submit_action(action).expect("submission accepted");
    combat.update();
    assert_eq!(combat.phase(), Phase::ActionExecution);
    combat.update();
}

/// Every event currently pending, without draining.
pub fn pending_events(combat: &CombatOrchestrator) -> Vec<CombatEvent> {
    combat
        .pending_events()
        .iter()
        .map(|r| r.event.clone())
        .collect()
}
