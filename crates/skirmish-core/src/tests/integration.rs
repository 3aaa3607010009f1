//! Integration tests for whole encounters.
//!
//! These drive the orchestrator through `update`, `submit_action` and the
//! action factories only, and check the observable state and event stream.

use tessera::GridPosition;

use crate::action::CombatAction;
use crate::config::{CombatConfig, DefeatPolicy};
use crate::entity::{TeamTag, UnitId, UnitStats};
use crate::error::ActionError;
use crate::event::CombatEvent;
use crate::orchestrator::Phase;
use crate::team::CombatResult;

use super::helpers::{
    empty_arena, execute, pending_events, run_until_phase, run_until_player_input, spawn_unit,
    start,
};

// =============================================================================
// Setup and initiative
// =============================================================================

mod initiative_tests {
    use super::*;

    #[test]
    fn faster_team_goes_first_and_can_close_in() {
        let mut arena = empty_arena(5, 5);
        let a = spawn_unit(
            &mut arena,
            "A",
            &TeamTag::player(),
            (0, 0),
            UnitStats::new(20, 5, 2, 10),
            10,
        );
        let b = spawn_unit(
            &mut arena,
            "B",
            &TeamTag::enemy(),
            (4, 4),
            UnitStats::new(20, 5, 2, 5),
            10,
        );
        let mut combat = start(arena, CombatConfig::default());

        let order: Vec<&TeamTag> = combat.initiative_order().map(|t| t.tag()).collect();
        assert_eq!(order, vec![&TeamTag::player(), &TeamTag::enemy()]);
        assert_eq!(combat.active_team().unwrap().tag(), &TeamTag::player());

        let step = combat.create_move_action(a, GridPosition::new(4, 2)).unwrap();
        assert_eq!(step.cost, 6);
        execute(&mut combat, step);
        assert_eq!(combat.phase(), Phase::EndTurn);
        assert_eq!(combat.arena().grid_position(a), Some(GridPosition::new(4, 2)));
        assert_eq!(combat.unit(a).unwrap().current_action_points(), 4);

        assert_eq!(
            combat.create_attack_action(a, b),
            Err(ActionError::OutOfRange {
                distance: 2,
                range: 1,
            })
        );
    }

    #[test]
    fn ties_keep_first_appearance_order() {
        let mut arena = empty_arena(4, 4);
        spawn_unit(&mut arena, "e", &TeamTag::enemy(), (0, 0), UnitStats::default(), 4);
        spawn_unit(&mut arena, "p", &TeamTag::player(), (3, 3), UnitStats::default(), 4);
        let combat = start(arena, CombatConfig::default());

        let order: Vec<&TeamTag> = combat.initiative_order().map(|t| t.tag()).collect();
        assert_eq!(order, vec![&TeamTag::enemy(), &TeamTag::player()]);
    }
}

// =============================================================================
// Damage
// =============================================================================

mod damage_tests {
    use super::*;

    #[test]
    fn heavy_armour_still_takes_one_damage() {
        let mut arena = empty_arena(4, 4);
        let a = spawn_unit(
            &mut arena,
            "A",
            &TeamTag::player(),
            (1, 1),
            UnitStats::new(20, 10, 0, 9),
            4,
        );
        let b = spawn_unit(
            &mut arena,
            "B",
            &TeamTag::enemy(),
            (1, 2),
            UnitStats::new(20, 1, 30, 1),
            4,
        );
        let mut combat = start(arena, CombatConfig::default());

        let strike = combat.create_attack_action(a, b).unwrap();
        execute(&mut combat, strike);

        assert_eq!(combat.unit(b).unwrap().stats.health, 19);
        assert!(pending_events(&combat).contains(&CombatEvent::UnitAttacked {
            attacker: a,
            target: b,
            damage: 1,
            remaining_health: 19,
        }));
    }
}

// =============================================================================
// Turn flow
// =============================================================================

mod turn_flow_tests {
    use super::*;

    #[test]
    fn team_without_points_ends_its_turn_without_acting() {
        let mut arena = empty_arena(5, 5);
        spawn_unit(
            &mut arena,
            "idle",
            &TeamTag::enemy(),
            (0, 0),
            UnitStats::new(10, 5, 0, 10),
            0,
        );
        spawn_unit(
            &mut arena,
            "hero",
            &TeamTag::player(),
            (4, 4),
            UnitStats::new(10, 5, 0, 1),
            4,
        );
        let mut combat = start(arena, CombatConfig::default());
        assert_eq!(combat.active_team().unwrap().tag(), &TeamTag::enemy());
        combat.drain_events();

        combat.update();
        assert_eq!(combat.phase(), Phase::VictoryCheck);
        let events = pending_events(&combat);
        assert!(events.contains(&CombatEvent::TeamTurnEnded {
            team: TeamTag::enemy()
        }));
        assert!(!events
            .iter()
            .any(|e| matches!(e, CombatEvent::UnitForfeited { .. } | CombatEvent::UnitAttacked { .. })));

        combat.update();
        assert_eq!(combat.phase(), Phase::TeamTurn);
        assert_eq!(combat.active_team().unwrap().tag(), &TeamTag::player());
        assert_eq!(combat.round(), 1);
    }

    #[test]
    fn round_flags_reset_exactly_once() {
        let mut arena = empty_arena(6, 6);
        let hero = spawn_unit(
            &mut arena,
            "hero",
            &TeamTag::player(),
            (0, 0),
            UnitStats::new(10, 5, 0, 9),
            4,
        );
        spawn_unit(
            &mut arena,
            "orc",
            &TeamTag::enemy(),
            (5, 5),
            UnitStats::new(10, 5, 0, 1),
            4,
        );
        let mut combat = start(arena, CombatConfig::default());

        let end = combat.create_end_turn_action(hero).unwrap();
        assert!(end.ends_team_turn);
        execute(&mut combat, end);

        // Player done, enemy pending.
        assert!(run_until_phase(&mut combat, Phase::TeamTurn, 5));
        let enemy = combat.active_team().unwrap();
        assert_eq!(enemy.tag(), &TeamTag::enemy());
        assert!(combat.teams().iter().any(|t| t.completed_this_round));

        run_until_player_input(&mut combat, 20);
        assert_eq!(combat.round(), 2);
        assert!(combat.teams().iter().all(|t| !t.completed_this_round));
        assert_eq!(combat.active_team().unwrap().tag(), &TeamTag::player());

        let rounds: Vec<u32> = combat
            .pending_events()
            .iter()
            .filter_map(|r| match r.event {
                CombatEvent::RoundStarted { round } => Some(round),
                _ => None,
            })
            .collect();
        assert_eq!(rounds, vec![1, 2]);

        // Turn start refilled the player's points.
        assert_eq!(combat.unit(hero).unwrap().current_action_points(), 4);
    }

    #[test]
    fn cursor_moves_to_next_able_member() {
        let mut arena = empty_arena(6, 6);
        let first = spawn_unit(&mut arena, "first", &TeamTag::player(), (0, 0), UnitStats::default(), 4);
        let second = spawn_unit(&mut arena, "second", &TeamTag::player(), (1, 0), UnitStats::default(), 4);
        spawn_unit(&mut arena, "orc", &TeamTag::enemy(), (5, 5), UnitStats::default(), 4);
        let mut combat = start(arena, CombatConfig::default());
        assert_eq!(combat.active_unit(), Some(first));

        let wait = combat.create_wait_action(first).unwrap();
        assert!(!wait.ends_team_turn);
        execute(&mut combat, wait);
        assert_eq!(combat.active_unit(), Some(second));

        run_until_phase(&mut combat, Phase::TeamTurn, 5);
        assert_eq!(combat.active_team().unwrap().tag(), &TeamTag::player());
        assert_eq!(combat.select_unit(first), Err(ActionError::ActorCannotAct(first)));
        assert!(combat.select_unit(second).is_ok());
    }

    #[test]
    fn end_turn_can_be_limited_to_the_unit() {
        let mut arena = empty_arena(6, 6);
        let first = spawn_unit(&mut arena, "first", &TeamTag::player(), (0, 0), UnitStats::default(), 4);
        let second = spawn_unit(&mut arena, "second", &TeamTag::player(), (1, 0), UnitStats::default(), 4);
        spawn_unit(&mut arena, "orc", &TeamTag::enemy(), (5, 5), UnitStats::default(), 4);
        let config = CombatConfig {
            end_turn_ends_player_team: false,
            ..CombatConfig::default()
        };
        let mut combat = start(arena, config);

        let end = combat.create_end_turn_action(first).unwrap();
        assert!(!end.ends_team_turn);
        execute(&mut combat, end);
        assert!(combat.unit(second).unwrap().can_act());
    }
}

// =============================================================================
// Rejection
// =============================================================================

mod rejection_tests {
    use super::*;

    #[test]
    fn forged_cost_is_rejected_and_nothing_changes() {
        let mut arena = empty_arena(5, 5);
        let hero = spawn_unit(&mut arena, "hero", &TeamTag::player(), (0, 0), UnitStats::new(10, 5, 0, 9), 4);
        spawn_unit(&mut arena, "orc", &TeamTag::enemy(), (4, 4), UnitStats::default(), 4);
        let mut combat = start(arena, CombatConfig::default());

        let mut cheap = combat.create_move_action(hero, GridPosition::new(0, 3)).unwrap();
        cheap.cost = 1;
        let before = combat.arena().clone();
        combat.drain_events();

        execute(&mut combat, cheap);

        assert_eq!(combat.phase(), Phase::TeamTurn);
        assert!(combat.pending_action().is_none());
        assert_eq!(combat.arena(), &before);
        assert!(combat.movement_history().is_empty());
        assert!(pending_events(&combat).contains(&CombatEvent::ActionRejected {
            unit: hero,
            reason: ActionError::CostMismatch {
                expected: 3,
                submitted: 1,
            },
        }));

        // Same team may try again.
        let honest = combat.create_move_action(hero, GridPosition::new(0, 3)).unwrap();
        execute(&mut combat, honest);
        assert_eq!(combat.arena().grid_position(hero), Some(GridPosition::new(0, 3)));
        assert_eq!(combat.movement_history().len(), 1);
    }

    #[test]
    fn repeated_rejection_is_harmless() {
        let mut arena = empty_arena(5, 5);
        let hero = spawn_unit(&mut arena, "hero", &TeamTag::player(), (0, 0), UnitStats::new(10, 5, 0, 9), 4);
        let orc = spawn_unit(&mut arena, "orc", &TeamTag::enemy(), (0, 1), UnitStats::default(), 4);
        let mut combat = start(arena, CombatConfig::default());
        let before = combat.arena().clone();

        for _ in 0..3 {
            assert_eq!(
                combat.create_move_action(hero, GridPosition::new(0, 1)),
                Err(ActionError::Occupied {
                    position: GridPosition::new(0, 1),
                    occupant: orc,
                })
            );
            let forged = CombatAction::movement(hero, GridPosition::new(0, 1), 1, "push".into());
            execute(&mut combat, forged);
            assert_eq!(combat.phase(), Phase::TeamTurn);
        }
        assert_eq!(combat.arena(), &before);
    }

    #[test]
    fn unvalidated_action_is_refused() {
        let mut arena = empty_arena(5, 5);
        let hero = spawn_unit(&mut arena, "hero", &TeamTag::player(), (0, 0), UnitStats::new(10, 5, 0, 9), 4);
        spawn_unit(&mut arena, "orc", &TeamTag::enemy(), (4, 4), UnitStats::default(), 4);
        let mut combat = start(arena, CombatConfig::default());

        let mut action = combat.create_wait_action(hero).unwrap();
        action.valid = false;
        execute(&mut combat, action);
        assert!(pending_events(&combat).contains(&CombatEvent::ActionRejected {
            unit: hero,
            reason: ActionError::Invalidated,
        }));
        assert!(combat.unit(hero).unwrap().can_act());
    }
}

// =============================================================================
// Victory
// =============================================================================

mod victory_tests {
    use super::*;

    fn last_stand(policy: DefeatPolicy) -> (crate::orchestrator::CombatOrchestrator, UnitId, UnitId) {
        let mut arena = empty_arena(5, 5);
        let a = spawn_unit(&mut arena, "A", &TeamTag::player(), (2, 2), UnitStats::new(20, 10, 0, 9), 4);
        let b = spawn_unit(&mut arena, "B", &TeamTag::enemy(), (2, 3), UnitStats::new(5, 1, 0, 1), 4);
        let config = CombatConfig {
            defeat_policy: policy,
            ..CombatConfig::default()
        };
        (start(arena, config), a, b)
    }

    #[test]
    fn killing_the_last_enemy_wins_on_next_check() {
        let (mut combat, a, b) = last_stand(DefeatPolicy::Tombstone);
        let strike = combat.create_attack_action(a, b).unwrap();
        execute(&mut combat, strike);

        assert!(!combat.unit(b).unwrap().is_alive());
        assert_eq!(combat.phase(), Phase::EndTurn);
        combat.update();
        assert_eq!(combat.phase(), Phase::VictoryCheck);
        combat.update();

        assert_eq!(combat.phase(), Phase::Ended);
        assert!(!combat.is_active());
        let player = combat
            .teams()
            .iter()
            .find(|t| t.tag() == &TeamTag::player())
            .unwrap()
            .id();
        assert_eq!(combat.result(), CombatResult::Victory(player));
        assert!(pending_events(&combat).contains(&CombatEvent::CombatEnded {
            result: CombatResult::Victory(player),
            winner: Some(TeamTag::player()),
        }));

        // Tombstone leaves the body blocking its tile.
        assert!(combat
            .arena()
            .grid()
            .tile_at(GridPosition::new(2, 3))
            .unwrap()
            .is_occupied());

        // Further input and updates are inert.
        assert_eq!(combat.create_wait_action(a), Err(ActionError::CombatInactive));
        combat.update();
        assert_eq!(combat.phase(), Phase::Ended);
    }

    #[test]
    fn vacate_policy_frees_the_tile() {
        let (mut combat, a, b) = last_stand(DefeatPolicy::Vacate);
        let strike = combat.create_attack_action(a, b).unwrap();
        execute(&mut combat, strike);

        assert!(!combat
            .arena()
            .grid()
            .tile_at(GridPosition::new(2, 3))
            .unwrap()
            .is_occupied());
    }

    #[test]
    fn enemy_ai_wins_against_a_passive_player() {
        let mut arena = empty_arena(4, 4);
        let hero = spawn_unit(&mut arena, "hero", &TeamTag::player(), (1, 1), UnitStats::new(10, 1, 0, 9), 4);
        spawn_unit(&mut arena, "ogre", &TeamTag::enemy(), (1, 2), UnitStats::new(30, 5, 0, 1), 4);
        let mut combat = start(arena, CombatConfig::default());

        let end = combat.create_end_turn_action(hero).unwrap();
        execute(&mut combat, end);
        assert!(run_until_phase(&mut combat, Phase::Ended, 30));

        let enemy = combat
            .teams()
            .iter()
            .find(|t| t.tag() == &TeamTag::enemy())
            .unwrap()
            .id();
        assert_eq!(combat.result(), CombatResult::Victory(enemy));
        assert_eq!(combat.round(), 1);
        let hits = pending_events(&combat)
            .iter()
            .filter(|e| matches!(e, CombatEvent::UnitAttacked { .. }))
            .count();
        assert_eq!(hits, 2);
    }
}

// =============================================================================
// Initiative policy
// =============================================================================

mod recompute_tests {
    use super::*;

    /// Player team starts faster (5 + 5 vs 8). The enemy ogre kills one
    /// player unit in round 1, dropping the player total to 5.
    fn attrition(recompute: bool) -> crate::orchestrator::CombatOrchestrator {
        let mut arena = empty_arena(6, 6);
        let doomed = spawn_unit(&mut arena, "doomed", &TeamTag::player(), (1, 1), UnitStats::new(5, 1, 0, 5), 4);
        spawn_unit(&mut arena, "survivor", &TeamTag::player(), (4, 4), UnitStats::new(5, 1, 0, 5), 4);
        spawn_unit(&mut arena, "ogre", &TeamTag::enemy(), (1, 2), UnitStats::new(30, 10, 0, 8), 4);
        let config = CombatConfig {
            recompute_initiative_each_round: recompute,
            ..CombatConfig::default()
        };
        let mut combat = start(arena, config);

        let order: Vec<&TeamTag> = combat.initiative_order().map(|t| t.tag()).collect();
        assert_eq!(order, vec![&TeamTag::player(), &TeamTag::enemy()]);

        let end = combat.create_end_turn_action(doomed).unwrap();
        execute(&mut combat, end);
        run_until_player_input(&mut combat, 40);
        assert!(!combat.unit(doomed).unwrap().is_alive());
        assert_eq!(combat.round(), 2);
        combat
    }

    #[test]
    fn order_is_frozen_by_default() {
        let combat = attrition(false);
        let order: Vec<&TeamTag> = combat.initiative_order().map(|t| t.tag()).collect();
        assert_eq!(order, vec![&TeamTag::player(), &TeamTag::enemy()]);
    }

    #[test]
    fn order_follows_living_speed_when_recomputed() {
        let combat = attrition(true);
        let order: Vec<&TeamTag> = combat.initiative_order().map(|t| t.tag()).collect();
        assert_eq!(order, vec![&TeamTag::enemy(), &TeamTag::player()]);

        // Enemy went first in round 2, then handed over to the player.
        let round_two_turns: Vec<TeamTag> = combat
            .pending_events()
            .iter()
            .filter(|r| r.round == 2)
            .filter_map(|r| match &r.event {
                CombatEvent::TeamTurnStarted { team } => Some(team.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(round_two_turns, vec![TeamTag::enemy(), TeamTag::player()]);
    }
}

// =============================================================================
// Events
// =============================================================================

mod event_tests {
    use super::*;

    #[test]
    fn every_transition_is_recorded_in_order() {
        let mut arena = empty_arena(5, 5);
        let hero = spawn_unit(&mut arena, "hero", &TeamTag::player(), (0, 0), UnitStats::new(10, 5, 0, 9), 4);
        spawn_unit(&mut arena, "orc", &TeamTag::enemy(), (4, 4), UnitStats::default(), 4);
        let mut combat = start(arena, CombatConfig::default());

        let wait = combat.create_wait_action(hero).unwrap();
        execute(&mut combat, wait);

        let records = combat.drain_events();
        assert!(records.windows(2).all(|w| w[0].sequence + 1 == w[1].sequence));

        let phases: Vec<(Phase, Phase)> = records
            .iter()
            .filter_map(|r| match r.event {
                CombatEvent::PhaseChanged { from, to } => Some((from, to)),
                _ => None,
            })
            .collect();
        assert_eq!(
            phases,
            vec![
                (Phase::Initialization, Phase::TeamTurn),
                (Phase::TeamTurn, Phase::ActionExecution),
                (Phase::ActionExecution, Phase::EndTurn),
            ]
        );
        assert!(combat.pending_events().is_empty());
    }

    #[test]
    fn messages_render() {
        let mut arena = empty_arena(5, 5);
        let hero = spawn_unit(&mut arena, "hero", &TeamTag::player(), (0, 0), UnitStats::new(10, 5, 0, 9), 4);
        spawn_unit(&mut arena, "orc", &TeamTag::enemy(), (4, 4), UnitStats::default(), 4);
        let mut combat = start(arena, CombatConfig::default());
        let step = combat.create_move_action(hero, GridPosition::new(1, 0)).unwrap();
        assert_eq!(step.to_string(), "hero moves to (1, 0) (1 AP)");
        execute(&mut combat, step);

        let messages: Vec<String> = combat
            .drain_events()
            .iter()
            .map(|r| r.event.to_string())
            .collect();
        assert!(messages.contains(&"Round 1 begins".to_string()));
        assert!(messages.contains(&"Player turn begins".to_string()));
        assert!(messages.contains(&format!("Unit {hero} moves (0, 0) -> (1, 0) (1 AP)")));
    }
}
