//! Combat orchestrator: the turn and phase state machine.
//!
//! The [`CombatOrchestrator`] owns an [`Arena`] for the length of one
//! encounter and drives it through a fixed cycle of [`Phase`]s:
//!
//! 1. **`TeamTurn`**: the active team is asked for an action. Player teams
//!    wait for [`CombatOrchestrator::submit_action`]; AI teams consult the
//!    [`Controller`]. A team with nobody left able to act ends its turn.
//! 2. **`ActionExecution`**: the pending action is re-validated and applied by
//!    the [`Resolver`] claiming its kind. A refused action goes back to
//!    `TeamTurn` with nothing consumed.
//! 3. **`EndTurn`**: pass-through.
//! 4. **`VictoryCheck`**: ends the encounter, hands control back to the same
//!    team, or moves on to the next team in initiative order, starting a new
//!    round when every team has gone.
//!
//! # Frame stepping
//!
//! [`CombatOrchestrator::update`] never blocks. Each call performs at most
//! one phase transition or one AI decision, so the embedding application can
//! call it once per frame and render between steps. Everything observable is
//! recorded in an event outbox read with
//! [`CombatOrchestrator::drain_events`].
//!
//! # Example
//!
//! ```
//! use skirmish_core::arena::Arena;
//! use skirmish_core::config::CombatConfig;
//! use skirmish_core::entity::{TeamTag, UnitProfile};
//! use skirmish_core::orchestrator::{CombatOrchestrator, Phase};
//! use tessera::{Grid, GridPosition};
//!
//! let mut arena = Arena::new(Grid::new(5, 5, 32).unwrap());
//! let hero = arena.spawn_at(UnitProfile::new("Hero", TeamTag::player()), GridPosition::new(0, 0));
//! arena.spawn_at(UnitProfile::new("Orc", TeamTag::enemy()), GridPosition::new(4, 4));
//!
//! let mut combat = CombatOrchestrator::initialize(arena, CombatConfig::default()).unwrap();
//! assert_eq!(combat.phase(), Phase::TeamTurn);
//!
//! let step = combat.create_move_action(hero, GridPosition::new(0, 2)).unwrap();
//! combat.submit_action(step).unwrap();
//! combat.update(); // TeamTurn -> ActionExecution
//! combat.update(); // ActionExecution -> EndTurn
//!
//! assert_eq!(combat.arena().grid_position(hero), Some(GridPosition::new(0, 2)));
//! assert_eq!(combat.phase(), Phase::EndTurn);
//! ```

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use tessera::GridPosition;
use tracing::{debug, info, warn};

use crate::action::CombatAction;
use crate::ai::{AdjacentStrike, BattleView, Controller};
use crate::arena::Arena;
use crate::config::CombatConfig;
use crate::entity::{Unit, UnitId};
use crate::error::{ActionError, ActionResult, SetupError};
use crate::event::{CombatEvent, EventLog, EventRecord};
use crate::resolver::{
    default_resolvers, plan_attack, plan_move, ready_actor, MoveRecord, ResolveContext,
    Resolution, Resolver,
};
use crate::team::{CombatResult, TeamId, TeamInfo, TeamRoster};

// =============================================================================
// Phase
// =============================================================================

/// Where the encounter is in its turn cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Setup in progress. Never observed after `initialize` returns.
    Initialization,
    /// The active team is choosing an action.
    TeamTurn,
    /// The pending action is being applied.
    ActionExecution,
    /// An action finished.
    EndTurn,
    /// Checking for a winner and picking who goes next.
    VictoryCheck,
    /// The encounter is over.
    Ended,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initialization => write!(f, "Initialization"),
            Self::TeamTurn => write!(f, "TeamTurn"),
            Self::ActionExecution => write!(f, "ActionExecution"),
            Self::EndTurn => write!(f, "EndTurn"),
            Self::VictoryCheck => write!(f, "VictoryCheck"),
            Self::Ended => write!(f, "Ended"),
        }
    }
}

// =============================================================================
// Orchestrator
// =============================================================================

/// Runs one encounter from setup to victory.
pub struct CombatOrchestrator {
    arena: Arena,
    config: CombatConfig,
    roster: TeamRoster,
    phase: Phase,
    result: CombatResult,
    active: bool,
    round: u32,
    active_team: Option<TeamId>,
    active_unit: Option<UnitId>,
    /// Single pending-action slot.
    pending: Option<CombatAction>,
    history: Vec<MoveRecord>,
    events: EventLog,
    /// Checked in order; the first resolver claiming an action's kind wins.
    resolvers: Vec<Box<dyn Resolver>>,
    controller: Box<dyn Controller>,
}

impl fmt::Debug for CombatOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CombatOrchestrator")
            .field("phase", &self.phase)
            .field("round", &self.round)
            .field("active", &self.active)
            .field("result", &self.result)
            .field("active_team", &self.active_team)
            .field("active_unit", &self.active_unit)
            .field("pending", &self.pending)
            .field("arena", &self.arena)
            .field("resolvers", &format!("[{} resolvers]", self.resolvers.len()))
            .field("controller", &self.controller.name())
            .finish_non_exhaustive()
    }
}

impl CombatOrchestrator {
    /// Start an encounter over the units in `arena`.
    ///
    /// Every unit must stand inside the grid on a tile that records it as
    /// the occupant, and carry a team tag. Combat state is attached to every
    /// unit, teams are formed and ordered by total speed, and the first
    /// team's turn begins.
    ///
    /// # Errors
    ///
    /// Returns a [`SetupError`] describing the first problem found.
    pub fn initialize(mut arena: Arena, config: CombatConfig) -> Result<Self, SetupError> {
        for unit in arena.units_sorted() {
            let position = arena.grid().transform().world_to_grid(unit.position);
            let tile = arena.grid().tile_at(position).ok_or(SetupError::UnitOutOfBounds {
                unit: unit.id(),
                position,
            })?;
            if tile.occupant() != Some(unit.id().into()) {
                return Err(SetupError::OccupancyMismatch {
                    unit: unit.id(),
                    position,
                });
            }
        }

        let roster = TeamRoster::build(&arena, &config)?;
        for unit in arena.units_sorted_mut() {
            if let Some(team) = unit.team.clone() {
                unit.attach_combat(team);
            }
        }

        info!(
            units = arena.unit_count(),
            teams = roster.teams().len(),
            "combat initialized"
        );

        let mut orchestrator = Self {
            arena,
            config,
            roster,
            phase: Phase::Initialization,
            result: CombatResult::Ongoing,
            active: true,
            round: 1,
            active_team: None,
            active_unit: None,
            pending: None,
            history: Vec::new(),
            events: EventLog::new(),
            resolvers: default_resolvers(),
            controller: Box::new(AdjacentStrike),
        };
        orchestrator.emit(CombatEvent::RoundStarted { round: 1 });
        if let Some(&first) = orchestrator.roster.order().first() {
            orchestrator.transition(Phase::TeamTurn);
            orchestrator.start_team_turn(first);
        }
        Ok(orchestrator)
    }

    /// Replace the AI controller.
    #[must_use]
    pub fn with_controller(mut self, controller: impl Controller + 'static) -> Self {
        self.controller = Box::new(controller);
        self
    }

    /// Add a resolver. It takes precedence over the ones already present for
    /// the action kinds it handles.
    pub fn add_resolver(&mut self, resolver: Box<dyn Resolver>) {
        self.resolvers.insert(0, resolver);
    }

    /// Number of registered resolvers.
    #[must_use]
    pub fn resolver_count(&self) -> usize {
        self.resolvers.len()
    }

    // -------------------------------------------------------------------------
    // Frame step
    // -------------------------------------------------------------------------

    /// Advance the state machine by one step.
    ///
    /// Performs at most one phase transition or one AI decision. Does nothing
    /// once the encounter has ended.
    pub fn update(&mut self) {
        match self.phase {
            Phase::Initialization | Phase::Ended => {}
            Phase::TeamTurn => self.step_team_turn(),
            Phase::ActionExecution => self.step_action_execution(),
            Phase::EndTurn => self.transition(Phase::VictoryCheck),
            Phase::VictoryCheck => self.step_victory_check(),
        }
    }

    fn step_team_turn(&mut self) {
        if self.pending.is_some() {
            self.transition(Phase::ActionExecution);
            return;
        }
        let Some(team) = self.active_team.and_then(|id| self.roster.get(id)) else {
            self.transition(Phase::VictoryCheck);
            return;
        };
        if !team.has_able_members(&self.arena) {
            self.end_team_turn();
            self.transition(Phase::VictoryCheck);
            return;
        }
        if !team.is_player_controlled() {
            let id = team.id();
            self.run_controller(id);
        }
    }

    fn run_controller(&mut self, team: TeamId) {
        let view = BattleView::new(&self.arena, &self.roster, &self.config);
        let decision = self.controller.decide(&view, team);

        for unit in decision.forfeits {
            if let Some(u) = self.arena.get_mut(unit) {
                u.forfeit();
            }
            debug!(%unit, controller = self.controller.name(), "unit forfeits");
            self.emit(CombatEvent::UnitForfeited { unit });
        }

        match decision.action {
            Some(action) => {
                debug!(%action, "AI action chosen");
                self.pending = Some(action);
                self.transition(Phase::ActionExecution);
            }
            None => {
                self.end_team_turn();
                self.transition(Phase::VictoryCheck);
            }
        }
    }

    fn step_action_execution(&mut self) {
        let Some(action) = self.pending.take() else {
            self.transition(Phase::TeamTurn);
            return;
        };

        match self.execute(&action) {
            Ok(resolution) => {
                info!(%action, round = self.round, "action executed");
                if resolution.ends_team_turn {
                    self.end_team_turn();
                } else {
                    self.refresh_active_unit();
                }
                self.transition(Phase::EndTurn);
            }
            Err(reason) => {
                warn!(%action, %reason, "action rejected");
                self.emit(CombatEvent::ActionRejected {
                    unit: action.actor,
                    reason,
                });
                self.transition(Phase::TeamTurn);
            }
        }
    }

    fn execute(&mut self, action: &CombatAction) -> ActionResult<Resolution> {
        self.check_turn(action.actor)?;
        let resolver = self
            .resolvers
            .iter()
            .find(|r| r.handles().contains(&action.kind))
            .ok_or(ActionError::Unsupported(action.kind))?;
        let mut ctx = ResolveContext {
            arena: &mut self.arena,
            config: &self.config,
            events: &mut self.events,
            history: &mut self.history,
            round: self.round,
        };
        resolver.resolve(action, &mut ctx)
    }

    fn step_victory_check(&mut self) {
        let result = self.roster.evaluate(&self.arena);
        if result.is_terminal() {
            self.finish(result);
            return;
        }

        let still_going = self
            .active_team
            .and_then(|id| self.roster.get(id))
            .is_some_and(|team| !team.completed_this_round);
        if still_going {
            self.transition(Phase::TeamTurn);
            return;
        }

        let next = match self.roster.next_pending() {
            Some(next) => next,
            None => {
                self.start_new_round();
                match self.roster.order().first() {
                    Some(&first) => first,
                    None => return,
                }
            }
        };
        self.transition(Phase::TeamTurn);
        self.start_team_turn(next);
    }

    fn start_new_round(&mut self) {
        self.roster.reset_round();
        self.round += 1;
        if self.config.recompute_initiative_each_round {
            self.roster.recompute_initiative(&self.arena);
            debug!(order = ?self.roster.order(), "initiative recomputed");
        }
        info!(round = self.round, "round started");
        self.emit(CombatEvent::RoundStarted { round: self.round });
    }

    fn start_team_turn(&mut self, id: TeamId) {
        let Some(team) = self.roster.get_mut(id) else {
            return;
        };
        team.active = true;
        let tag = team.tag().clone();
        let members = team.members().to_vec();
        for member in members {
            if let Some(unit) = self.arena.get_mut(member) {
                unit.begin_turn();
            }
        }
        self.active_team = Some(id);
        self.active_unit = None;

        debug!(team = %tag, round = self.round, "team turn started");
        self.emit(CombatEvent::TeamTurnStarted { team: tag });
        self.refresh_active_unit();
    }

    fn end_team_turn(&mut self) {
        let Some(team) = self.active_team.and_then(|id| self.roster.get_mut(id)) else {
            return;
        };
        team.active = false;
        team.completed_this_round = true;
        let tag = team.tag().clone();
        self.active_unit = None;

        debug!(team = %tag, round = self.round, "team turn ended");
        self.emit(CombatEvent::TeamTurnEnded { team: tag });
    }

    fn finish(&mut self, result: CombatResult) {
        if let Some(team) = self.active_team.and_then(|id| self.roster.get_mut(id)) {
            team.active = false;
        }
        let winner = match result {
            CombatResult::Victory(id) => self.roster.get(id).map(|t| t.tag().clone()),
            CombatResult::Ongoing | CombatResult::Draw => None,
        };

        self.result = result;
        self.active = false;
        self.pending = None;
        self.active_unit = None;

        info!(?result, winner = ?winner, round = self.round, "combat ended");
        self.emit(CombatEvent::CombatEnded { result, winner });
        self.transition(Phase::Ended);
    }

    /// Keep the player cursor on a unit that can still act.
    fn refresh_active_unit(&mut self) {
        let Some(team) = self.active_team.and_then(|id| self.roster.get(id)) else {
            return;
        };
        if !team.is_player_controlled() {
            return;
        }
        if self
            .active_unit
            .and_then(|id| self.arena.get(id))
            .is_some_and(Unit::can_act)
        {
            return;
        }
        let next = team
            .members()
            .iter()
            .copied()
            .find(|&id| self.arena.get(id).is_some_and(Unit::can_act));
        self.active_unit = next;
        if let Some(unit) = next {
            self.emit(CombatEvent::ActiveUnitChanged { unit });
        }
    }

    fn transition(&mut self, to: Phase) {
        let from = self.phase;
        self.phase = to;
        debug!(%from, %to, round = self.round, "phase changed");
        self.emit(CombatEvent::PhaseChanged { from, to });
    }

    fn emit(&mut self, event: CombatEvent) {
        self.events.record(self.round, event);
    }

    // -------------------------------------------------------------------------
    // Validation helpers
    // -------------------------------------------------------------------------

    fn ensure_active(&self) -> ActionResult<()> {
        if self.active {
            Ok(())
        } else {
            Err(ActionError::CombatInactive)
        }
    }

    /// The actor's team must be the active team.
    fn check_turn(&self, actor: UnitId) -> ActionResult<&TeamInfo> {
        self.ensure_active()?;
        let unit = self.arena.get(actor).ok_or(ActionError::UnknownUnit(actor))?;
        let team = self
            .active_team
            .and_then(|id| self.roster.get(id))
            .ok_or(ActionError::NotActorsTurn(actor))?;
        if unit.team() != Some(team.tag()) {
            return Err(ActionError::NotActorsTurn(actor));
        }
        Ok(team)
    }

    fn routed_validate(&self, action: &CombatAction) -> ActionResult<()> {
        self.resolvers
            .iter()
            .find(|r| r.handles().contains(&action.kind))
            .ok_or(ActionError::Unsupported(action.kind))?
            .validate(action, &self.arena, &self.config)
    }

    fn unit_name(&self, id: UnitId) -> &str {
        self.arena.get(id).map_or("Unit", |u| u.name.as_str())
    }

    // -------------------------------------------------------------------------
    // Action factories
    // -------------------------------------------------------------------------

    /// Build a validated move of `actor` to `to`.
    ///
    /// # Errors
    ///
    /// Returns why the move is illegal right now.
    pub fn create_move_action(&self, actor: UnitId, to: GridPosition) -> ActionResult<CombatAction> {
        self.check_turn(actor)?;
        Ok(plan_move(&self.arena, &self.config, actor, to)?.into_action(&self.arena))
    }

    /// Build a validated attack by `actor` on `target`.
    ///
    /// # Errors
    ///
    /// Returns why the attack is illegal right now.
    pub fn create_attack_action(
        &self,
        actor: UnitId,
        target: UnitId,
    ) -> ActionResult<CombatAction> {
        self.check_turn(actor)?;
        Ok(plan_attack(&self.arena, &self.config, actor, target)?.into_action(&self.arena))
    }

    /// Build a wait that finishes only `actor`.
    ///
    /// # Errors
    ///
    /// Returns why `actor` cannot wait right now.
    pub fn create_wait_action(&self, actor: UnitId) -> ActionResult<CombatAction> {
        self.check_turn(actor)?;
        let description = format!("{} waits", self.unit_name(actor));
        let action = CombatAction::wait(actor, false, description);
        self.routed_validate(&action)?;
        Ok(action)
    }

    /// Build an end-turn action. For player teams it finishes the whole team
    /// when `end_turn_ends_player_team` is set; otherwise it behaves like a
    /// wait.
    ///
    /// # Errors
    ///
    /// Returns why `actor` cannot end the turn right now.
    pub fn create_end_turn_action(&self, actor: UnitId) -> ActionResult<CombatAction> {
        let team = self.check_turn(actor)?;
        let whole_team = team.is_player_controlled() && self.config.end_turn_ends_player_team;
        let description = if whole_team {
            format!("{} ends the turn", team.tag())
        } else {
            format!("{} waits", self.unit_name(actor))
        };
        let action = CombatAction::wait(actor, whole_team, description);
        self.routed_validate(&action)?;
        Ok(action)
    }

    // -------------------------------------------------------------------------
    // Player input
    // -------------------------------------------------------------------------

    /// Queue a player action for execution on a following `update`.
    ///
    /// Only structural checks happen here; the action itself is validated
    /// again when it executes.
    ///
    /// # Errors
    ///
    /// [`ActionError::CombatInactive`], [`ActionError::NotAwaitingInput`],
    /// [`ActionError::ActionPending`], [`ActionError::NotActorsTurn`] or
    /// [`ActionError::AiControlled`].
    pub fn submit_action(&mut self, action: CombatAction) -> ActionResult<()> {
        self.ensure_active()?;
        if self.phase != Phase::TeamTurn {
            return Err(ActionError::NotAwaitingInput(self.phase));
        }
        if self.pending.is_some() {
            return Err(ActionError::ActionPending);
        }
        let team = self.check_turn(action.actor)?;
        if !team.is_player_controlled() {
            return Err(ActionError::AiControlled(action.actor));
        }
        debug!(%action, "action submitted");
        self.pending = Some(action);
        Ok(())
    }

    /// Point the player cursor at `unit`.
    ///
    /// # Errors
    ///
    /// Returns why `unit` cannot be selected: it is not on the active team,
    /// its team is AI-controlled ([`ActionError::AiControlled`]) or it cannot
    /// act.
    pub fn select_unit(&mut self, unit: UnitId) -> ActionResult<()> {
        if !self.check_turn(unit)?.is_player_controlled() {
            return Err(ActionError::AiControlled(unit));
        }
        ready_actor(&self.arena, unit)?;
        if self.active_unit != Some(unit) {
            self.active_unit = Some(unit);
            self.emit(CombatEvent::ActiveUnitChanged { unit });
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Team whose turn it is.
    #[must_use]
    pub fn active_team(&self) -> Option<&TeamInfo> {
        self.active_team.and_then(|id| self.roster.get(id))
    }

    /// Unit under the player cursor.
    #[must_use]
    pub const fn active_unit(&self) -> Option<UnitId> {
        self.active_unit
    }

    /// Round number, starting at 1.
    #[must_use]
    pub const fn round(&self) -> u32 {
        self.round
    }

    /// Outcome so far.
    #[must_use]
    pub const fn result(&self) -> CombatResult {
        self.result
    }

    /// False once the encounter has ended.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// All teams, indexed by [`TeamId`].
    #[must_use]
    pub fn teams(&self) -> &[TeamInfo] {
        self.roster.teams()
    }

    /// Teams in initiative order.
    pub fn initiative_order(&self) -> impl Iterator<Item = &TeamInfo> + '_ {
        self.roster
            .order()
            .iter()
            .filter_map(|&id| self.roster.get(id))
    }

    /// The queued action, if any.
    #[must_use]
    pub const fn pending_action(&self) -> Option<&CombatAction> {
        self.pending.as_ref()
    }

    /// Completed moves, oldest first.
    #[must_use]
    pub fn movement_history(&self) -> &[MoveRecord] {
        &self.history
    }

    /// Units and grid.
    #[must_use]
    pub const fn arena(&self) -> &Arena {
        &self.arena
    }

    /// Encounter rules.
    #[must_use]
    pub const fn config(&self) -> &CombatConfig {
        &self.config
    }

    /// A single unit.
    #[must_use]
    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.arena.get(id)
    }

    /// Tiles `unit` could move to right now.
    ///
    /// The range is the number of tiles its AP pays for, capped by its legacy
    /// movement budget. Empty for units that cannot act.
    #[must_use]
    pub fn reachable_tiles(&self, unit: UnitId) -> BTreeSet<GridPosition> {
        let Some(u) = self.arena.get(unit).filter(|u| u.can_act()) else {
            return BTreeSet::new();
        };
        let grid = self.arena.grid();
        let mut range = match self.config.move_cost_per_tile {
            0 => grid.width().saturating_add(grid.height()),
            cost => u.current_action_points() / cost,
        };
        if let Some(budget) = u.movement {
            range = range.min(budget.remaining);
        }
        let from = grid.transform().world_to_grid(u.position);
        grid.reachable_within(from, range)
    }

    /// Remove and return every event recorded since the last drain.
    pub fn drain_events(&mut self) -> Vec<EventRecord> {
        self.events.drain()
    }

    /// Events recorded since the last drain, without removing them.
    #[must_use]
    pub fn pending_events(&self) -> &[EventRecord] {
        self.events.pending()
    }

    /// End the encounter and give the arena back.
    #[must_use]
    pub fn into_arena(self) -> Arena {
        self.arena
    }
}
