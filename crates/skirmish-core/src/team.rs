//! Team coordination: grouping, initiative order, round bookkeeping and
//! victory evaluation.
//!
//! Team records live in a [`TeamRoster`] indexed by [`TeamId`]. The
//! initiative order is a separate list of ids, computed once at setup and
//! reused every round (unless the recompute policy is switched on).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::arena::Arena;
use crate::config::CombatConfig;
use crate::entity::{TeamTag, UnitId};
use crate::error::SetupError;

/// Stable index of a team inside a [`TeamRoster`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TeamId(usize);

impl TeamId {
    /// Raw index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "team#{}", self.0)
    }
}

/// Who decides a team's actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Control {
    /// Actions arrive from outside through `submit_action`.
    Player,
    /// The orchestrator's controller picks actions.
    Ai,
}

/// Per-team encounter record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamInfo {
    id: TeamId,
    tag: TeamTag,
    control: Control,
    members: Vec<UnitId>,
    /// Sum of member speed, fixed at setup unless recomputed by policy.
    pub total_speed: u32,
    /// This team's turn is in progress.
    pub active: bool,
    /// This team already had its turn in the current round.
    pub completed_this_round: bool,
}

impl TeamInfo {
    /// Roster index.
    #[must_use]
    pub const fn id(&self) -> TeamId {
        self.id
    }

    /// Team tag.
    #[must_use]
    pub fn tag(&self) -> &TeamTag {
        &self.tag
    }

    /// Player or AI.
    #[must_use]
    pub const fn control(&self) -> Control {
        self.control
    }

    /// Whether actions come from outside.
    #[must_use]
    pub fn is_player_controlled(&self) -> bool {
        self.control == Control::Player
    }

    /// Members in spawn order. Fixed for the encounter; defeated units stay.
    #[must_use]
    pub fn members(&self) -> &[UnitId] {
        &self.members
    }

    /// Whether any member is still alive.
    #[must_use]
    pub fn has_living_members(&self, arena: &Arena) -> bool {
        self.members
            .iter()
            .any(|&id| arena.get(id).is_some_and(crate::entity::Unit::is_alive))
    }

    /// Whether any member can still act.
    #[must_use]
    pub fn has_able_members(&self, arena: &Arena) -> bool {
        self.members
            .iter()
            .any(|&id| arena.get(id).is_some_and(crate::entity::Unit::can_act))
    }
}

/// Outcome of the encounter so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CombatResult {
    /// Two or more teams still have living members.
    #[default]
    Ongoing,
    /// Only this team has living members.
    Victory(TeamId),
    /// Nobody is left standing.
    Draw,
}

impl CombatResult {
    /// Whether the encounter is over.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Ongoing)
    }
}

/// All teams of an encounter plus their initiative order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRoster {
    teams: Vec<TeamInfo>,
    order: Vec<TeamId>,
}

impl TeamRoster {
    /// Partition the arena's units into teams and order them by initiative.
    ///
    /// Teams are created in order of first appearance (ascending unit id).
    ///
    /// # Errors
    ///
    /// [`SetupError::MissingTeam`] for a unit without a tag, and
    /// [`SetupError::InsufficientTeams`] when fewer than two teams exist.
    pub fn build(arena: &Arena, config: &CombatConfig) -> Result<Self, SetupError> {
        let mut teams: Vec<TeamInfo> = Vec::new();

        for unit in arena.units_sorted() {
            let tag = unit.team().ok_or(SetupError::MissingTeam(unit.id()))?;
            let index = match teams.iter().position(|t| &t.tag == tag) {
                Some(index) => index,
                None => {
                    let control = if config.is_player_team(tag) {
                        Control::Player
                    } else {
                        Control::Ai
                    };
                    teams.push(TeamInfo {
                        id: TeamId(teams.len()),
                        tag: tag.clone(),
                        control,
                        members: Vec::new(),
                        total_speed: 0,
                        active: false,
                        completed_this_round: false,
                    });
                    teams.len() - 1
                }
            };
            let team = &mut teams[index];
            team.members.push(unit.id());
            team.total_speed = team.total_speed.saturating_add(unit.stats.speed);
        }

        if teams.len() < 2 {
            return Err(SetupError::InsufficientTeams { found: teams.len() });
        }

        let mut roster = Self {
            order: teams.iter().map(TeamInfo::id).collect(),
            teams,
        };
        roster.sort_order();
        Ok(roster)
    }

    /// Stable sort of the current order by descending total speed.
    fn sort_order(&mut self) {
        let teams = &self.teams;
        self.order
            .sort_by(|a, b| teams[b.0].total_speed.cmp(&teams[a.0].total_speed));
    }

    /// Recompute every team's total speed from its living members and
    /// re-sort the order. Ties keep their previous relative order.
    pub fn recompute_initiative(&mut self, arena: &Arena) {
        for team in &mut self.teams {
            team.total_speed = team
                .members
                .iter()
                .filter_map(|&id| arena.get(id))
                .filter(|u| u.is_alive())
                .fold(0u32, |sum, u| sum.saturating_add(u.stats.speed));
        }
        self.sort_order();
    }

    /// All teams, indexed by [`TeamId`].
    #[must_use]
    pub fn teams(&self) -> &[TeamInfo] {
        &self.teams
    }

    /// Initiative order.
    #[must_use]
    pub fn order(&self) -> &[TeamId] {
        &self.order
    }

    /// Team record by id.
    #[must_use]
    pub fn get(&self, id: TeamId) -> Option<&TeamInfo> {
        self.teams.get(id.0)
    }

    /// Mutable team record by id.
    pub fn get_mut(&mut self, id: TeamId) -> Option<&mut TeamInfo> {
        self.teams.get_mut(id.0)
    }

    /// Team carrying `tag`.
    #[must_use]
    pub fn find(&self, tag: &TeamTag) -> Option<&TeamInfo> {
        self.teams.iter().find(|t| &t.tag == tag)
    }

    /// First team in initiative order that has not had its turn this round.
    #[must_use]
    pub fn next_pending(&self) -> Option<TeamId> {
        self.order
            .iter()
            .copied()
            .find(|&id| !self.teams[id.0].completed_this_round)
    }

    /// Clear every team's completion flag for a new round.
    pub fn reset_round(&mut self) {
        for team in &mut self.teams {
            team.completed_this_round = false;
        }
    }

    /// Pure victory check over unit health.
    #[must_use]
    pub fn evaluate(&self, arena: &Arena) -> CombatResult {
        let mut standing = self.teams.iter().filter(|t| t.has_living_members(arena));
        match (standing.next(), standing.next()) {
            (None, _) => CombatResult::Draw,
            (Some(winner), None) => CombatResult::Victory(winner.id),
            (Some(_), Some(_)) => CombatResult::Ongoing,
        }
    }
}
