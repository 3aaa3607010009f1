//! Encounter configuration.

use serde::{Deserialize, Serialize};

use crate::entity::TeamTag;

/// What happens to a unit's tile when its health reaches zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DefeatPolicy {
    /// The body stays where it fell and keeps blocking the tile.
    #[default]
    Tombstone,
    /// The tile is released immediately.
    Vacate,
}

/// Rules for a single encounter.
///
/// Every field has a default, so partial configs deserialize cleanly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// AP charged per tile of Manhattan distance moved
    pub move_cost_per_tile: u32,
    /// AP charged per attack
    pub attack_cost: u32,
    /// Defense is divided by this before being subtracted from attack
    pub defense_divisor: u32,
    /// Tile handling for defeated units
    pub defeat_policy: DefeatPolicy,
    /// Recompute team initiative from living members at each new round.
    /// Off by default: team order is fixed when the encounter starts.
    pub recompute_initiative_each_round: bool,
    /// Teams driven by external input; all others are AI controlled
    pub player_teams: Vec<TeamTag>,
    /// A player end-turn action finishes the whole team, not just the unit
    pub end_turn_ends_player_team: bool,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            move_cost_per_tile: 1,
            attack_cost: 2,
            defense_divisor: 1,
            defeat_policy: DefeatPolicy::default(),
            recompute_initiative_each_round: false,
            player_teams: vec![TeamTag::player()],
            end_turn_ends_player_team: true,
        }
    }
}

impl CombatConfig {
    /// Whether units of `team` wait for external input.
    #[must_use]
    pub fn is_player_team(&self, team: &TeamTag) -> bool {
        self.player_teams.contains(team)
    }
}
