//! Combat event outbox.
//!
//! The orchestrator records everything observable that happens during an
//! encounter as a [`CombatEvent`] in an [`EventLog`]. The embedding
//! application drains the log each frame and renders the events however it
//! likes; every event also formats as a human-readable message through
//! `Display`.
//!
//! # Example
//!
//! ```
//! use skirmish_core::event::{CombatEvent, EventLog};
//!
//! let mut log = EventLog::new();
//! log.record(1, CombatEvent::RoundStarted { round: 1 });
//!
//! let records = log.drain();
//! assert_eq!(records.len(), 1);
//! assert_eq!(records[0].event.to_string(), "Round 1 begins");
//! assert!(log.is_empty());
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use tessera::GridPosition;

use crate::entity::{TeamTag, UnitId};
use crate::error::ActionError;
use crate::orchestrator::Phase;
use crate::team::CombatResult;

/// Something that happened during the encounter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombatEvent {
    /// The phase machine moved.
    PhaseChanged {
        /// Previous phase
        from: Phase,
        /// New phase
        to: Phase,
    },
    /// A new round began.
    RoundStarted {
        /// Round number, starting at 1
        round: u32,
    },
    /// A team's turn began.
    TeamTurnStarted {
        /// Team tag
        team: TeamTag,
    },
    /// A team's turn ended.
    TeamTurnEnded {
        /// Team tag
        team: TeamTag,
    },
    /// The active player unit changed.
    ActiveUnitChanged {
        /// New active unit
        unit: UnitId,
    },
    /// A unit moved.
    UnitMoved {
        /// Mover
        unit: UnitId,
        /// Origin
        from: GridPosition,
        /// Destination
        to: GridPosition,
        /// AP spent
        cost: u32,
    },
    /// A unit attacked.
    UnitAttacked {
        /// Attacker
        attacker: UnitId,
        /// Target
        target: UnitId,
        /// Damage dealt
        damage: u32,
        /// Target health afterwards
        remaining_health: u32,
    },
    /// A unit's health reached zero.
    UnitDefeated {
        /// Defeated unit
        unit: UnitId,
    },
    /// A unit finished its turn voluntarily.
    UnitWaited {
        /// Unit
        unit: UnitId,
    },
    /// An AI unit had nothing to do and gave up its turn.
    UnitForfeited {
        /// Unit
        unit: UnitId,
    },
    /// An action was refused.
    ActionRejected {
        /// Acting unit
        unit: UnitId,
        /// Why
        reason: ActionError,
    },
    /// The encounter is over.
    CombatEnded {
        /// Final result
        result: CombatResult,
        /// Winning team, if any
        winner: Option<TeamTag>,
    },
}

impl fmt::Display for CombatEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PhaseChanged { from, to } => write!(f, "Phase {from} -> {to}"),
            Self::RoundStarted { round } => write!(f, "Round {round} begins"),
            Self::TeamTurnStarted { team } => write!(f, "{team} turn begins"),
            Self::TeamTurnEnded { team } => write!(f, "{team} turn ends"),
            Self::ActiveUnitChanged { unit } => write!(f, "Unit {unit} is ready"),
            Self::UnitMoved { unit, from, to, cost } => {
                write!(f, "Unit {unit} moves {from} -> {to} ({cost} AP)")
            }
            Self::UnitAttacked {
                attacker,
                target,
                damage,
                remaining_health,
            } => write!(
                f,
                "Unit {attacker} hits unit {target} for {damage} ({remaining_health} HP left)"
            ),
            Self::UnitDefeated { unit } => write!(f, "Unit {unit} is defeated"),
            Self::UnitWaited { unit } => write!(f, "Unit {unit} waits"),
            Self::UnitForfeited { unit } => write!(f, "Unit {unit} holds position"),
            Self::ActionRejected { unit, reason } => {
                write!(f, "Unit {unit} cannot do that: {reason}")
            }
            Self::CombatEnded { winner: Some(team), .. } => write!(f, "{team} is victorious"),
            Self::CombatEnded { winner: None, .. } => write!(f, "No one is left standing"),
        }
    }
}

/// An event with its ordering metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Position in the encounter's event stream, starting at 0
    pub sequence: u64,
    /// Round during which the event happened
    pub round: u32,
    /// The event
    pub event: CombatEvent,
}

/// Ordered outbox of events waiting to be drained.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLog {
    records: Vec<EventRecord>,
    next_sequence: u64,
}

impl EventLog {
    /// Empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event.
    pub fn record(&mut self, round: u32, event: CombatEvent) {
        tracing::debug!(sequence = self.next_sequence, round, %event, "combat event");
        self.records.push(EventRecord {
            sequence: self.next_sequence,
            round,
            event,
        });
        self.next_sequence += 1;
    }

    /// Remove and return every pending record, oldest first.
    pub fn drain(&mut self) -> Vec<EventRecord> {
        std::mem::take(&mut self.records)
    }

    /// Pending records without removing them.
    #[must_use]
    pub fn pending(&self) -> &[EventRecord] {
        &self.records
    }

    /// Number of pending records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
