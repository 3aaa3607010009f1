//! # Skirmish Core
//!
//! Turn-based tactical combat on a square grid.
//!
//! This crate runs a single encounter between two or more teams of units
//! standing on a [`tessera::Grid`]. Teams act in initiative order, units
//! spend action points to move and attack, and the encounter ends when only
//! one team (or nobody) is left standing.
//!
//! ## Architecture
//!
//! - **Arena**: the grid plus every unit on it ([`arena::Arena`])
//! - **Teams**: grouping, initiative and victory evaluation ([`team`])
//! - **Actions**: validated requests to move, attack or wait ([`action`])
//! - **Resolvers**: check-then-apply execution per action kind ([`resolver`])
//! - **Controller**: the enemy AI, reading a read-only view ([`ai`])
//! - **Orchestrator**: the frame-stepped phase machine ([`orchestrator`])
//!
//! Everything observable is recorded as a typed [`event::CombatEvent`] in an
//! outbox the embedding application drains each frame.
//!
//! ## Usage
//!
//! ```
//! use skirmish_core::{Arena, CombatConfig, CombatOrchestrator, TeamTag, UnitProfile};
//! use tessera::{Grid, GridPosition};
//!
//! let mut arena = Arena::new(Grid::new(8, 8, 32).unwrap());
//! let hero = arena.spawn_at(UnitProfile::new("Hero", TeamTag::player()), GridPosition::new(0, 0));
//! arena.spawn_at(UnitProfile::new("Orc", TeamTag::enemy()), GridPosition::new(7, 7));
//!
//! let mut combat = CombatOrchestrator::initialize(arena, CombatConfig::default()).unwrap();
//! let end = combat.create_end_turn_action(hero).unwrap();
//! combat.submit_action(end).unwrap();
//!
//! for _ in 0..10 {
//!     combat.update();
//! }
//! for record in combat.drain_events() {
//!     println!("{}", record.event);
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod action;
pub mod ai;
pub mod arena;
pub mod config;
pub mod entity;
pub mod error;
pub mod event;
pub mod orchestrator;
pub mod resolver;
pub mod team;

#[cfg(test)]
mod tests;

pub use action::{ActionKind, CombatAction};
pub use ai::{AdjacentStrike, AiDecision, BattleView, Controller};
pub use arena::Arena;
pub use config::{CombatConfig, DefeatPolicy};
pub use entity::{TeamTag, Unit, UnitId, UnitProfile};
pub use error::{ActionError, ActionResult, SetupError};
pub use event::{CombatEvent, EventLog, EventRecord};
pub use orchestrator::{CombatOrchestrator, Phase};
pub use resolver::{MoveRecord, Resolver};
pub use team::{CombatResult, TeamId, TeamInfo, TeamRoster};
