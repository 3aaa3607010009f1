//! Movement resolver.
//!
//! Moves are priced by Manhattan distance, not by path length: a unit pays
//! `distance * move_cost_per_tile` AP to step from its tile to any passable,
//! unoccupied tile. Units carrying a legacy [`MovementBudget`] must also have
//! enough tiles left in it.
//!
//! [`MovementBudget`]: crate::entity::components::MovementBudget

use serde::{Deserialize, Serialize};
use tessera::GridPosition;

use crate::action::{ActionKind, CombatAction};
use crate::arena::Arena;
use crate::config::CombatConfig;
use crate::error::{ActionError, ActionResult};
use crate::event::CombatEvent;
use crate::entity::UnitId;

use super::{ensure_flagged_valid, ready_actor, ResolveContext, Resolution, Resolver};

/// One completed move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    /// Mover
    pub unit: UnitId,
    /// Origin tile
    pub from: GridPosition,
    /// Destination tile
    pub to: GridPosition,
    /// Round the move happened in
    pub round: u32,
}

/// A move that passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovePlan {
    /// Mover
    pub actor: UnitId,
    /// Current tile
    pub from: GridPosition,
    /// Destination tile
    pub to: GridPosition,
    /// Manhattan distance travelled
    pub distance: u32,
    /// AP the move costs
    pub cost: u32,
}

impl MovePlan {
    /// Turn the plan into a submittable action.
    #[must_use]
    pub fn into_action(self, arena: &Arena) -> CombatAction {
        let name = arena.get(self.actor).map_or("Unit", |u| u.name.as_str());
        let description = format!("{name} moves to {} ({} AP)", self.to, self.cost);
        CombatAction::movement(self.actor, self.to, self.cost, description)
    }
}

/// Validate a move of `actor` to `to` against the current state.
///
/// Checks run in a fixed order so that the reported reason is stable: the
/// actor may act, the target is inside the grid, differs from the current
/// tile, is passable and unoccupied, and finally the AP and legacy movement
/// budgets cover the distance.
///
/// # Errors
///
/// Returns the first failed check as an [`ActionError`].
pub fn plan_move(
    arena: &Arena,
    config: &CombatConfig,
    actor: UnitId,
    to: GridPosition,
) -> ActionResult<MovePlan> {
    let unit = ready_actor(arena, actor)?;
    let grid = arena.grid();
    let from = grid.transform().world_to_grid(unit.position);

    let tile = grid.tile_at(to).ok_or(ActionError::OutOfBounds(to))?;
    if to == from {
        return Err(ActionError::AlreadyAtPosition(to));
    }
    if !tile.is_terrain_passable() {
        return Err(ActionError::Impassable {
            position: to,
            terrain: tile.terrain(),
        });
    }
    if let Some(occupant) = tile.occupant() {
        return Err(ActionError::Occupied {
            position: to,
            occupant: occupant.into(),
        });
    }

    let distance = from.manhattan(to);
    let cost = distance.saturating_mul(config.move_cost_per_tile);
    let available = unit.current_action_points();
    if available < cost {
        return Err(ActionError::InsufficientActionPoints {
            unit: actor,
            required: cost,
            available,
        });
    }
    if let Some(budget) = unit.movement {
        if budget.remaining < distance {
            return Err(ActionError::InsufficientMovement {
                unit: actor,
                required: distance,
                available: budget.remaining,
            });
        }
    }

    Ok(MovePlan {
        actor,
        from,
        to,
        distance,
        cost,
    })
}

/// Resolver for [`ActionKind::Move`].
///
/// # Example
///
/// ```
/// use skirmish_core::action::ActionKind;
/// use skirmish_core::resolver::{MovementResolver, Resolver};
///
/// let resolver = MovementResolver::new();
/// assert!(resolver.handles().contains(&ActionKind::Move));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MovementResolver;

impl MovementResolver {
    /// Creates a new movement resolver.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn check(action: &CombatAction, arena: &Arena, config: &CombatConfig) -> ActionResult<MovePlan> {
        ensure_flagged_valid(action)?;
        let to = action
            .target_position
            .ok_or(ActionError::MissingTarget(ActionKind::Move))?;
        let plan = plan_move(arena, config, action.actor, to)?;
        if action.cost != plan.cost {
            return Err(ActionError::CostMismatch {
                expected: plan.cost,
                submitted: action.cost,
            });
        }
        Ok(plan)
    }
}

impl Resolver for MovementResolver {
    fn handles(&self) -> &[ActionKind] {
        &[ActionKind::Move]
    }

    fn validate(
        &self,
        action: &CombatAction,
        arena: &Arena,
        config: &CombatConfig,
    ) -> ActionResult<()> {
        Self::check(action, arena, config).map(|_| ())
    }

    fn resolve(
        &self,
        action: &CombatAction,
        ctx: &mut ResolveContext<'_>,
    ) -> ActionResult<Resolution> {
        let plan = Self::check(action, ctx.arena, ctx.config)?;

        // Both tiles were bounds-checked above, so the writes cannot fail.
        let grid = ctx.arena.grid_mut();
        grid.set_occupied(plan.from, None)?;
        grid.set_occupied(plan.to, Some(plan.actor.into()))?;
        let world = grid.transform().grid_to_world(plan.to);

        if let Some(unit) = ctx.arena.get_mut(plan.actor) {
            unit.position = world;
            if let Some(budget) = unit.movement.as_mut() {
                budget.remaining = budget.remaining.saturating_sub(plan.distance);
            }
            if let Some(ap) = unit.action_points.as_mut() {
                ap.spend(plan.cost);
            }
        }

        ctx.history.push(MoveRecord {
            unit: plan.actor,
            from: plan.from,
            to: plan.to,
            round: ctx.round,
        });
        tracing::debug!(unit = %plan.actor, from = %plan.from, to = %plan.to, cost = plan.cost, "unit moved");
        ctx.emit(CombatEvent::UnitMoved {
            unit: plan.actor,
            from: plan.from,
            to: plan.to,
            cost: plan.cost,
        });

        Ok(Resolution::default())
    }
}
