//! Attack resolver.
//!
//! Melee only: the target must stand on an orthogonally adjacent tile.
//! Damage is `attack - defense / defense_divisor`, never less than
//! [`MIN_DAMAGE`].

use crate::action::{ActionKind, CombatAction};
use crate::arena::Arena;
use crate::config::{CombatConfig, DefeatPolicy};
use crate::entity::UnitId;
use crate::error::{ActionError, ActionResult};
use crate::event::CombatEvent;

use super::{combatant, ensure_flagged_valid, ready_actor, ResolveContext, Resolution, Resolver};

/// Maximum Manhattan distance between attacker and target.
pub const ATTACK_RANGE: u32 = 1;

/// Every successful hit deals at least this much.
pub const MIN_DAMAGE: u32 = 1;

/// Damage dealt by `attack` against `defense`.
///
/// A zero divisor is treated as 1.
///
/// ```
/// use skirmish_core::resolver::damage;
///
/// assert_eq!(damage(10, 4, 1), 6);
/// assert_eq!(damage(10, 30, 1), 1);
/// assert_eq!(damage(10, 8, 2), 6);
/// ```
#[must_use]
pub fn damage(attack: u32, defense: u32, defense_divisor: u32) -> u32 {
    let mitigation = defense / defense_divisor.max(1);
    attack.saturating_sub(mitigation).max(MIN_DAMAGE)
}

/// An attack that passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttackPlan {
    /// Attacking unit
    pub attacker: UnitId,
    /// Target unit
    pub target: UnitId,
    /// Damage the hit will deal
    pub damage: u32,
    /// AP the attack costs
    pub cost: u32,
}

impl AttackPlan {
    /// Turn the plan into a submittable action.
    #[must_use]
    pub fn into_action(self, arena: &Arena) -> CombatAction {
        let name = |id| arena.get(id).map_or("Unit", |u| u.name.as_str());
        let description = format!(
            "{} attacks {} for {} damage",
            name(self.attacker),
            name(self.target),
            self.damage
        );
        CombatAction::attack(self.attacker, self.target, self.cost, description)
    }
}

/// Validate an attack by `attacker` on `target` against the current state.
///
/// # Errors
///
/// Returns the first failed check as an [`ActionError`].
pub fn plan_attack(
    arena: &Arena,
    config: &CombatConfig,
    attacker: UnitId,
    target: UnitId,
) -> ActionResult<AttackPlan> {
    let striker = ready_actor(arena, attacker)?;
    let victim = combatant(arena, target)?;
    if !victim.is_alive() {
        return Err(ActionError::TargetDefeated(target));
    }
    if !striker.is_hostile_to(victim) {
        return Err(ActionError::FriendlyTarget { attacker, target });
    }

    let transform = arena.grid().transform();
    let distance = transform
        .world_to_grid(striker.position)
        .manhattan(transform.world_to_grid(victim.position));
    if distance > ATTACK_RANGE {
        return Err(ActionError::OutOfRange {
            distance,
            range: ATTACK_RANGE,
        });
    }

    let cost = config.attack_cost;
    let available = striker.current_action_points();
    if available < cost {
        return Err(ActionError::InsufficientActionPoints {
            unit: attacker,
            required: cost,
            available,
        });
    }

    Ok(AttackPlan {
        attacker,
        target,
        damage: damage(striker.stats.attack, victim.stats.defense, config.defense_divisor),
        cost,
    })
}

/// Resolver for [`ActionKind::Attack`].
#[derive(Debug, Clone, Default)]
pub struct AttackResolver;

impl AttackResolver {
    /// Creates a new attack resolver.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn check(
        action: &CombatAction,
        arena: &Arena,
        config: &CombatConfig,
    ) -> ActionResult<AttackPlan> {
        ensure_flagged_valid(action)?;
        let target = action
            .target_unit
            .ok_or(ActionError::MissingTarget(ActionKind::Attack))?;
        let plan = plan_attack(arena, config, action.actor, target)?;
        if action.cost != plan.cost {
            return Err(ActionError::CostMismatch {
                expected: plan.cost,
                submitted: action.cost,
            });
        }
        Ok(plan)
    }
}

impl Resolver for AttackResolver {
    fn handles(&self) -> &[ActionKind] {
        &[ActionKind::Attack]
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

        let (defeated, remaining_health, fell_at) = match ctx.arena.get_mut(plan.target) {
            Some(victim) => {
                let defeated = victim.take_damage(plan.damage);
                (defeated, victim.stats.health, victim.position)
            }
            None => return Err(ActionError::UnknownUnit(plan.target)),
        };
        if let Some(ap) = ctx
            .arena
            .get_mut(plan.attacker)
            .and_then(|u| u.action_points.as_mut())
        {
            ap.spend(plan.cost);
        }

        tracing::debug!(
            attacker = %plan.attacker,
            target = %plan.target,
            damage = plan.damage,
            remaining_health,
            "unit attacked"
        );
        ctx.emit(CombatEvent::UnitAttacked {
            attacker: plan.attacker,
            target: plan.target,
            damage: plan.damage,
            remaining_health,
        });

        if defeated {
            ctx.emit(CombatEvent::UnitDefeated { unit: plan.target });
            if ctx.config.defeat_policy == DefeatPolicy::Vacate {
                let grid = ctx.arena.grid_mut();
                let tile = grid.transform().world_to_grid(fell_at);
                let holds_target = grid
                    .tile_at(tile)
                    .and_then(tessera::Tile::occupant)
                    .is_some_and(|o| UnitId::from(o) == plan.target);
                if holds_target {
                    grid.set_occupied(tile, None)?;
                }
            }
        }

        Ok(Resolution::default())
    }
}
