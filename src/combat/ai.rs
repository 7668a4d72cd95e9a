//! Simple tactical AI
//!
//! Attack the nearest living opponent while points allow, otherwise wait.
//! Used for enemy turns and for auto-resolving battles.

use ordered_float::OrderedFloat;

use crate::combat::constants::ATTACK_COST;
use crate::combat::state::{CombatAction, CombatState, CombatStatus};
use crate::combat::unit::CombatUnit;

/// Nearest living unit hostile to `unit`
pub fn nearest_opponent<'a>(state: &'a CombatState, unit: &CombatUnit) -> Option<&'a CombatUnit> {
    state
        .units
        .iter()
        .filter(|u| u.is_alive() && u.faction.is_hostile_to(unit.faction))
        .min_by_key(|u| OrderedFloat(u.position.distance(&unit.position)))
}

/// Pick an action for the active unit, or None if the battle is not running
pub fn choose_action(state: &CombatState) -> Option<CombatAction> {
    if state.status != CombatStatus::Active {
        return None;
    }
    let actor = state.active_unit()?;

    match nearest_opponent(state, actor) {
        Some(target) if actor.action_points >= ATTACK_COST => Some(CombatAction::attack(target.id)),
        _ => Some(CombatAction::wait()),
    }
}
