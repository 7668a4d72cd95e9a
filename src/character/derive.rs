//! Combat stat deriver
//!
//! Pure mapping from a character record and its class row to the numbers a
//! combat unit fights with. Values are ADDITIVE: base from attributes plus
//! the class modifier, clamped to sane floors.

use serde::{Deserialize, Serialize};

use super::class::{ClassModifier, ClassModifierTable};
use super::Character;

pub const BASE_ACCURACY: i32 = 60;
pub const MAX_ACCURACY: i32 = 100;
pub const BASE_MOBILITY: i32 = 3;

/// Tactical attributes derived once per battle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatStats {
    pub accuracy: u32,
    pub damage: u32,
    pub range: u32,
    pub mobility: u32,
    pub defense: u32,
    pub max_action_points: u32,
}

/// Derive combat stats from a character and an explicit class row
pub fn derive_with_modifier(character: &Character, modifier: &ClassModifier) -> CombatStats {
    let stats = &character.stats;
    let strength = stats.strength as i32;
    let agility = stats.agility as i32;
    let endurance = stats.endurance as i32;

    CombatStats {
        accuracy: (BASE_ACCURACY + agility + modifier.accuracy).clamp(0, MAX_ACCURACY) as u32,
        damage: (strength / 2 + modifier.damage).max(0) as u32,
        range: modifier.range.max(1) as u32,
        mobility: (BASE_MOBILITY + agility / 5 + modifier.mobility).max(1) as u32,
        defense: (endurance / 2 + modifier.defense).max(0) as u32,
        max_action_points: modifier.action_points.max(1),
    }
}

/// Derive combat stats, falling back to a neutral row for unknown classes
pub fn derive_combat_stats(character: &Character, table: &ClassModifierTable) -> CombatStats {
    match table.get(character.class) {
        Some(modifier) => derive_with_modifier(character, modifier),
        None => derive_with_modifier(character, &ClassModifier::neutral(character.class)),
    }
}
