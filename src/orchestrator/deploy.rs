//! Battle assembly: turn two armies' squads into combat units
//!
//! The first army deploys on the -x side of the local origin, the second
//! on the +x side, each in a single line along z.

use rand::Rng;

use crate::campaign::army::Army;
use crate::combat::unit::{CombatUnit, CombatUnitId};
use crate::core::config::GameConfig;
use crate::core::error::{Result, WarError};
use crate::core::types::Vec2;

/// True if the army has at least one living character to field
pub fn has_deployable_units(army: &Army) -> bool {
    army.units().any(|c| c.health > 0)
}

/// Position of slot `index` out of `count` on a line at `x`
fn line_slot(x: f32, index: usize, count: usize, spacing: f32) -> Vec2 {
    let centre = (count.saturating_sub(1)) as f32 * 0.5;
    Vec2::new(x, (index as f32 - centre) * spacing)
}

/// Derive every combat unit for a battle between `first` and `second`.
///
/// Fails before building anything if either side has nobody to deploy.
pub fn deploy_armies<R: Rng>(first: &Army, second: &Army, config: &GameConfig, rng: &mut R) -> Result<Vec<CombatUnit>> {
    for army in [first, second] {
        if !has_deployable_units(army) {
            return Err(WarError::EmptyDeployment(army.id));
        }
    }

    let tactical = &config.tactical;
    let mut units = Vec::with_capacity(first.unit_count() + second.unit_count());
    let mut next_id = 1;

    for (army, side) in [(first, -1.0), (second, 1.0)] {
        let count = army.unit_count();
        for (index, character) in army.units().enumerate() {
            let position = line_slot(side * tactical.deployment_offset, index, count, tactical.deployment_spacing);
            units.push(CombatUnit::from_character(
                CombatUnitId(next_id),
                character,
                army.faction,
                position,
                &config.classes,
                tactical.initiative_jitter,
                rng,
            ));
            next_id += 1;
        }
    }

    Ok(units)
}
