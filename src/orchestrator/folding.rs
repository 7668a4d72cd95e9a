//! Folding a finished battle back into the strategic registry
//!
//! Casualties are the dead units, grouped by faction and matched back to
//! squads through their source character. Winner returns to active, loser
//! is destroyed, a draw sends both sides into retreat.

use std::collections::{HashMap, HashSet};

use tracing::{debug, info};

use crate::campaign::army::{ArmyId, ArmyStatus, SUPPLY_CAP};
use crate::campaign::engine::StrategicGameState;
use crate::character::CharacterId;
use crate::combat::state::{ActionKind, CombatState};
use crate::core::config::StrategicConfig;
use crate::core::types::{Faction, Vec2};

/// What folding did to the registry
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FoldSummary {
    /// Dead units across both sides
    pub casualties: usize,
    /// Armies removed from the registry
    pub destroyed: Vec<ArmyId>,
    /// Armies now falling back
    pub retreating: Vec<ArmyId>,
}

fn casualties_by_faction(combat: &CombatState) -> HashMap<Faction, HashSet<CharacterId>> {
    let mut dead: HashMap<Faction, HashSet<CharacterId>> = HashMap::new();
    for unit in combat.casualties() {
        dead.entry(unit.faction).or_default().insert(unit.source);
    }
    dead
}

fn attacks_by_faction(combat: &CombatState) -> HashMap<Faction, u32> {
    let mut attacks = HashMap::new();
    for record in &combat.action_history {
        if !matches!(record.action.kind, ActionKind::Attack { .. }) {
            continue;
        }
        if let Some(actor) = combat.unit(record.actor) {
            *attacks.entry(actor.faction).or_insert(0) += 1;
        }
    }
    attacks
}

/// Fallback direction when both armies stand on the same spot
fn default_retreat_direction(faction: Faction) -> Vec2 {
    match faction {
        Faction::Enemy => Vec2::new(1.0, 0.0),
        Faction::Player | Faction::Neutral => Vec2::new(-1.0, 0.0),
    }
}

/// Apply a completed battle to the two armies that fought it
pub fn fold_battle(
    state: &mut StrategicGameState,
    combat: &CombatState,
    armies: [ArmyId; 2],
    config: &StrategicConfig,
) -> FoldSummary {
    let outcome = combat.victory.status;
    let dead = casualties_by_faction(combat);
    let attacks = attacks_by_faction(combat);
    let positions: Vec<Option<Vec2>> = armies.iter().map(|id| state.army(*id).map(|a| a.position)).collect();

    let mut summary = FoldSummary {
        casualties: combat.casualties().count(),
        ..Default::default()
    };

    for (i, id) in armies.iter().enumerate() {
        let opponent_position = positions[1 - i];
        let Some(army) = state.armies.get_mut(id) else {
            continue;
        };
        let faction = army.faction;

        let removed = dead.get(&faction).map_or(0, |ids| army.remove_casualties(ids));
        let pruned = army.prune_depleted();
        debug!(army = id.0, removed, pruned = pruned.len(), "casualties applied");

        let spent = attacks.get(&faction).copied().unwrap_or(0) as f32 * config.ammo_per_attack;
        army.supplies.ammunition = (army.supplies.ammunition - spent).max(0.0);
        for squad in &mut army.squads {
            squad.experience += 1;
        }

        army.status = match outcome.winner() {
            Some(winner) if winner == faction => ArmyStatus::Active,
            Some(_) => ArmyStatus::Destroyed,
            None => ArmyStatus::Retreating,
        };
        if army.squads.is_empty() {
            army.status = ArmyStatus::Destroyed;
        }

        match army.status {
            ArmyStatus::Active => {
                army.supplies.morale = (army.supplies.morale + config.victory_morale_bonus).min(SUPPLY_CAP);
            }
            ArmyStatus::Retreating => {
                army.supplies.morale = (army.supplies.morale - config.retreat_morale_loss).max(0.0);
                let away = opponent_position
                    .map(|p| (army.position - p).normalize())
                    .filter(|d| d.length() > 0.0)
                    .unwrap_or_else(|| default_retreat_direction(faction));
                army.halt();
                army.order_move_to(army.position + away * config.retreat_distance);
                summary.retreating.push(*id);
            }
            ArmyStatus::Destroyed => summary.destroyed.push(*id),
            ArmyStatus::Engaged => {}
        }
    }

    for id in &summary.destroyed {
        state.armies.remove(id);
        info!(army = id.0, "army destroyed");
    }

    summary
}
