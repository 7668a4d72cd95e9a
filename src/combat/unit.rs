//! Combat units: the tactical projection of a character
//!
//! A unit lives exactly as long as its battle.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::character::{derive_combat_stats, Character, CharacterId, ClassModifierTable, CombatStats};
use crate::combat::constants::WOUNDED_HEALTH_RATIO;
use crate::core::types::{Faction, Vec2};

/// Unique identifier for a unit within one battle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CombatUnitId(pub u32);

/// Where a unit stands in the current round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TurnState {
    #[default]
    Pending,
    Acted,
    Dead,
}

/// Health bracket, derived from current health
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitCondition {
    Healthy,
    Wounded,
    Dead,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusEffect {
    /// Set by the defend action. Mitigation is up to whoever reads it.
    Defending,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombatUnit {
    pub id: CombatUnitId,
    pub source: CharacterId,
    pub name: String,
    pub faction: Faction,
    pub position: Vec2,

    pub health: i32,
    pub max_health: i32,
    pub action_points: u32,
    pub max_action_points: u32,
    pub stats: CombatStats,

    pub turn_state: TurnState,
    pub effects: Vec<StatusEffect>,

    /// Agility plus jitter, read once when turn order is fixed
    pub initiative: f32,
}

impl CombatUnit {
    /// Build a unit from a character record and the class table.
    ///
    /// Initiative is `agility + uniform(0, jitter)`.
    pub fn from_character<R: Rng>(
        id: CombatUnitId,
        character: &Character,
        faction: Faction,
        position: Vec2,
        classes: &ClassModifierTable,
        initiative_jitter: f32,
        rng: &mut R,
    ) -> Self {
        let stats = derive_combat_stats(character, classes);
        let jitter = if initiative_jitter > 0.0 {
            rng.gen_range(0.0..=initiative_jitter)
        } else {
            0.0
        };
        let health = character.health as i32;

        Self {
            id,
            source: character.id,
            name: character.name.clone(),
            faction,
            position,
            health,
            max_health: character.max_health as i32,
            action_points: stats.max_action_points,
            max_action_points: stats.max_action_points,
            stats,
            turn_state: if health > 0 { TurnState::Pending } else { TurnState::Dead },
            effects: Vec::new(),
            initiative: character.stats.agility as f32 + jitter,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.turn_state != TurnState::Dead
    }

    pub fn condition(&self) -> UnitCondition {
        if !self.is_alive() {
            UnitCondition::Dead
        } else if (self.health as f32) <= self.max_health as f32 * WOUNDED_HEALTH_RATIO {
            UnitCondition::Wounded
        } else {
            UnitCondition::Healthy
        }
    }

    /// Subtract damage. Returns true if this blow killed the unit.
    pub fn apply_damage(&mut self, amount: i32) -> bool {
        if !self.is_alive() {
            return false;
        }
        self.health -= amount.max(0);
        if self.health <= 0 {
            self.turn_state = TurnState::Dead;
            self.action_points = 0;
            return true;
        }
        false
    }

    pub fn has_effect(&self, effect: StatusEffect) -> bool {
        self.effects.contains(&effect)
    }

    pub fn add_effect(&mut self, effect: StatusEffect) {
        if !self.has_effect(effect) {
            self.effects.push(effect);
        }
    }

    pub fn clear_effect(&mut self, effect: StatusEffect) {
        self.effects.retain(|e| *e != effect);
    }
}
