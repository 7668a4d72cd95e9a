//! Character records supplied by the character provider
//!
//! Records are immutable from the simulation's point of view: squads hold
//! copies and casualty removal only drops them from squad membership.

pub mod class;
pub mod derive;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use class::{CharacterClass, ClassModifier, ClassModifierTable};
pub use derive::{derive_combat_stats, derive_with_modifier, CombatStats};

/// Unique identifier for a character record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CharacterId(pub Uuid);

impl CharacterId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CharacterId {
    fn default() -> Self {
        Self::new()
    }
}

/// Primary attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterStats {
    pub strength: u32,
    pub agility: u32,
    pub intelligence: u32,
    pub endurance: u32,
}

impl Default for CharacterStats {
    fn default() -> Self {
        Self { strength: 10, agility: 10, intelligence: 10, endurance: 10 }
    }
}

/// A character as delivered by the provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub id: CharacterId,
    pub name: String,
    pub class: CharacterClass,
    pub stats: CharacterStats,
    pub health: u32,
    pub max_health: u32,
}

impl Character {
    pub fn new(name: impl Into<String>, class: CharacterClass) -> Self {
        Self {
            id: CharacterId::new(),
            name: name.into(),
            class,
            stats: CharacterStats::default(),
            health: 100,
            max_health: 100,
        }
    }

    pub fn with_stats(mut self, stats: CharacterStats) -> Self {
        self.stats = stats;
        self
    }

    pub fn with_health(mut self, health: u32, max_health: u32) -> Self {
        self.health = health.min(max_health);
        self.max_health = max_health;
        self
    }
}
