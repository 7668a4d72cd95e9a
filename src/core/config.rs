//! Game configuration with documented constants
//!
//! Every tunable number lives here. Defaults reproduce the stock balance;
//! a TOML file can override any subset of fields.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::character::class::ClassModifierTable;
use crate::core::error::{Result, WarError};

/// Top-level configuration handed to the orchestrator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Master seed for every random roll in the session
    pub seed: u64,
    pub strategic: StrategicConfig,
    pub tactical: TacticalConfig,
    pub classes: ClassModifierTable,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            strategic: StrategicConfig::default(),
            tactical: TacticalConfig::default(),
            classes: ClassModifierTable::default(),
        }
    }
}

/// Per-second accrual rates for one faction's ledger
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ResourceRates {
    pub food: f32,
    pub materials: f32,
    pub fuel: f32,
}

/// Strategic layer tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategicConfig {
    // === CLOCK ===
    /// Fixed update frequency used by `StrategicEngine::advance`
    pub tick_rate_hz: f32,

    // === MOVEMENT ===
    /// Speed of newly created armies (world units per second)
    pub default_speed: f32,

    /// Remaining distance under which an army snaps onto its destination
    pub arrival_epsilon: f32,

    /// Planar distance at which hostile armies engage
    pub encounter_distance: f32,

    /// How far each side falls back after a drawn battle
    pub retreat_distance: f32,

    // === RESOURCES ===
    /// Player ledger grows faster on food to offset the enemy's numbers
    pub player_rates: ResourceRates,
    pub enemy_rates: ResourceRates,

    // === SUPPLY ===
    /// Food consumed per second by every active army
    pub food_decay_rate: f32,

    /// Ammunition lost per second to spoilage and skirmishing
    pub ammo_decay_rate: f32,

    /// Morale rises while food is above this level and falls below it
    pub morale_food_threshold: f32,
    pub morale_recovery_rate: f32,
    pub morale_decay_rate: f32,

    /// Morale under which an army moves at half speed
    pub low_morale_threshold: f32,

    // === POST-BATTLE UPKEEP ===
    pub ammo_per_attack: f32,
    pub victory_morale_bonus: f32,
    pub retreat_morale_loss: f32,
}

impl Default for StrategicConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 60.0,
            default_speed: 5.0,
            arrival_epsilon: 0.5,
            encounter_distance: 3.0,
            retreat_distance: 10.0,
            player_rates: ResourceRates { food: 2.0, materials: 1.0, fuel: 0.5 },
            enemy_rates: ResourceRates { food: 1.5, materials: 1.0, fuel: 0.5 },
            food_decay_rate: 0.5,
            ammo_decay_rate: 0.1,
            morale_food_threshold: 30.0,
            morale_recovery_rate: 1.0,
            morale_decay_rate: 2.0,
            low_morale_threshold: 10.0,
            ammo_per_attack: 2.0,
            victory_morale_bonus: 10.0,
            retreat_morale_loss: 15.0,
        }
    }
}

impl StrategicConfig {
    /// Duration of one fixed tick in seconds
    pub fn tick_duration(&self) -> f32 {
        1.0 / self.tick_rate_hz
    }
}

/// Tactical layer tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TacticalConfig {
    /// Inclusive damage roll range for a single attack
    pub damage_min: i32,
    pub damage_max: i32,

    /// Upper bound of the uniform jitter added to agility for initiative
    pub initiative_jitter: f32,

    /// Distance of each side's deployment line from the battle origin
    pub deployment_offset: f32,

    /// Gap between neighbouring units on a deployment line
    pub deployment_spacing: f32,

    /// Shown to the player as a countdown; the engine never enforces it
    pub turn_time_limit_secs: u32,

    /// Battles that run past this many turns end in a draw
    pub max_turns: Option<u32>,
}

impl Default for TacticalConfig {
    fn default() -> Self {
        Self {
            damage_min: 10,
            damage_max: 25,
            initiative_jitter: 10.0,
            deployment_offset: 5.0,
            deployment_spacing: 2.0,
            turn_time_limit_secs: 30,
            max_turns: None,
        }
    }
}

impl GameConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML text, filling unspecified fields with defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: GameConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file from disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        let s = &self.strategic;
        if s.tick_rate_hz <= 0.0 {
            return Err(WarError::InvalidConfig(format!(
                "tick_rate_hz must be positive (got {})",
                s.tick_rate_hz
            )));
        }
        if s.arrival_epsilon < 0.0 || s.encounter_distance < 0.0 || s.retreat_distance < 0.0 {
            return Err(WarError::InvalidConfig("distances must not be negative".into()));
        }
        if s.default_speed < 0.0 {
            return Err(WarError::InvalidConfig("default_speed must not be negative".into()));
        }

        let t = &self.tactical;
        if t.damage_min > t.damage_max {
            return Err(WarError::InvalidConfig(format!(
                "damage_min ({}) should be <= damage_max ({})",
                t.damage_min, t.damage_max
            )));
        }
        if t.initiative_jitter < 0.0 {
            return Err(WarError::InvalidConfig("initiative_jitter must not be negative".into()));
        }

        if let Some(row) = self.classes.rows().iter().find(|r| r.action_points == 0) {
            return Err(WarError::InvalidConfig(format!(
                "class {:?} grants zero action points",
                row.class
            )));
        }

        Ok(())
    }
}
