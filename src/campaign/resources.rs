//! Faction resource ledgers

use serde::{Deserialize, Serialize};

use crate::core::config::ResourceRates;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceLedger {
    pub food: f32,
    pub materials: f32,
    pub fuel: f32,
}

impl ResourceLedger {
    /// Grow every stock by `rates * dt`. Stocks never shrink here.
    pub fn accrue(&mut self, rates: &ResourceRates, dt: f32) {
        self.food += rates.food.max(0.0) * dt;
        self.materials += rates.materials.max(0.0) * dt;
        self.fuel += rates.fuel.max(0.0) * dt;
    }

    /// Withdraw food and materials together, or nothing at all
    pub fn spend(&mut self, food: f32, materials: f32) -> bool {
        if food > self.food || materials > self.materials {
            return false;
        }
        self.food -= food;
        self.materials -= materials;
        true
    }
}
