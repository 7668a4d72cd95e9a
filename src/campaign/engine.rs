//! Strategic simulation engine
//!
//! Each tick: movement -> encounter detection -> resource accrual -> supply decay
//!
//! Ticks are delta-time based. `advance` feeds wall time through a fixed-step
//! accumulator so results do not depend on how often the caller updates.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use super::army::{Army, ArmyId, ArmyStatus, Squad, SUPPLY_CAP};
use super::resources::ResourceLedger;
use crate::core::config::StrategicConfig;
use crate::core::types::{Faction, Vec2};
use crate::events::GameEvent;

/// Everything the strategic layer owns
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StrategicGameState {
    pub armies: BTreeMap<ArmyId, Army>,
    pub player_resources: ResourceLedger,
    pub enemy_resources: ResourceLedger,
    /// Simulated seconds, excluding paused time
    pub elapsed: f64,
    pub paused: bool,
    next_army_id: u32,
}

impl StrategicGameState {
    pub fn army(&self, id: ArmyId) -> Option<&Army> {
        self.armies.get(&id)
    }

    pub fn ledger(&self, faction: Faction) -> Option<&ResourceLedger> {
        match faction {
            Faction::Player => Some(&self.player_resources),
            Faction::Enemy => Some(&self.enemy_resources),
            Faction::Neutral => None,
        }
    }

    fn ledger_mut(&mut self, faction: Faction) -> Option<&mut ResourceLedger> {
        match faction {
            Faction::Player => Some(&mut self.player_resources),
            Faction::Enemy => Some(&mut self.enemy_resources),
            Faction::Neutral => None,
        }
    }
}

pub struct StrategicEngine {
    config: StrategicConfig,
    state: StrategicGameState,
    accumulator: f32,
    encounter_this_tick: bool,
    events: Vec<GameEvent>,
}

impl StrategicEngine {
    pub fn new(config: StrategicConfig) -> Self {
        Self {
            config,
            state: StrategicGameState {
                next_army_id: 1,
                ..Default::default()
            },
            accumulator: 0.0,
            encounter_this_tick: false,
            events: Vec::new(),
        }
    }

    pub fn config(&self) -> &StrategicConfig {
        &self.config
    }

    pub fn state(&self) -> &StrategicGameState {
        &self.state
    }

    /// Direct registry access for folding battle results back in.
    /// Only the orchestrator calls this, and only while the engine is paused.
    pub(crate) fn state_mut(&mut self) -> &mut StrategicGameState {
        &mut self.state
    }

    pub fn army(&self, id: ArmyId) -> Option<&Army> {
        self.state.armies.get(&id)
    }

    /// Take all events emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Register a new army with default supplies
    pub fn spawn_army(&mut self, squads: Vec<Squad>, position: Vec2, faction: Faction) -> ArmyId {
        let id = ArmyId(self.state.next_army_id);
        self.state.next_army_id += 1;

        let army = Army::new(id, squads, position, faction, self.config.default_speed);
        info!(army = id.0, ?faction, units = army.unit_count(), "army created");
        self.state.armies.insert(id, army);
        self.events.push(GameEvent::ArmyCreated { army: id, faction, position });
        id
    }

    /// Order an active army toward `destination`
    pub fn move_army(&mut self, id: ArmyId, destination: Vec2) -> bool {
        let Some(army) = self.state.armies.get_mut(&id) else {
            return false;
        };
        if !army.is_active() {
            return false;
        }
        army.order_move_to(destination);
        debug!(army = id.0, x = destination.x, z = destination.z, "move ordered");
        true
    }

    /// Cancel an active army's movement orders
    pub fn halt_army(&mut self, id: ArmyId) -> bool {
        match self.state.armies.get_mut(&id) {
            Some(army) if army.is_active() => {
                army.halt();
                true
            }
            _ => false,
        }
    }

    /// Restock an active army from its faction's ledger.
    ///
    /// Food comes out of the food stock, ammunition out of materials. Amounts
    /// are capped at what the army can carry. Clears the speed penalty once
    /// the army has food and acceptable morale again.
    pub fn resupply_army(&mut self, id: ArmyId, food: f32, ammunition: f32) -> bool {
        let Some(army) = self.state.armies.get(&id) else {
            return false;
        };
        if !army.is_active() || food < 0.0 || ammunition < 0.0 {
            return false;
        }
        let faction = army.faction;
        let food = food.min(SUPPLY_CAP - army.supplies.food);
        let ammunition = ammunition.min(SUPPLY_CAP - army.supplies.ammunition);

        let Some(ledger) = self.state.ledger_mut(faction) else {
            return false;
        };
        if !ledger.spend(food, ammunition) {
            return false;
        }

        let low_morale = self.config.low_morale_threshold;
        let Some(army) = self.state.armies.get_mut(&id) else {
            return false;
        };
        army.supplies.food += food;
        army.supplies.ammunition += ammunition;
        if army.movement.supply_penalty && army.supplies.food > 0.0 && army.supplies.morale >= low_morale {
            army.movement.supply_penalty = false;
            info!(army = id.0, "supply penalty lifted");
        }
        self.events.push(GameEvent::ArmyResupplied { army: id, food, ammunition });
        true
    }

    pub fn pause(&mut self) {
        if !self.state.paused {
            self.state.paused = true;
            self.accumulator = 0.0;
            self.events.push(GameEvent::StrategicPaused);
            debug!("strategic layer paused");
        }
    }

    pub fn resume(&mut self) {
        if self.state.paused {
            self.state.paused = false;
            self.events.push(GameEvent::StrategicResumed);
            debug!("strategic layer resumed");
        }
    }

    pub fn is_paused(&self) -> bool {
        self.state.paused
    }

    /// Feed wall-clock time through the fixed-step accumulator.
    ///
    /// Stops early after a tick that produced an encounter so the caller can
    /// hand off before another tick runs. Returns the number of ticks run.
    pub fn advance(&mut self, elapsed: f32) -> u32 {
        if self.state.paused {
            return 0;
        }
        let step = self.config.tick_duration();
        self.accumulator += elapsed.max(0.0);

        let mut ticks = 0;
        while self.accumulator >= step && !self.state.paused {
            self.accumulator -= step;
            self.tick(step);
            ticks += 1;
            if self.encounter_this_tick {
                break;
            }
        }
        ticks
    }

    /// Run one strategic tick of `dt` seconds
    pub fn tick(&mut self, dt: f32) {
        if self.state.paused {
            return;
        }
        self.encounter_this_tick = false;

        self.update_movement(dt);
        self.detect_encounter();
        self.accrue_resources(dt);
        self.update_supplies(dt);

        self.state.elapsed += dt as f64;
    }

    fn update_movement(&mut self, dt: f32) {
        let epsilon = self.config.arrival_epsilon;

        for army in self.state.armies.values_mut().filter(|a| a.can_move()) {
            let Some(destination) = army.movement.destination else {
                army.movement.clear();
                continue;
            };

            let to_target = destination - army.position;
            let distance = to_target.length();
            let step = army.movement.effective_speed() * dt;

            if step >= distance {
                army.position = destination;
            } else if step > 0.0 {
                army.position = army.position + to_target.normalize() * step;
            }

            if step > 0.0 {
                trace!(army = army.id.0, x = army.position.x, z = army.position.z, "army moved");
                self.events.push(GameEvent::ArmyMoved {
                    army: army.id,
                    position: army.position,
                });
            }

            if army.position.distance(&destination) < epsilon {
                army.position = destination;
                army.movement.clear();
                debug!(army = army.id.0, "army reached destination");
                self.events.push(GameEvent::ArmyReachedDestination {
                    army: army.id,
                    position: destination,
                });
            }
        }
    }

    /// Emit at most one engagement per tick
    fn detect_encounter(&mut self) {
        let range = self.config.encounter_distance;
        let active: Vec<&Army> = self.state.armies.values().filter(|a| a.is_active()).collect();

        for (i, a) in active.iter().enumerate() {
            for b in active.iter().skip(i + 1) {
                if !a.faction.is_hostile_to(b.faction) {
                    continue;
                }
                if a.position.distance(&b.position) <= range {
                    let position = a.position.midpoint(&b.position);
                    info!(army_a = a.id.0, army_b = b.id.0, "armies engaged");
                    self.events.push(GameEvent::ArmiesEngaged {
                        army_a: a.id,
                        army_b: b.id,
                        position,
                    });
                    self.encounter_this_tick = true;
                    return;
                }
            }
        }
    }

    fn accrue_resources(&mut self, dt: f32) {
        self.state.player_resources.accrue(&self.config.player_rates, dt);
        self.state.enemy_resources.accrue(&self.config.enemy_rates, dt);
        self.events.push(GameEvent::ResourcesUpdated {
            player: self.state.player_resources,
            enemy: self.state.enemy_resources,
        });
    }

    fn update_supplies(&mut self, dt: f32) {
        let cfg = &self.config;

        for army in self.state.armies.values_mut().filter(|a| a.status == ArmyStatus::Active) {
            let supplies = &mut army.supplies;
            supplies.food = (supplies.food - cfg.food_decay_rate * dt).max(0.0);
            supplies.ammunition = (supplies.ammunition - cfg.ammo_decay_rate * dt).max(0.0);

            if supplies.food > cfg.morale_food_threshold {
                supplies.morale = (supplies.morale + cfg.morale_recovery_rate * dt).min(SUPPLY_CAP);
            } else {
                supplies.morale = (supplies.morale - cfg.morale_decay_rate * dt).max(0.0);
            }

            let starving = supplies.food <= 0.0 || supplies.morale < cfg.low_morale_threshold;
            if starving && !army.movement.supply_penalty {
                army.movement.supply_penalty = true;
                warn!(army = army.id.0, food = supplies.food, morale = supplies.morale, "supply penalty applied");
                self.events.push(GameEvent::SupplyPenaltyApplied { army: army.id });
            }
        }
    }
}
