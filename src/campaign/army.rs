//! Armies and squads on the strategic map
//!
//! An army is an ordered list of squads with a position, movement orders
//! and a supply train. Squads reference character records; casualties
//! remove those references and nothing else.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::character::{Character, CharacterId};
use crate::core::types::{Faction, Vec2};

/// Starting and maximum value of every supply stock
pub const SUPPLY_CAP: f32 = 100.0;

/// Squads at or under this many units count as damaged
pub const DAMAGED_SQUAD_SIZE: usize = 2;

/// Unique identifier for an army
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ArmyId(pub u32);

/// Unique identifier for a squad
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SquadId(pub u32);

/// Lifecycle of an army. Only the orchestrator changes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArmyStatus {
    Active,
    Engaged,
    Retreating,
    Destroyed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SquadStatus {
    Healthy,
    Damaged,
    Depleted,
}

impl SquadStatus {
    /// Status is a pure function of how many units remain
    pub fn for_unit_count(count: usize) -> Self {
        match count {
            0 => SquadStatus::Depleted,
            n if n <= DAMAGED_SQUAD_SIZE => SquadStatus::Damaged,
            _ => SquadStatus::Healthy,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Formation {
    #[default]
    Line,
    Column,
    Wedge,
    Skirmish,
}

/// A sub-group of an army's units
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Squad {
    pub id: SquadId,
    pub name: String,
    pub units: Vec<Character>,
    pub formation: Formation,
    pub status: SquadStatus,
    pub experience: u32,
}

impl Squad {
    pub fn new(id: SquadId, name: impl Into<String>, units: Vec<Character>) -> Self {
        let status = SquadStatus::for_unit_count(units.len());
        Self {
            id,
            name: name.into(),
            units,
            formation: Formation::default(),
            status,
            experience: 0,
        }
    }

    pub fn with_formation(mut self, formation: Formation) -> Self {
        self.formation = formation;
        self
    }

    /// Drop every unit whose id is in `casualties`. Returns how many were removed.
    pub fn remove_units(&mut self, casualties: &HashSet<CharacterId>) -> usize {
        let before = self.units.len();
        self.units.retain(|u| !casualties.contains(&u.id));
        self.refresh_status();
        before - self.units.len()
    }

    pub fn refresh_status(&mut self) {
        self.status = SquadStatus::for_unit_count(self.units.len());
    }

    pub fn is_depleted(&self) -> bool {
        self.status == SquadStatus::Depleted
    }
}

/// Movement orders and speed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovementState {
    /// Base speed in world units per second
    pub speed: f32,
    pub destination: Option<Vec2>,
    pub path: Vec<Vec2>,
    pub is_moving: bool,
    /// Halves speed until the army is resupplied
    pub supply_penalty: bool,
}

impl MovementState {
    pub fn new(speed: f32) -> Self {
        Self {
            speed,
            destination: None,
            path: Vec::new(),
            is_moving: false,
            supply_penalty: false,
        }
    }

    pub fn effective_speed(&self) -> f32 {
        if self.supply_penalty {
            self.speed * 0.5
        } else {
            self.speed
        }
    }

    pub fn clear(&mut self) {
        self.destination = None;
        self.path.clear();
        self.is_moving = false;
    }
}

/// Supply train carried by an army
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Supplies {
    pub food: f32,
    pub ammunition: f32,
    pub morale: f32,
}

impl Default for Supplies {
    fn default() -> Self {
        Self {
            food: SUPPLY_CAP,
            ammunition: SUPPLY_CAP,
            morale: SUPPLY_CAP,
        }
    }
}

/// An army on the strategic map
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Army {
    pub id: ArmyId,
    pub position: Vec2,
    pub faction: Faction,
    pub squads: Vec<Squad>,
    pub movement: MovementState,
    pub supplies: Supplies,
    pub status: ArmyStatus,
}

impl Army {
    pub fn new(id: ArmyId, squads: Vec<Squad>, position: Vec2, faction: Faction, speed: f32) -> Self {
        Self {
            id,
            position,
            faction,
            squads,
            movement: MovementState::new(speed),
            supplies: Supplies::default(),
            status: ArmyStatus::Active,
        }
    }

    /// Straight-line orders toward `destination`
    pub fn order_move_to(&mut self, destination: Vec2) {
        self.movement.destination = Some(destination);
        self.movement.path = vec![destination];
        self.movement.is_moving = true;
    }

    pub fn halt(&mut self) {
        self.movement.clear();
    }

    pub fn is_active(&self) -> bool {
        self.status == ArmyStatus::Active
    }

    /// Armies that integrate movement this tick
    pub fn can_move(&self) -> bool {
        matches!(self.status, ArmyStatus::Active | ArmyStatus::Retreating) && self.movement.is_moving
    }

    pub fn unit_count(&self) -> usize {
        self.squads.iter().map(|s| s.units.len()).sum()
    }

    pub fn units(&self) -> impl Iterator<Item = &Character> {
        self.squads.iter().flat_map(|s| s.units.iter())
    }

    /// Remove casualties from every squad. Returns total units removed.
    pub fn remove_casualties(&mut self, casualties: &HashSet<CharacterId>) -> usize {
        self.squads.iter_mut().map(|s| s.remove_units(casualties)).sum()
    }

    /// Drop depleted squads, returning their ids
    pub fn prune_depleted(&mut self) -> Vec<SquadId> {
        let pruned: Vec<SquadId> = self.squads.iter().filter(|s| s.is_depleted()).map(|s| s.id).collect();
        self.squads.retain(|s| !s.is_depleted());
        pruned
    }
}
