//! Tactical layer: turn-based, action-point combat between individual units

pub mod ai;
pub mod constants;
pub mod engine;
pub mod state;
pub mod unit;

pub use engine::TacticalEngine;
pub use state::{
    ActionKind, ActionOutcome, ActionRecord, CombatAction, CombatState, CombatStatus, TurnInfo, TurnPhase,
    Victory, VictoryCondition, VictoryStatus,
};
pub use unit::{CombatUnit, CombatUnitId, StatusEffect, TurnState, UnitCondition};
