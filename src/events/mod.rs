//! Notifications emitted by the simulation
//!
//! Engines push `GameEvent`s into an outbox; the orchestrator drains them
//! and publishes on the `EventBus`. Subscriptions are keyed by `EventKind`,
//! so adding a variant without a kind fails to compile.

pub mod bus;

use serde::{Deserialize, Serialize};

use crate::campaign::army::ArmyId;
use crate::campaign::resources::ResourceLedger;
use crate::combat::state::{ActionRecord, VictoryStatus};
use crate::combat::unit::CombatUnitId;
use crate::core::types::{BattleId, Faction, Vec2};
use crate::orchestrator::GameMode;

pub use bus::{EventBus, EventHandler, EventRecorder, SubscriptionId};

/// Discriminant used to subscribe to one category of event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    ArmyCreated,
    ArmyMoved,
    ArmyReachedDestination,
    ArmyRallied,
    ArmyDestroyed,
    ArmyResupplied,
    SupplyPenaltyApplied,
    ResourcesUpdated,
    ArmiesEngaged,
    CombatInitiated,
    TacticalBattleReady,
    ModeChanged,
    StateUpdated,
    TurnStarted,
    ActionExecuted,
    UnitEliminated,
    CombatEnded,
    CombatResolved,
    StrategicPaused,
    StrategicResumed,
}

/// A notification with its payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum GameEvent {
    // Strategic layer
    ArmyCreated { army: ArmyId, faction: Faction, position: Vec2 },
    ArmyMoved { army: ArmyId, position: Vec2 },
    ArmyReachedDestination { army: ArmyId, position: Vec2 },
    ArmyRallied { army: ArmyId },
    ArmyDestroyed { army: ArmyId },
    ArmyResupplied { army: ArmyId, food: f32, ammunition: f32 },
    SupplyPenaltyApplied { army: ArmyId },
    ResourcesUpdated { player: ResourceLedger, enemy: ResourceLedger },
    ArmiesEngaged { army_a: ArmyId, army_b: ArmyId, position: Vec2 },
    StrategicPaused,
    StrategicResumed,

    // Mode transitions
    ModeChanged { from: GameMode, to: GameMode },
    CombatInitiated { battle: BattleId, army_a: ArmyId, army_b: ArmyId },
    TacticalBattleReady { battle: BattleId, units: usize },
    CombatResolved { battle: BattleId, outcome: VictoryStatus, casualties: usize, destroyed: Vec<ArmyId> },

    // Tactical layer
    StateUpdated { battle: BattleId },
    TurnStarted { battle: BattleId, unit: CombatUnitId, turn_number: u32 },
    ActionExecuted { battle: BattleId, record: ActionRecord },
    UnitEliminated { battle: BattleId, unit: CombatUnitId },
    CombatEnded { battle: BattleId, outcome: VictoryStatus },
}

impl GameEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            GameEvent::ArmyCreated { .. } => EventKind::ArmyCreated,
            GameEvent::ArmyMoved { .. } => EventKind::ArmyMoved,
            GameEvent::ArmyReachedDestination { .. } => EventKind::ArmyReachedDestination,
            GameEvent::ArmyRallied { .. } => EventKind::ArmyRallied,
            GameEvent::ArmyDestroyed { .. } => EventKind::ArmyDestroyed,
            GameEvent::ArmyResupplied { .. } => EventKind::ArmyResupplied,
            GameEvent::SupplyPenaltyApplied { .. } => EventKind::SupplyPenaltyApplied,
            GameEvent::ResourcesUpdated { .. } => EventKind::ResourcesUpdated,
            GameEvent::ArmiesEngaged { .. } => EventKind::ArmiesEngaged,
            GameEvent::StrategicPaused => EventKind::StrategicPaused,
            GameEvent::StrategicResumed => EventKind::StrategicResumed,
            GameEvent::ModeChanged { .. } => EventKind::ModeChanged,
            GameEvent::CombatInitiated { .. } => EventKind::CombatInitiated,
            GameEvent::TacticalBattleReady { .. } => EventKind::TacticalBattleReady,
            GameEvent::CombatResolved { .. } => EventKind::CombatResolved,
            GameEvent::StateUpdated { .. } => EventKind::StateUpdated,
            GameEvent::TurnStarted { .. } => EventKind::TurnStarted,
            GameEvent::ActionExecuted { .. } => EventKind::ActionExecuted,
            GameEvent::UnitEliminated { .. } => EventKind::UnitEliminated,
            GameEvent::CombatEnded { .. } => EventKind::CombatEnded,
        }
    }
}
