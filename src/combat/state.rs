//! Battle state: turn bookkeeping, action log and victory tracking

use serde::{Deserialize, Serialize};

use crate::combat::constants::{ATTACK_COST, DEFEND_COST, MOVE_COST};
use crate::combat::unit::{CombatUnit, CombatUnitId};
use crate::core::types::{BattleId, CampaignId, Faction, Vec2};

/// Battle lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CombatStatus {
    #[default]
    Setup,
    Active,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnPhase {
    Action,
    Ended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VictoryStatus {
    #[default]
    Ongoing,
    PlayerVictory,
    EnemyVictory,
    Draw,
}

impl VictoryStatus {
    /// Faction that won, if any
    pub fn winner(&self) -> Option<Faction> {
        match self {
            VictoryStatus::PlayerVictory => Some(Faction::Player),
            VictoryStatus::EnemyVictory => Some(Faction::Enemy),
            VictoryStatus::Ongoing | VictoryStatus::Draw => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VictoryCondition {
    /// A side wins when no opposing unit is left alive
    EliminateOpposition,
    /// The battle is a draw once this many turns have been played
    TurnLimit(u32),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Victory {
    pub conditions: Vec<VictoryCondition>,
    pub status: VictoryStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ActionKind {
    Move { to: Vec2 },
    Attack { target: CombatUnitId },
    Defend,
    /// Spends every remaining point, ending the turn
    Wait,
}

/// A request from the active unit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CombatAction {
    pub kind: ActionKind,
    pub cost: u32,
}

impl CombatAction {
    pub fn new(kind: ActionKind, cost: u32) -> Self {
        Self { kind, cost }
    }

    pub fn move_to(to: Vec2) -> Self {
        Self::new(ActionKind::Move { to }, MOVE_COST)
    }

    pub fn attack(target: CombatUnitId) -> Self {
        Self::new(ActionKind::Attack { target }, ATTACK_COST)
    }

    pub fn defend() -> Self {
        Self::new(ActionKind::Defend, DEFEND_COST)
    }

    pub fn wait() -> Self {
        Self::new(ActionKind::Wait, 0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ActionOutcome {
    Moved { from: Vec2, to: Vec2 },
    Damaged { target: CombatUnitId, amount: i32, remaining_health: i32, killed: bool },
    Defending,
    Waited,
}

/// An accepted action, as logged
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub turn_number: u32,
    pub actor: CombatUnitId,
    pub action: CombatAction,
    pub points_spent: u32,
    pub outcome: ActionOutcome,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnInfo {
    pub turn_number: u32,
    pub round: u32,
    pub phase: TurnPhase,
    pub active_unit: CombatUnitId,
    /// Always equal to the active unit's `action_points`
    pub remaining_action_points: u32,
    pub actions: Vec<ActionRecord>,
    /// Advisory countdown for the UI
    pub time_limit_secs: u32,
}

/// Complete state of one battle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombatState {
    pub battle_id: BattleId,
    pub campaign_id: Option<CampaignId>,
    pub status: CombatStatus,
    pub current_turn: Option<TurnInfo>,
    /// Fixed at combat start. Dead units are skipped, never removed.
    pub turn_order: Vec<CombatUnitId>,
    pub units: Vec<CombatUnit>,
    pub action_history: Vec<ActionRecord>,
    pub victory: Victory,
}

impl CombatState {
    pub fn new(units: Vec<CombatUnit>, conditions: Vec<VictoryCondition>) -> Self {
        Self {
            battle_id: BattleId::new(),
            campaign_id: None,
            status: CombatStatus::Setup,
            current_turn: None,
            turn_order: Vec::new(),
            units,
            action_history: Vec::new(),
            victory: Victory {
                conditions,
                status: VictoryStatus::Ongoing,
            },
        }
    }

    pub fn unit(&self, id: CombatUnitId) -> Option<&CombatUnit> {
        self.units.iter().find(|u| u.id == id)
    }

    pub fn unit_index(&self, id: CombatUnitId) -> Option<usize> {
        self.units.iter().position(|u| u.id == id)
    }

    pub fn active_unit(&self) -> Option<&CombatUnit> {
        self.current_turn.as_ref().and_then(|t| self.unit(t.active_unit))
    }

    pub fn living(&self, faction: Faction) -> impl Iterator<Item = &CombatUnit> {
        self.units.iter().filter(move |u| u.faction == faction && u.is_alive())
    }

    pub fn casualties(&self) -> impl Iterator<Item = &CombatUnit> {
        self.units.iter().filter(|u| !u.is_alive())
    }

    /// Victory as it stands right now
    pub fn evaluate_victory(&self) -> VictoryStatus {
        let players = self.living(Faction::Player).count();
        let enemies = self.living(Faction::Enemy).count();
        match (players, enemies) {
            (0, 0) => VictoryStatus::Draw,
            (_, 0) => VictoryStatus::PlayerVictory,
            (0, _) => VictoryStatus::EnemyVictory,
            _ => VictoryStatus::Ongoing,
        }
    }

    pub fn turn_limit(&self) -> Option<u32> {
        self.victory.conditions.iter().find_map(|c| match c {
            VictoryCondition::TurnLimit(n) => Some(*n),
            VictoryCondition::EliminateOpposition => None,
        })
    }
}
