use thiserror::Error;

use crate::campaign::army::{ArmyId, SquadId};
use crate::combat::unit::CombatUnitId;

#[derive(Error, Debug)]
pub enum WarError {
    #[error("Army {0:?} has no deployable units")]
    EmptyDeployment(ArmyId),

    #[error("Cannot start combat without units")]
    NoCombatUnits,

    #[error("Unit not registered in battle: {0:?}")]
    UnknownUnit(CombatUnitId),

    #[error("Army not found: {0:?}")]
    UnknownArmy(ArmyId),

    #[error("Army must contain at least one squad")]
    EmptyArmy,

    #[error("Squad {0:?} has no units")]
    EmptySquad(SquadId),

    #[error("Orchestrator has been stopped")]
    Stopped,

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, WarError>;
