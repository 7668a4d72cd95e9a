pub mod config;
pub mod error;
pub mod types;

pub use config::{GameConfig, ResourceRates, StrategicConfig, TacticalConfig};
pub use error::{Result, WarError};
pub use types::{BattleId, CampaignId, Faction, Vec2};
