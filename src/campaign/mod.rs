//! Strategic layer: armies moving on a continuous map, supplies and resources

pub mod army;
pub mod engine;
pub mod resources;

pub use army::{Army, ArmyId, ArmyStatus, Formation, MovementState, Squad, SquadId, SquadStatus, Supplies};
pub use engine::{StrategicEngine, StrategicGameState};
pub use resources::ResourceLedger;
