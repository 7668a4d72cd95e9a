//! Action costs - all tunable values in one place
//!
//! Costs are in action points. A unit's pool comes from its class row.

pub const MOVE_COST: u32 = 1;
pub const ATTACK_COST: u32 = 2;
pub const DEFEND_COST: u32 = 1;

/// Units at or below this fraction of max health count as wounded
pub const WOUNDED_HEALTH_RATIO: f32 = 0.5;
