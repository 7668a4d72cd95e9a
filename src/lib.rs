//! Warfront - real-time campaign map with turn-based tactical battles

pub mod campaign;
pub mod character;
pub mod combat;
pub mod core;
pub mod events;
pub mod orchestrator;
