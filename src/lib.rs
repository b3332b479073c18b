//! KTSim - Monte Carlo shooting resolution for skirmish wargames
//!
//! Given an attacker's weapon profile and a defender's profile, estimates the
//! distribution of damage dealt in one shooting exchange by resolving a large
//! batch of independent dice-rolled trials.

pub mod combat;
pub mod core;
pub mod dice;
pub mod profile;
pub mod simulation;

pub use crate::core::config::SimulationConfig;
pub use crate::core::error::{Result, SimError};
pub use crate::profile::{CombatContext, ProfileRecord, UnitProfile};
pub use crate::simulation::{simulate, Simulation, SimulationReport};
