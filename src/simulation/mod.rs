//! Simulation runs: sequencing the combat stages over a batch of trials

pub mod matchup;
pub mod output;
pub mod runner;

pub use matchup::Matchup;
pub use output::{DamageSummary, SimulationReport};
pub use runner::{simulate, CombatOutcome, Simulation};
