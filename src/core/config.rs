//! Simulation configuration with documented defaults
//!
//! Every run-level knob lives here. Profiles and combat context are inputs,
//! not configuration, and are kept out of this struct.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SimError};

/// Trial count used when the caller does not ask for one
pub const DEFAULT_TRIALS: u32 = 1000;

/// Configuration for a batch of simulated exchanges
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of independent exchanges to simulate
    ///
    /// Histogram resolution improves with the square root of this value;
    /// 1000 trials gives roughly ±3% on the most common damage bucket.
    pub trials: u32,

    /// Top-level seed for the dice source
    ///
    /// `None` draws fresh entropy from the OS, so repeated runs differ.
    /// A fixed value makes the whole run reproducible, including the
    /// per-worker streams.
    pub seed: Option<u64>,

    /// Number of dice workers (contiguous trial slices)
    ///
    /// `None` uses the size of the rayon pool. The worker count is part of
    /// the reproducibility key: the same seed with a different worker count
    /// yields different dice.
    pub workers: Option<usize>,

    /// Minimum dice cells (trials × pool width) before slices are filled
    /// on the rayon pool
    ///
    /// Below this, thread hand-off costs more than the rolling itself.
    /// Slices use the same streams either way, so this never changes results.
    pub parallel_threshold: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            trials: DEFAULT_TRIALS,
            seed: None,
            workers: None,
            parallel_threshold: 4096,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    simulation: SimulationConfig,
}

impl SimulationConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a `[simulation]` table; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(content)?;
        file.simulation.validate()?;
        Ok(file.simulation)
    }

    /// Load and validate a config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Worker count actually used by the dice source
    pub fn effective_workers(&self) -> usize {
        self.workers
            .unwrap_or_else(rayon::current_num_threads)
            .max(1)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.trials == 0 {
            return Err(SimError::InvalidTrialCount(0));
        }

        if self.workers == Some(0) {
            return Err(SimError::Config("workers must be at least 1".into()));
        }

        Ok(())
    }
}
