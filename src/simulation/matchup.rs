//! Matchup files: an attacker record, a defender record and the conditions
//!
//! ```toml
//! cover = true
//!
//! [attacker]
//! name = "Gunner - Bolt rifle"
//! A = 4
//! BS = "3+"
//! D = 3
//! DCrit = 4
//! SV = "3+"
//! W = 14
//! keywords = ["Prc 1", "Lethal 5+"]
//!
//! [defender]
//! name = "Trooper"
//! SV = "5+"
//! W = 7
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::Result;
use crate::profile::{CombatContext, ProfileRecord, UnitProfile};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Matchup {
    pub attacker: ProfileRecord,
    pub defender: ProfileRecord,
    #[serde(default)]
    pub cover: bool,
    #[serde(default)]
    pub obscured: bool,
}

impl Matchup {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Load by extension: `.json` is JSON, anything else TOML
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&content),
            _ => Self::from_toml_str(&content),
        }
    }

    pub fn context(&self) -> CombatContext {
        CombatContext::new(self.cover, self.obscured)
    }

    /// Normalised (attacker, defender) profiles
    pub fn profiles(&self) -> Result<(UnitProfile, UnitProfile)> {
        let attacker = UnitProfile::from_record(&self.attacker)?;
        let defender = UnitProfile::defender_from_record(&self.defender)?;
        Ok((attacker, defender))
    }
}
