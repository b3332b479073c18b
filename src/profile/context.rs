//! Per-exchange battlefield conditions

use serde::{Deserialize, Serialize};

use crate::profile::unit::UnitProfile;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatContext {
    /// Defender claims one automatic save and rolls one die fewer
    #[serde(default)]
    pub cover: bool,
    /// Attacker crits degrade to normal hits and one hit is lost
    #[serde(default)]
    pub obscured: bool,
}

impl CombatContext {
    pub fn new(cover: bool, obscured: bool) -> Self {
        Self { cover, obscured }
    }

    /// Cover as it applies against this attacker (Saturate denies it)
    pub fn effective_cover(&self, attacker: &UnitProfile) -> bool {
        self.cover && !attacker.modifiers.saturate
    }
}
