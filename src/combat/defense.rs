//! Defense resolution: save pool sizing, batched save rolls, classification
//!
//! The pool starts at the fixed three defense dice, loses dice to piercing,
//! and trades one die for an automatic save in cover. Trials are grouped by
//! remaining pool width so each width costs one batched dice call.

use std::collections::BTreeMap;

use crate::combat::trials::HitCounts;
use crate::core::error::Result;
use crate::dice::{DiceSource, DIE_FACES};
use crate::profile::{CombatContext, UnitProfile};

/// Defense dice every defender rolls before modifiers
pub const DEFENSE_DICE: u32 = 3;

/// Result of the defense stage
#[derive(Debug, Clone)]
pub struct DefenseRoll {
    pub counts: HitCounts,
    /// Dice actually rolled per trial after piercing and cover
    pub rolled_pool: Vec<u32>,
}

/// Save pool size per trial after piercing (may be zero or negative)
pub fn save_pool(attacker: &UnitProfile, attack_crit: &[u32]) -> Vec<i64> {
    attack_crit
        .iter()
        .map(|&crit| DEFENSE_DICE as i64 - attacker.modifiers.piercing_for(crit > 0) as i64)
        .collect()
}

pub fn resolve_defense<D: DiceSource + ?Sized>(
    defender: &UnitProfile,
    attacker: &UnitProfile,
    attack_crit: &[u32],
    context: &CombatContext,
    dice: &mut D,
) -> Result<DefenseRoll> {
    let trials = attack_crit.len();
    let mut counts = HitCounts::zeros(trials);
    let mut pool = save_pool(attacker, attack_crit);

    if context.effective_cover(attacker) {
        for (size, save) in pool.iter_mut().zip(counts.success.iter_mut()) {
            if *size > 0 {
                *save += 1;
                *size -= 1;
            }
        }
    }

    let rolled_pool: Vec<u32> = pool.iter().map(|&p| p.max(0) as u32).collect();

    let mut by_width: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
    for (trial, &width) in rolled_pool.iter().enumerate() {
        if width > 0 {
            by_width.entry(width).or_default().push(trial);
        }
    }

    for (&width, members) in &by_width {
        let rolls = dice.roll(members.len(), width as usize)?;
        let crits = rolls.count_per_row(|v| v == DIE_FACES);
        let saves = rolls.count_per_row(|v| v >= defender.save && v < DIE_FACES);
        for ((&trial, crit), save) in members.iter().zip(crits).zip(saves) {
            counts.crit[trial] = crit;
            counts.success[trial] += save;
        }
    }

    // Fail is measured against the nominal pool, not the rolled one
    for i in 0..trials {
        counts.fail[i] = DEFENSE_DICE.saturating_sub(counts.success[i] + counts.crit[i]);
    }

    tracing::debug!(
        trials,
        widths = by_width.len(),
        "Defense dice resolved"
    );

    Ok(DefenseRoll {
        counts,
        rolled_pool,
    })
}
