//! Attack resolution: attacker dice → per-trial crit / success / fail
//!
//! Stages run in a fixed order, each reading the state the previous one left:
//! accurate substitution, rerolls, lethal/hit classification, Severe,
//! Punishing, Rending, obscured.

use crate::combat::trials::{mask_of, shift_where, sum, HitCounts, Mask};
use crate::core::error::Result;
use crate::dice::{DiceMatrix, DiceSource};
use crate::profile::{CombatContext, Reroll, UnitProfile};

/// Result of the attack stage
#[derive(Debug, Clone)]
pub struct AttackRoll {
    pub counts: HitCounts,
    /// Dice exactly as rolled, all configured columns
    pub rolled: DiceMatrix,
    /// Dice that were classified: accurate columns removed, rerolls applied
    pub resolved: DiceMatrix,
}

pub fn resolve_attack<D: DiceSource + ?Sized>(
    attacker: &UnitProfile,
    context: &CombatContext,
    trials: usize,
    dice: &mut D,
) -> Result<AttackRoll> {
    let mods = &attacker.modifiers;
    let pool = attacker.attack_dice as usize;
    let rolled = dice.roll(trials, pool)?;

    let mut counts = HitCounts::zeros(trials);

    // Accurate dice are automatic normal hits in place of rolled ones
    let mut resolved = rolled.drop_last_columns(mods.accurate as usize);
    counts.success.fill(mods.accurate);

    if let Some(rule) = mods.reroll {
        resolved = reroll_failures(&resolved, attacker.hit, mods.lethal, rule, dice)?;
    }

    let lethal = mods.lethal;
    let hit = attacker.hit;
    counts.crit = resolved.count_per_row(|v| v >= lethal);
    let rolled_hits = resolved.count_per_row(|v| v >= hit && v < lethal);
    for (success, rolled) in counts.success.iter_mut().zip(rolled_hits) {
        *success += rolled;
    }
    for i in 0..trials {
        counts.fail[i] = attacker
            .attack_dice
            .saturating_sub(counts.success[i] + counts.crit[i]);
    }

    if mods.severe {
        let upgrade: Mask = counts
            .crit
            .iter()
            .zip(&counts.success)
            .map(|(&c, &s)| c == 0 && s >= 1)
            .collect();
        shift_where(&mut counts.success, &mut counts.crit, &upgrade);
    }

    if mods.punishing {
        let upgrade: Mask = counts
            .crit
            .iter()
            .zip(&counts.fail)
            .map(|(&c, &f)| c > 0 && f > 0)
            .collect();
        shift_where(&mut counts.fail, &mut counts.success, &upgrade);
    }

    if mods.rending {
        let upgrade: Mask = counts
            .crit
            .iter()
            .zip(&counts.success)
            .map(|(&c, &s)| c > 0 && s > 0)
            .collect();
        shift_where(&mut counts.success, &mut counts.crit, &upgrade);
    }

    if context.obscured {
        for (s, c) in counts.success.iter_mut().zip(counts.crit.iter_mut()) {
            *s += *c;
            *c = 0;
        }
        let lost = mask_of(&counts.success, |s| s > 0);
        shift_where(&mut counts.success, &mut counts.fail, &lost);
    }

    tracing::debug!(
        trials,
        crits = sum(&counts.crit),
        hits = sum(&counts.success),
        "Attack dice resolved"
    );

    Ok(AttackRoll {
        counts,
        rolled,
        resolved,
    })
}

/// A die fails when it is neither a hit nor a crit
fn is_failure(value: u8, hit: u8, lethal: u8) -> bool {
    value < hit && value < lethal
}

/// Replace failed dice with fresh values from one batched roll
fn reroll_failures<D: DiceSource + ?Sized>(
    resolved: &DiceMatrix,
    hit: u8,
    lethal: u8,
    rule: Reroll,
    dice: &mut D,
) -> Result<DiceMatrix> {
    let fresh = dice.roll(resolved.rows(), resolved.cols())?;
    if fresh.is_empty() {
        return Ok(resolved.clone());
    }

    let failed = |v: u8| is_failure(v, hit, lethal);
    let mut out = resolved.clone();

    for i in 0..out.rows() {
        let replacement = fresh.row(i);
        let row = out.row_mut(i);
        match rule {
            Reroll::Relentless => {
                for (die, &r) in row.iter_mut().zip(replacement) {
                    if failed(*die) {
                        *die = r;
                    }
                }
            }
            Reroll::Ceaseless => {
                if let Some(face) = most_common_failure(row, failed) {
                    for (die, &r) in row.iter_mut().zip(replacement) {
                        if *die == face {
                            *die = r;
                        }
                    }
                }
            }
            Reroll::Balanced => {
                let lowest = row
                    .iter()
                    .enumerate()
                    .filter(|(_, &v)| failed(v))
                    .min_by_key(|(_, &v)| v)
                    .map(|(col, _)| col);
                if let Some(col) = lowest {
                    row[col] = replacement[col];
                }
            }
        }
    }

    Ok(out)
}

/// Most frequent failed face in a row; ties go to the lower face
fn most_common_failure(row: &[u8], failed: impl Fn(u8) -> bool) -> Option<u8> {
    let mut tally = [0u32; 7];
    for &v in row.iter().filter(|&&v| failed(v)) {
        tally[v as usize] += 1;
    }
    let mut best: Option<(u8, u32)> = None;
    for face in 1..=6u8 {
        let n = tally[face as usize];
        if n > 0 && best.map_or(true, |(_, m)| n > m) {
            best = Some((face, n));
        }
    }
    best.map(|(face, _)| face)
}
