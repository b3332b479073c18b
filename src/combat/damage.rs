//! Damage resolution: saves cancel hits, then the survivors are tallied
//!
//! Mortal wounds from Devastating are fixed first, from the crit count
//! before any save is spent. Critical saves are then spent one round at a
//! time across the whole batch, followed by normal saves (two normal saves
//! can cancel one critical hit). Whatever hits survive deal their damage.
//!
//! Which hit a save cancels depends on the weapon's normal and critical
//! damage. The rounds are order-sensitive: a trial's branch is chosen from
//! the counts at the start of the round, except that in the critical-save
//! round the crit branch sees the hit count left by the normal-hit branch.

use serde::{Deserialize, Serialize};

use crate::combat::trials::{any_positive, mask_of, sub_where, HitCounts, Mask};
use crate::profile::UnitProfile;

/// Damage characteristics of the attacking weapon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponDamage {
    pub normal: u32,
    pub critical: u32,
    pub devastating: u32,
}

impl From<&UnitProfile> for WeaponDamage {
    fn from(profile: &UnitProfile) -> Self {
        Self {
            normal: profile.damage,
            critical: profile.crit_damage,
            devastating: profile.modifiers.devastating,
        }
    }
}

/// Final per-trial damage plus bookkeeping from the save rounds
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageResult {
    pub damage: Vec<u32>,
    pub mortal_wounds: Vec<u32>,
    pub crit_save_rounds: u32,
    pub normal_save_rounds: u32,
}

/// Spend saves against hits and compute damage
///
/// `attack` and `defense` are consumed in place: on return they hold the
/// hits that got through and no unspent saves.
pub fn resolve_damage(
    attack: &mut HitCounts,
    defense: &mut HitCounts,
    weapon: WeaponDamage,
) -> DamageResult {
    let mortal_wounds: Vec<u32> = attack
        .crit
        .iter()
        .map(|&c| c * weapon.devastating)
        .collect();
    let mut result = DamageResult {
        damage: mortal_wounds.clone(),
        mortal_wounds,
        ..Default::default()
    };

    result.crit_save_rounds = spend_crit_saves(attack, &mut defense.crit, weapon);

    if attack.remaining_hits() == 0 {
        tracing::trace!("All hits cancelled by critical saves");
        return result;
    }

    result.normal_save_rounds = spend_normal_saves(attack, &mut defense.success, weapon);

    for ((d, &s), &c) in result
        .damage
        .iter_mut()
        .zip(&attack.success)
        .zip(&attack.crit)
    {
        *d += s * weapon.normal + c * weapon.critical;
    }

    result
}

/// One critical save per trial per round; returns the number of rounds
pub fn spend_crit_saves(
    attack: &mut HitCounts,
    crit_saves: &mut [u32],
    weapon: WeaponDamage,
) -> u32 {
    let normal_costlier = weapon.normal > weapon.critical;
    let mut rounds = 0;

    while any_positive(crit_saves) {
        let saving = mask_of(crit_saves, |c| c > 0);
        let had_crit = mask_of(&attack.crit, |c| c > 0);
        let had_hit = mask_of(&attack.success, |s| s > 0);

        let lose_hit: Mask = (0..saving.len())
            .map(|i| saving[i] && had_hit[i] && (!had_crit[i] || normal_costlier))
            .collect();
        sub_where(&mut attack.success, &lose_hit, 1);

        // Reads the hit count after the line above
        let lose_crit: Mask = (0..saving.len())
            .map(|i| {
                saving[i]
                    && had_crit[i]
                    && (attack.success[i] == 0 || (had_hit[i] && !normal_costlier))
            })
            .collect();
        sub_where(&mut attack.crit, &lose_crit, 1);

        sub_where(crit_saves, &saving, 1);
        rounds += 1;
        tracing::trace!(round = rounds, "Critical save round");
    }

    rounds
}

/// Normal saves per round; returns the number of rounds
pub fn spend_normal_saves(
    attack: &mut HitCounts,
    saves: &mut [u32],
    weapon: WeaponDamage,
) -> u32 {
    let crit_within_one = weapon.normal <= weapon.critical;
    let crit_within_two = 2 * weapon.normal <= weapon.critical;
    let mut rounds = 0;

    while any_positive(saves) {
        let n = saves.len();
        let mut cancel_crit: Mask = vec![false; n];
        let mut cancel_two_hits: Mask = vec![false; n];
        let mut cancel_hit: Mask = vec![false; n];

        for i in 0..n {
            let (d, c, s) = (saves[i], attack.crit[i], attack.success[i]);
            let paired = d >= 2 && c > 0;

            cancel_crit[i] = paired
                && (s == 0 || (s == 1 && crit_within_one) || (s >= 2 && crit_within_two));
            cancel_two_hits[i] = paired && s >= 2 && !crit_within_two;
            cancel_hit[i] = s > 0 && (d == 1 || (c == 0 && d > 0));
        }

        sub_where(&mut attack.crit, &cancel_crit, 1);
        sub_where(&mut attack.success, &cancel_hit, 1);
        sub_where(&mut attack.success, &cancel_two_hits, 2);

        let paired_spend: Mask = cancel_crit
            .iter()
            .zip(&cancel_two_hits)
            .map(|(&a, &b)| a || b)
            .collect();
        sub_where(saves, &paired_spend, 1);
        let still_saving = mask_of(saves, |d| d > 0);
        sub_where(saves, &still_saving, 1);

        rounds += 1;
        tracing::trace!(round = rounds, "Normal save round");
    }

    rounds
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(crit: u32, success: u32, fail: u32) -> HitCounts {
        HitCounts {
            crit: vec![crit],
            success: vec![success],
            fail: vec![fail],
        }
    }

    fn weapon(normal: u32, critical: u32, devastating: u32) -> WeaponDamage {
        WeaponDamage {
            normal,
            critical,
            devastating,
        }
    }

    #[test]
    fn test_no_saves_full_damage() {
        let mut atk = counts(1, 2, 1);
        let mut def = counts(0, 0, 3);
        let r = resolve_damage(&mut atk, &mut def, weapon(3, 4, 0));
        assert_eq!(r.damage, vec![3 * 2 + 4]);
        assert_eq!(r.crit_save_rounds, 0);
    }

    #[test]
    fn test_crit_save_cancels_crit_when_crit_hurts_more() {
        let mut atk = counts(1, 1, 2);
        let mut def = counts(1, 0, 2);
        let r = resolve_damage(&mut atk, &mut def, weapon(3, 6, 0));
        assert_eq!(atk.trial(0), (0, 1, 2));
        assert_eq!(r.damage, vec![3]);
    }

    #[test]
    fn test_crit_save_cancels_hit_when_hit_hurts_more() {
        let mut atk = counts(1, 2, 1);
        let mut def = counts(1, 0, 2);
        let r = resolve_damage(&mut atk, &mut def, weapon(5, 4, 0));
        assert_eq!(atk.trial(0), (1, 1, 1));
        assert_eq!(r.damage, vec![9]);
    }

    #[test]
    fn test_crit_save_round_sees_updated_hits() {
        // Last normal hit cancelled, then the crit branch sees zero hits
        let mut atk = counts(1, 1, 2);
        let mut crit_saves = vec![1];
        spend_crit_saves(&mut atk, &mut crit_saves, weapon(5, 4, 0));
        assert_eq!(atk.trial(0), (0, 0, 2));
    }

    #[test]
    fn test_crit_save_without_crits_cancels_hit() {
        let mut atk = counts(0, 2, 2);
        let mut def = counts(2, 0, 1);
        let r = resolve_damage(&mut atk, &mut def, weapon(3, 4, 0));
        assert_eq!(r.damage, vec![0]);
        assert_eq!(r.crit_save_rounds, 2);
    }

    #[test]
    fn test_mortal_wounds_survive_all_saves() {
        let mut atk = counts(2, 0, 2);
        let mut def = counts(2, 1, 0);
        let r = resolve_damage(&mut atk, &mut def, weapon(3, 4, 2));
        assert_eq!(r.mortal_wounds, vec![4]);
        assert_eq!(r.damage, vec![4]);
        // Early exit: normal saves never spent
        assert_eq!(r.normal_save_rounds, 0);
    }

    #[test]
    fn test_two_normal_saves_cancel_lone_crit() {
        let mut atk = counts(1, 0, 3);
        let mut def = counts(0, 2, 1);
        let r = resolve_damage(&mut atk, &mut def, weapon(3, 4, 0));
        assert_eq!(atk.trial(0), (0, 0, 3));
        assert_eq!(def.success, vec![0]);
        assert_eq!(r.normal_save_rounds, 1);
    }

    #[test]
    fn test_two_saves_prefer_two_hits_when_they_hurt_more() {
        let mut atk = counts(1, 2, 1);
        let mut def = counts(0, 2, 1);
        let r = resolve_damage(&mut atk, &mut def, weapon(3, 4, 0));
        assert_eq!(atk.trial(0), (1, 0, 1));
        assert_eq!(r.damage, vec![4]);
    }

    #[test]
    fn test_two_saves_take_crit_when_it_hurts_more_than_two_hits() {
        let mut atk = counts(1, 2, 1);
        let mut def = counts(0, 2, 1);
        let r = resolve_damage(&mut atk, &mut def, weapon(2, 5, 0));
        assert_eq!(atk.trial(0), (0, 2, 1));
        assert_eq!(r.damage, vec![4]);
    }

    #[test]
    fn test_single_hit_and_crit_with_cheap_crit_wastes_a_save() {
        // Two saves, one hit, one crit, normal hit costlier: no branch
        // fires in the first round, the second round cancels the hit
        let mut atk = counts(1, 1, 2);
        let mut def = counts(0, 2, 1);
        let r = resolve_damage(&mut atk, &mut def, weapon(5, 4, 0));
        assert_eq!(atk.trial(0), (1, 0, 2));
        assert_eq!(r.normal_save_rounds, 2);
        assert_eq!(r.damage, vec![4]);
    }

    #[test]
    fn test_single_save_cancels_one_hit() {
        let mut atk = counts(1, 2, 1);
        let mut def = counts(0, 1, 2);
        let r = resolve_damage(&mut atk, &mut def, weapon(3, 4, 0));
        assert_eq!(atk.trial(0), (1, 1, 1));
        assert_eq!(r.damage, vec![7]);
    }

    #[test]
    fn test_trials_are_independent() {
        let mut atk = HitCounts {
            crit: vec![1, 0, 2],
            success: vec![1, 3, 0],
            fail: vec![2, 1, 2],
        };
        let mut def = HitCounts {
            crit: vec![1, 0, 0],
            success: vec![0, 2, 3],
            fail: vec![2, 1, 0],
        };
        let r = resolve_damage(&mut atk, &mut def, weapon(3, 4, 1));

        // Trial 0: crit save takes the crit (3 <= 4), one hit left + 1 MW
        // Trial 1: no crits, two saves take two hits
        // Trial 2: 3 saves vs 2 crits: round 1 cancels a crit (2 saves),
        //          the last save alone cannot touch the other crit
        assert_eq!(r.damage, vec![3 + 1, 3, 4 + 2]);
    }
}
