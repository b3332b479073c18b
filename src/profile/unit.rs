//! Normalised unit + weapon profile
//!
//! Built once per run from a `ProfileRecord` and shared read-only by every
//! stage (and by concurrent runs).

use std::collections::BTreeSet;

use serde::Serialize;

use crate::core::error::{Result, SimError};
use crate::profile::modifier::{Modifiers, DEFAULT_LETHAL};
use crate::profile::record::ProfileRecord;

/// Lowest roll a threshold can ask for
pub const MIN_THRESHOLD: u8 = 2;
/// A threshold of 7 can never be met on a d6
pub const MAX_THRESHOLD: u8 = 7;

/// Build through `new`/`from_record`; fields stay public for reading, and
/// `validate` re-checks a profile that was edited afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitProfile {
    pub name: String,
    pub attack_dice: u32,
    /// Hit on this value or higher
    pub hit: u8,
    pub damage: u32,
    pub crit_damage: u32,
    /// Save on this value or higher
    pub save: u8,
    /// Carried for identity; combat math never reads it
    pub wounds: u32,
    pub keywords: BTreeSet<String>,
    pub modifiers: Modifiers,
}

impl UnitProfile {
    /// A profile with no special rules
    pub fn new(
        name: impl Into<String>,
        attack_dice: u32,
        hit: u8,
        damage: u32,
        crit_damage: u32,
        save: u8,
        wounds: u32,
    ) -> Result<Self> {
        let name = name.into();
        check_threshold(&name, "hit threshold", hit as i64)?;
        check_threshold(&name, "save threshold", save as i64)?;
        Ok(Self {
            name,
            attack_dice,
            hit,
            damage,
            crit_damage,
            save,
            wounds,
            keywords: BTreeSet::new(),
            modifiers: Modifiers::default(),
        })
    }

    /// Replace the keyword set and re-derive modifiers
    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self.modifiers = Modifiers::from_keywords(&self.keywords);
        self.modifiers.accurate = self.modifiers.accurate.min(self.attack_dice);
        self
    }

    /// Re-check the invariants `new` and `with_keywords` establish
    pub fn validate(&self) -> Result<()> {
        let name = &self.name;
        check_threshold(name, "hit threshold", self.hit as i64)?;
        check_threshold(name, "save threshold", self.save as i64)?;
        let lethal = self.modifiers.lethal;
        if !(MIN_THRESHOLD..=DEFAULT_LETHAL).contains(&lethal) {
            return Err(SimError::InvalidProfile(format!(
                "{}: lethal {} outside {}..={}",
                name, lethal, MIN_THRESHOLD, DEFAULT_LETHAL
            )));
        }
        if self.modifiers.accurate > self.attack_dice {
            return Err(SimError::InvalidProfile(format!(
                "{}: accurate {} exceeds {} attack dice",
                name, self.modifiers.accurate, self.attack_dice
            )));
        }
        Ok(())
    }

    /// Full attacker profile; every weapon and save field is required
    pub fn from_record(record: &ProfileRecord) -> Result<Self> {
        let name = &record.name;
        let attack_dice = required(name, "attack dice", record.attack_dice)?;
        let hit = required(name, "hit threshold", record.hit_threshold)?;
        let damage = required(name, "damage", record.damage)?;
        let crit_damage = required(name, "crit damage", record.crit_damage)?;
        let save = required(name, "save threshold", record.save_threshold)?;
        let wounds = record.wounds.unwrap_or(0);

        let profile = Self::new(
            name.clone(),
            count(name, "attack dice", attack_dice)?,
            threshold(name, "hit threshold", hit)?,
            count(name, "damage", damage)?,
            count(name, "crit damage", crit_damage)?,
            threshold(name, "save threshold", save)?,
            count(name, "wounds", wounds)?,
        )?;
        Ok(profile.with_keywords(record.keywords.iter().cloned()))
    }

    /// Defender profile; only the save threshold is required, weapon fields
    /// default to an unarmed profile that never hits
    pub fn defender_from_record(record: &ProfileRecord) -> Result<Self> {
        let name = &record.name;
        let save = required(name, "save threshold", record.save_threshold)?;

        let profile = Self::new(
            name.clone(),
            count(name, "attack dice", record.attack_dice.unwrap_or(0))?,
            threshold(name, "hit threshold", record.hit_threshold.unwrap_or(MAX_THRESHOLD as i64))?,
            count(name, "damage", record.damage.unwrap_or(0))?,
            count(name, "crit damage", record.crit_damage.unwrap_or(0))?,
            threshold(name, "save threshold", save)?,
            count(name, "wounds", record.wounds.unwrap_or(0))?,
        )?;
        Ok(profile.with_keywords(record.keywords.iter().cloned()))
    }
}

fn required(name: &str, field: &str, value: Option<i64>) -> Result<i64> {
    value.ok_or_else(|| SimError::InvalidProfile(format!("{}: missing {}", name, field)))
}

fn count(name: &str, field: &str, value: i64) -> Result<u32> {
    u32::try_from(value)
        .map_err(|_| SimError::InvalidProfile(format!("{}: {} is {}", name, field, value)))
}

fn threshold(name: &str, field: &str, value: i64) -> Result<u8> {
    check_threshold(name, field, value)?;
    Ok(value as u8)
}

fn check_threshold(name: &str, field: &str, value: i64) -> Result<()> {
    if (MIN_THRESHOLD as i64..=MAX_THRESHOLD as i64).contains(&value) {
        Ok(())
    } else {
        Err(SimError::InvalidProfile(format!(
            "{}: {} {} outside {}..={}",
            name, field, value, MIN_THRESHOLD, MAX_THRESHOLD
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ProfileRecord {
        ProfileRecord {
            name: "Gunner - Bolter".into(),
            attack_dice: Some(4),
            hit_threshold: Some(3),
            damage: Some(3),
            crit_damage: Some(4),
            save_threshold: Some(3),
            wounds: Some(12),
            keywords: vec!["Lethal 5+".into(), "Heavy".into(), "Acc 1".into()],
        }
    }

    #[test]
    fn test_from_record_derives_modifiers() {
        let p = UnitProfile::from_record(&record()).unwrap();
        assert_eq!(p.attack_dice, 4);
        assert_eq!(p.hit, 3);
        assert_eq!(p.modifiers.lethal, 5);
        assert_eq!(p.modifiers.accurate, 1);
        // Unknown keywords stay in the identity set
        assert!(p.keywords.contains("Heavy"));
    }

    #[test]
    fn test_missing_threshold_is_invalid() {
        let mut rec = record();
        rec.hit_threshold = None;
        let err = UnitProfile::from_record(&rec).unwrap_err();
        assert!(matches!(err, SimError::InvalidProfile(_)));
    }

    #[test]
    fn test_negative_dice_is_invalid() {
        let mut rec = record();
        rec.attack_dice = Some(-1);
        assert!(matches!(
            UnitProfile::from_record(&rec),
            Err(SimError::InvalidProfile(_))
        ));
    }

    #[test]
    fn test_threshold_out_of_range() {
        let mut rec = record();
        rec.save_threshold = Some(9);
        assert!(UnitProfile::from_record(&rec).is_err());
        assert!(UnitProfile::new("x", 4, 1, 3, 4, 4, 10).is_err());
    }

    #[test]
    fn test_accurate_clamped_to_attack_dice() {
        let p = UnitProfile::new("x", 2, 4, 3, 4, 4, 10)
            .unwrap()
            .with_keywords(["Acc 5"]);
        assert_eq!(p.modifiers.accurate, 2);
    }

    #[test]
    fn test_validate_rejects_edited_profile() {
        let p = UnitProfile::from_record(&record()).unwrap();
        assert!(p.validate().is_ok());

        let mut bad = p.clone();
        bad.modifiers.accurate = 5;
        assert!(matches!(bad.validate(), Err(SimError::InvalidProfile(_))));

        let mut bad = p.clone();
        bad.hit = 0;
        assert!(matches!(bad.validate(), Err(SimError::InvalidProfile(_))));

        let mut bad = p;
        bad.modifiers.lethal = 1;
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_defender_needs_only_save() {
        let rec = ProfileRecord {
            name: "Target".into(),
            save_threshold: Some(4),
            ..Default::default()
        };
        let p = UnitProfile::defender_from_record(&rec).unwrap();
        assert_eq!(p.save, 4);
        assert_eq!(p.attack_dice, 0);
        assert!(UnitProfile::from_record(&rec).is_err());
    }

    #[test]
    fn test_parsing_is_idempotent() {
        let a = UnitProfile::from_record(&record()).unwrap();
        let b = UnitProfile::from_record(&record()).unwrap();
        assert_eq!(a.modifiers, b.modifiers);
        let again = a.clone().with_keywords(a.keywords.clone());
        assert_eq!(again.modifiers, a.modifiers);
    }
}
