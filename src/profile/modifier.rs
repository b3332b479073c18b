//! Weapon special rules as a typed modifier set
//!
//! Upstream keyword strings are loosely formatted ("Dev2", "Dev 2",
//! "Devastating 2"). Parsing turns each into a `Modifier`; the numeric
//! resolvers only ever see the folded `Modifiers`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SimError};

/// Critical threshold when no Lethal rule is present
pub const DEFAULT_LETHAL: u8 = 6;

/// One parsed special rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Modifier {
    /// Dice at or above this value are critical hits
    Lethal(u8),
    /// Mortal wounds per critical hit, before saves
    Devastating(u32),
    /// Defense dice removed
    Piercing(u32),
    /// Defense dice removed when at least one critical hit was scored
    PiercingCrits(u32),
    /// Dice swapped for automatic normal hits
    Accurate(u32),
    /// Defender cannot claim cover
    Saturate,
    /// No crits rolled: upgrade a normal hit
    Severe,
    /// Any crit: upgrade a miss to a normal hit
    Punishing,
    /// Any crit: upgrade a normal hit to a crit
    Rending,
    /// Reroll one failed die
    Balanced,
    /// Reroll every failed die of one value
    Ceaseless,
    /// Reroll every failed die
    Relentless,
}

/// Numbered rules, longest prefix first so "PrcCrit" wins over "Prc"
const NUMBERED: &[(&str, fn(u32) -> Modifier)] = &[
    ("Piercing Crits", Modifier::PiercingCrits),
    ("PrcCrit", Modifier::PiercingCrits),
    ("Piercing", Modifier::Piercing),
    ("Prc", Modifier::Piercing),
    ("Devastating", Modifier::Devastating),
    ("Dev", Modifier::Devastating),
    ("Accurate", Modifier::Accurate),
    ("Acc", Modifier::Accurate),
];

impl Modifier {
    pub fn parse(keyword: &str) -> Result<Self> {
        let kw = keyword.trim();
        let ambiguous = || SimError::KeywordParseAmbiguity(keyword.to_string());

        match kw {
            "Saturate" | "Sat" => return Ok(Modifier::Saturate),
            "Severe" => return Ok(Modifier::Severe),
            "Punishing" => return Ok(Modifier::Punishing),
            "Rending" => return Ok(Modifier::Rending),
            "Balanced" | "Bal" => return Ok(Modifier::Balanced),
            "Ceaseless" => return Ok(Modifier::Ceaseless),
            "Relentless" => return Ok(Modifier::Relentless),
            _ => {}
        }

        if let Some(rest) = kw.strip_prefix("Lethal") {
            let value: u8 = rest
                .trim()
                .trim_end_matches('+')
                .parse()
                .map_err(|_| ambiguous())?;
            return if (2..=DEFAULT_LETHAL).contains(&value) {
                Ok(Modifier::Lethal(value))
            } else {
                Err(ambiguous())
            };
        }

        for (prefix, make) in NUMBERED {
            if let Some(rest) = kw.strip_prefix(prefix) {
                let value: u32 = rest.trim().parse().map_err(|_| ambiguous())?;
                return Ok(make(value));
            }
        }

        Err(ambiguous())
    }
}

impl FromStr for Modifier {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self> {
        Modifier::parse(s)
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Modifier::Lethal(v) => write!(f, "Lethal {}+", v),
            Modifier::Devastating(v) => write!(f, "Dev {}", v),
            Modifier::Piercing(v) => write!(f, "Prc {}", v),
            Modifier::PiercingCrits(v) => write!(f, "PrcCrit {}", v),
            Modifier::Accurate(v) => write!(f, "Acc {}", v),
            Modifier::Saturate => f.write_str("Saturate"),
            Modifier::Severe => f.write_str("Severe"),
            Modifier::Punishing => f.write_str("Punishing"),
            Modifier::Rending => f.write_str("Rending"),
            Modifier::Balanced => f.write_str("Balanced"),
            Modifier::Ceaseless => f.write_str("Ceaseless"),
            Modifier::Relentless => f.write_str("Relentless"),
        }
    }
}

/// Reroll rules, weakest first. Only the strongest present one applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Reroll {
    Balanced,
    Ceaseless,
    Relentless,
}

/// All modifiers of one profile, folded into scalars and flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Modifiers {
    pub lethal: u8,
    pub devastating: u32,
    pub piercing: u32,
    /// `Some` when the weapon has Piercing Crits
    pub piercing_crits: Option<u32>,
    pub accurate: u32,
    pub saturate: bool,
    pub severe: bool,
    pub punishing: bool,
    pub rending: bool,
    pub reroll: Option<Reroll>,
}

impl Default for Modifiers {
    fn default() -> Self {
        Self {
            lethal: DEFAULT_LETHAL,
            devastating: 0,
            piercing: 0,
            piercing_crits: None,
            accurate: 0,
            saturate: false,
            severe: false,
            punishing: false,
            rending: false,
            reroll: None,
        }
    }
}

impl Modifiers {
    /// Parse raw keywords, skipping (and logging) the ones that match no rule
    pub fn from_keywords<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        keywords
            .into_iter()
            .filter_map(|kw| match Modifier::parse(kw.as_ref()) {
                Ok(m) => Some(m),
                Err(e) if !e.is_fatal() => {
                    tracing::debug!("Ignoring keyword: {}", e);
                    None
                }
                Err(e) => {
                    tracing::warn!("Dropping keyword: {}", e);
                    None
                }
            })
            .collect()
    }

    pub fn apply(&mut self, modifier: Modifier) {
        match modifier {
            Modifier::Lethal(v) => self.lethal = self.lethal.min(v),
            Modifier::Devastating(v) => self.devastating = self.devastating.max(v),
            Modifier::Piercing(v) => self.piercing = self.piercing.max(v),
            Modifier::PiercingCrits(v) => {
                self.piercing_crits = Some(self.piercing_crits.map_or(v, |p| p.max(v)))
            }
            Modifier::Accurate(v) => self.accurate = self.accurate.max(v),
            Modifier::Saturate => self.saturate = true,
            Modifier::Severe => self.severe = true,
            Modifier::Punishing => self.punishing = true,
            Modifier::Rending => self.rending = true,
            Modifier::Balanced => self.raise_reroll(Reroll::Balanced),
            Modifier::Ceaseless => self.raise_reroll(Reroll::Ceaseless),
            Modifier::Relentless => self.raise_reroll(Reroll::Relentless),
        }
    }

    fn raise_reroll(&mut self, reroll: Reroll) {
        self.reroll = Some(self.reroll.map_or(reroll, |r| r.max(reroll)));
    }

    /// Defense dice removed for a trial, given whether it scored any crit
    pub fn piercing_for(&self, has_crit: bool) -> u32 {
        match self.piercing_crits {
            Some(crit_value) if has_crit => self.piercing.max(crit_value),
            _ => self.piercing,
        }
    }
}

impl FromIterator<Modifier> for Modifiers {
    fn from_iter<T: IntoIterator<Item = Modifier>>(iter: T) -> Self {
        let mut modifiers = Modifiers::default();
        for m in iter {
            modifiers.apply(m);
        }
        modifiers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lethal_forms() {
        assert_eq!(Modifier::parse("Lethal 5+").unwrap(), Modifier::Lethal(5));
        assert_eq!(Modifier::parse("Lethal 4").unwrap(), Modifier::Lethal(4));
        assert!(Modifier::parse("Lethal").is_err());
        assert!(Modifier::parse("Lethal 9+").is_err());
    }

    #[test]
    fn test_numbered_forms_with_and_without_space() {
        assert_eq!(Modifier::parse("Dev2").unwrap(), Modifier::Devastating(2));
        assert_eq!(Modifier::parse("Dev 3").unwrap(), Modifier::Devastating(3));
        assert_eq!(Modifier::parse("Devastating 4").unwrap(), Modifier::Devastating(4));
        assert_eq!(Modifier::parse("Prc1").unwrap(), Modifier::Piercing(1));
        assert_eq!(Modifier::parse("Piercing 2").unwrap(), Modifier::Piercing(2));
        assert_eq!(Modifier::parse("Acc 1").unwrap(), Modifier::Accurate(1));
    }

    #[test]
    fn test_piercing_crits_not_confused_with_piercing() {
        assert_eq!(Modifier::parse("PrcCrit 1").unwrap(), Modifier::PiercingCrits(1));
        assert_eq!(Modifier::parse("PrcCrit2").unwrap(), Modifier::PiercingCrits(2));
        assert_eq!(
            Modifier::parse("Piercing Crits 1").unwrap(),
            Modifier::PiercingCrits(1)
        );
    }

    #[test]
    fn test_flags_and_abbreviations() {
        assert_eq!(Modifier::parse("Sat").unwrap(), Modifier::Saturate);
        assert_eq!(Modifier::parse(" Rending ").unwrap(), Modifier::Rending);
        assert_eq!(Modifier::parse("Bal").unwrap(), Modifier::Balanced);
    }

    #[test]
    fn test_unknown_keyword_is_ambiguity() {
        for kw in ["Heavy", "Silent", "Blast 2", "Dev", "Prc x", ""] {
            assert!(
                matches!(Modifier::parse(kw), Err(SimError::KeywordParseAmbiguity(_))),
                "{:?} should not parse",
                kw
            );
        }
    }

    #[test]
    fn test_fold_skips_unrecognised_keywords() {
        let m = Modifiers::from_keywords(["Heavy", "Dev 2", "Blast 2"]);
        assert_eq!(
            m,
            Modifiers {
                devastating: 2,
                ..Modifiers::default()
            }
        );
    }

    #[test]
    fn test_fold_takes_min_lethal_and_max_values() {
        let m = Modifiers::from_keywords(["Lethal 5+", "Lethal 4+", "Dev 1", "Dev 3", "Heavy"]);
        assert_eq!(m.lethal, 4);
        assert_eq!(m.devastating, 3);
        assert_eq!(m.piercing, 0);
    }

    #[test]
    fn test_strongest_reroll_wins() {
        let m = Modifiers::from_keywords(["Balanced", "Relentless", "Ceaseless"]);
        assert_eq!(m.reroll, Some(Reroll::Relentless));
    }

    #[test]
    fn test_piercing_for_crit_trials() {
        let m = Modifiers::from_keywords(["Prc 1", "PrcCrit 2"]);
        assert_eq!(m.piercing_for(true), 2);
        assert_eq!(m.piercing_for(false), 1);

        let plain = Modifiers::from_keywords(["Prc 1"]);
        assert_eq!(plain.piercing_for(true), 1);
    }

    #[test]
    fn test_display_reparses() {
        let all = [
            Modifier::Lethal(5),
            Modifier::Devastating(2),
            Modifier::Piercing(1),
            Modifier::PiercingCrits(1),
            Modifier::Accurate(1),
            Modifier::Saturate,
            Modifier::Severe,
            Modifier::Punishing,
            Modifier::Rending,
            Modifier::Balanced,
            Modifier::Ceaseless,
            Modifier::Relentless,
        ];
        for m in all {
            assert_eq!(Modifier::parse(&m.to_string()).unwrap(), m);
        }
    }
}
