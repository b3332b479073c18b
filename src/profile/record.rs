//! Boundary record for unit + weapon data coming from upstream
//!
//! Field names follow the upstream data set (`A`, `BS`, `D`, `DCrit`,
//! `SV`, `W`) with descriptive aliases. Numbers may arrive as integers or as
//! strings like `"4+"`; keywords as a list or one comma-separated string.

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRecord {
    #[serde(default, alias = "opname")]
    pub name: String,

    #[serde(default, alias = "A", alias = "attackDice", deserialize_with = "flexible_number")]
    pub attack_dice: Option<i64>,

    #[serde(default, alias = "BS", alias = "hitThreshold", deserialize_with = "flexible_number")]
    pub hit_threshold: Option<i64>,

    #[serde(default, alias = "D", deserialize_with = "flexible_number")]
    pub damage: Option<i64>,

    #[serde(default, alias = "DCrit", alias = "critDamage", deserialize_with = "flexible_number")]
    pub crit_damage: Option<i64>,

    #[serde(default, alias = "SV", alias = "saveThreshold", deserialize_with = "flexible_number")]
    pub save_threshold: Option<i64>,

    #[serde(default, alias = "W", deserialize_with = "flexible_number")]
    pub wounds: Option<i64>,

    #[serde(default, alias = "keyword", alias = "Keywords", deserialize_with = "flexible_keywords")]
    pub keywords: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Int(i64),
    Text(String),
}

fn flexible_number<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<RawNumber> = Option::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(RawNumber::Int(v)) => Ok(Some(v)),
        Some(RawNumber::Text(s)) => {
            let trimmed = s.trim().trim_end_matches('+').trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            trimmed
                .parse()
                .map(Some)
                .map_err(|_| serde::de::Error::custom(format!("not a number: {:?}", s)))
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawKeywords {
    List(Vec<String>),
    Joined(String),
}

fn flexible_keywords<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<RawKeywords> = Option::deserialize(deserializer)?;
    let keywords = match raw {
        None => Vec::new(),
        Some(RawKeywords::List(list)) => list,
        Some(RawKeywords::Joined(joined)) => joined.split(',').map(str::to_string).collect(),
    };
    Ok(keywords
        .into_iter()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .collect())
}
