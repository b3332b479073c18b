//! Run output: the damage vector plus the distribution statistics a
//! dashboard would chart

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::profile::{CombatContext, UnitProfile};

/// Distribution of per-trial damage
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DamageSummary {
    pub trials: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub min: u32,
    pub max: u32,
    pub median: f64,
    /// damage value → number of trials
    pub histogram: BTreeMap<u32, usize>,
}

impl DamageSummary {
    pub fn from_damage(damage: &[u32]) -> Self {
        if damage.is_empty() {
            return Self::default();
        }

        let n = damage.len();
        let mean = damage.iter().map(|&d| d as f64).sum::<f64>() / n as f64;
        let variance = damage
            .iter()
            .map(|&d| (d as f64 - mean).powi(2))
            .sum::<f64>()
            / n as f64;

        let mut sorted = damage.to_vec();
        sorted.sort_unstable();
        let median = if n % 2 == 0 {
            (sorted[n / 2 - 1] as f64 + sorted[n / 2] as f64) / 2.0
        } else {
            sorted[n / 2] as f64
        };

        let mut histogram = BTreeMap::new();
        for &d in damage {
            *histogram.entry(d).or_insert(0) += 1;
        }

        Self {
            trials: n,
            mean,
            std_dev: variance.sqrt(),
            min: sorted[0],
            max: sorted[n - 1],
            median,
            histogram,
        }
    }

    /// Fraction of trials dealing at least `damage`
    pub fn probability_at_least(&self, damage: u32) -> f64 {
        if self.trials == 0 {
            return 0.0;
        }
        let hits: usize = self.histogram.range(damage..).map(|(_, &n)| n).sum();
        hits as f64 / self.trials as f64
    }

    /// Chance the exchange removes a model with `wounds` wounds
    pub fn kill_probability(&self, wounds: u32) -> f64 {
        self.probability_at_least(wounds)
    }

    /// Fraction of trials dealing exactly `damage`
    pub fn probability_of(&self, damage: u32) -> f64 {
        if self.trials == 0 {
            return 0.0;
        }
        self.histogram.get(&damage).copied().unwrap_or(0) as f64 / self.trials as f64
    }

    /// Horizontal bar chart, one line per damage value
    pub fn render_histogram(&self, width: usize) -> String {
        let peak = self.histogram.values().copied().max().unwrap_or(0);
        if peak == 0 {
            return String::new();
        }
        let mut out = String::new();
        for (&damage, &count) in &self.histogram {
            let bar = (count * width).div_ceil(peak);
            out.push_str(&format!(
                "{:>4} | {:<width$} {:>5.1}%\n",
                damage,
                "#".repeat(bar),
                100.0 * self.probability_of(damage),
                width = width
            ));
        }
        out
    }
}

/// Complete output of one run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimulationReport {
    pub attacker: String,
    pub defender: String,
    pub defender_wounds: u32,
    pub context: CombatContext,
    pub seed: u64,
    pub workers: usize,
    pub simulation_time_ms: u64,
    pub summary: DamageSummary,
    pub damage: Vec<u32>,
}

impl SimulationReport {
    pub fn new(
        attacker: &UnitProfile,
        defender: &UnitProfile,
        context: CombatContext,
        seed: u64,
        workers: usize,
        damage: Vec<u32>,
        elapsed: Duration,
    ) -> Self {
        Self {
            attacker: attacker.name.clone(),
            defender: defender.name.clone(),
            defender_wounds: defender.wounds,
            context,
            seed,
            workers,
            simulation_time_ms: elapsed.as_millis() as u64,
            summary: DamageSummary::from_damage(&damage),
            damage,
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(&self).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn summary(&self) -> String {
        let s = &self.summary;
        let mut text = format!(
            "{} vs {} ({} trials, seed {}, {}ms)\n\
             mean {:.2} ± {:.2}, median {:.1}, range {}..={}",
            self.attacker,
            self.defender,
            s.trials,
            self.seed,
            self.simulation_time_ms,
            s.mean,
            s.std_dev,
            s.median,
            s.min,
            s.max,
        );
        if self.defender_wounds > 0 {
            text.push_str(&format!(
                "\nkill chance ({}W): {:.1}%",
                self.defender_wounds,
                100.0 * s.kill_probability(self.defender_wounds)
            ));
        }
        text
    }
}
