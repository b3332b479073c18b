//! Simulation orchestrator
//!
//! Attack → defense → damage, once per call. Nothing is kept between calls:
//! every run allocates its own trial vectors and draws from the dice source
//! it is handed.

use std::time::Instant;

use crate::combat::{
    resolve_attack, resolve_damage, resolve_defense, AttackRoll, DamageResult, DefenseRoll,
    WeaponDamage,
};
use crate::core::config::SimulationConfig;
use crate::core::error::{Result, SimError};
use crate::dice::{DiceSource, ParallelDice};
use crate::profile::{CombatContext, UnitProfile};
use crate::simulation::output::SimulationReport;

/// One attacker/defender pairing under fixed conditions
#[derive(Debug, Clone, Copy)]
pub struct Simulation<'a> {
    pub attacker: &'a UnitProfile,
    pub defender: &'a UnitProfile,
    pub context: CombatContext,
}

/// Everything a run produced, stage by stage
#[derive(Debug, Clone)]
pub struct CombatOutcome {
    pub attack: AttackRoll,
    /// Defense counts before any save was spent
    pub defense: DefenseRoll,
    pub damage: DamageResult,
}

impl<'a> Simulation<'a> {
    pub fn new(
        attacker: &'a UnitProfile,
        defender: &'a UnitProfile,
        context: CombatContext,
    ) -> Self {
        Self {
            attacker,
            defender,
            context,
        }
    }

    /// Damage per trial
    pub fn run<D: DiceSource + ?Sized>(&self, trials: usize, dice: &mut D) -> Result<Vec<u32>> {
        Ok(self.run_detailed(trials, dice)?.damage.damage)
    }

    /// Run and keep the intermediate stage results
    pub fn run_detailed<D: DiceSource + ?Sized>(
        &self,
        trials: usize,
        dice: &mut D,
    ) -> Result<CombatOutcome> {
        if trials == 0 {
            return Err(SimError::InvalidTrialCount(0));
        }
        self.attacker.validate()?;
        self.defender.validate()?;

        let attack = resolve_attack(self.attacker, &self.context, trials, dice)?;
        let defense = resolve_defense(
            self.defender,
            self.attacker,
            &attack.counts.crit,
            &self.context,
            dice,
        )?;

        let mut hits = attack.counts.clone();
        let mut saves = defense.counts.clone();
        let damage = resolve_damage(&mut hits, &mut saves, WeaponDamage::from(self.attacker));

        Ok(CombatOutcome {
            attack,
            defense,
            damage,
        })
    }
}

/// Run a matchup with a dice source built from `config`
pub fn simulate(
    attacker: &UnitProfile,
    defender: &UnitProfile,
    context: CombatContext,
    config: &SimulationConfig,
) -> Result<SimulationReport> {
    config.validate()?;

    let start = Instant::now();
    let mut dice = ParallelDice::from_config(config);
    let damage =
        Simulation::new(attacker, defender, context).run(config.trials as usize, &mut dice)?;
    let elapsed = start.elapsed();

    tracing::info!(
        attacker = %attacker.name,
        defender = %defender.name,
        trials = config.trials,
        seed = dice.seed(),
        "Simulation finished in {:.2}ms",
        elapsed.as_secs_f64() * 1000.0
    );

    Ok(SimulationReport::new(
        attacker,
        defender,
        context,
        dice.seed(),
        dice.workers(),
        damage,
        elapsed,
    ))
}
