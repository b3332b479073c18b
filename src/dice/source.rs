//! Dice sources
//!
//! `ParallelDice` is the production source: rows are split into one
//! contiguous slice per worker and each slice is filled from its own ChaCha8
//! stream. `ScriptedDice` replays fixed matrices for hand-traced scenarios.

use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use crate::core::config::SimulationConfig;
use crate::core::error::{Result, SimError};
use crate::dice::seed::{ChildSeed, SeedSequence};
use crate::dice::{DiceMatrix, DIE_FACES};

/// Anything that can produce a trials × dice matrix of d6 results
pub trait DiceSource {
    /// Roll `dice` dice for each of `trials` independent trials
    fn roll(&mut self, trials: usize, dice: usize) -> Result<DiceMatrix>;
}

impl<D: DiceSource + ?Sized> DiceSource for &mut D {
    fn roll(&mut self, trials: usize, dice: usize) -> Result<DiceMatrix> {
        (**self).roll(trials, dice)
    }
}

/// Worker-partitioned dice source
#[derive(Debug, Clone)]
pub struct ParallelDice {
    seeds: SeedSequence,
    workers: usize,
    parallel_threshold: usize,
}

impl ParallelDice {
    pub fn new(seeds: SeedSequence, workers: usize) -> Self {
        Self {
            seeds,
            workers: workers.max(1),
            parallel_threshold: 0,
        }
    }

    /// Seeded from `config.seed` (or OS entropy) with the configured workers
    pub fn from_config(config: &SimulationConfig) -> Self {
        let seeds = match config.seed {
            Some(seed) => SeedSequence::new(seed),
            None => SeedSequence::from_entropy(),
        };
        Self {
            seeds,
            workers: config.effective_workers(),
            parallel_threshold: config.parallel_threshold,
        }
    }

    pub fn with_parallel_threshold(mut self, cells: usize) -> Self {
        self.parallel_threshold = cells;
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Top-level seed, for reporting alongside results
    pub fn seed(&self) -> u64 {
        self.seeds.entropy()
    }
}

fn fill_slice((cells, seed): (&mut [u8], &ChildSeed)) {
    let mut rng = ChaCha8Rng::from_seed(*seed);
    for cell in cells {
        *cell = rng.gen_range(1..=DIE_FACES);
    }
}

impl DiceSource for ParallelDice {
    fn roll(&mut self, trials: usize, dice: usize) -> Result<DiceMatrix> {
        if trials == 0 || dice == 0 {
            return Ok(DiceMatrix::empty(trials, dice));
        }

        let workers = self.workers.min(trials);
        let slice_cells = trials.div_ceil(workers) * dice;
        let seeds = self.seeds.spawn(workers);
        let mut data = vec![0u8; trials * dice];

        if data.len() >= self.parallel_threshold {
            data.par_chunks_mut(slice_cells)
                .zip(seeds.par_iter())
                .for_each(fill_slice);
        } else {
            data.chunks_mut(slice_cells)
                .zip(seeds.iter())
                .for_each(fill_slice);
        }

        Ok(DiceMatrix::from_raw(trials, dice, data))
    }
}

/// Replays queued matrices in order
#[derive(Debug, Clone, Default)]
pub struct ScriptedDice {
    queue: VecDeque<DiceMatrix>,
}

impl ScriptedDice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the matrix returned by the next non-empty `roll`
    pub fn push(&mut self, matrix: DiceMatrix) -> &mut Self {
        self.queue.push_back(matrix);
        self
    }

    /// Queue explicit rows
    pub fn push_rows(&mut self, rows: Vec<Vec<u8>>) -> Result<&mut Self> {
        let matrix = DiceMatrix::from_rows(rows)?;
        Ok(self.push(matrix))
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }
}

impl DiceSource for ScriptedDice {
    fn roll(&mut self, trials: usize, dice: usize) -> Result<DiceMatrix> {
        if trials == 0 || dice == 0 {
            return Ok(DiceMatrix::empty(trials, dice));
        }

        let next = self.queue.pop_front().ok_or_else(|| {
            SimError::Dice(format!("no scripted roll left for {}x{}", trials, dice))
        })?;

        if next.rows() != trials || next.cols() != dice {
            return Err(SimError::Dice(format!(
                "scripted roll is {}x{} but {}x{} was requested",
                next.rows(),
                next.cols(),
                trials,
                dice
            )));
        }
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_faces_in_range() {
        let mut dice = ParallelDice::new(SeedSequence::new(1), 4);
        let m = dice.roll(1000, 5).unwrap();
        assert_eq!(m.rows(), 1000);
        assert_eq!(m.cols(), 5);
        assert!(m.iter_rows().flatten().all(|&v| (1..=6).contains(&v)));
    }

    #[test]
    fn test_every_face_appears() {
        let mut dice = ParallelDice::new(SeedSequence::new(3), 2);
        let m = dice.roll(600, 4).unwrap();
        for face in 1..=6u8 {
            let n = m.iter_rows().flatten().filter(|&&v| v == face).count();
            // 2400 dice, expected 400 per face
            assert!(n > 300 && n < 500, "face {} seen {} times", face, n);
        }
    }

    #[test]
    fn test_reproducible_with_fixed_seed() {
        let mut a = ParallelDice::new(SeedSequence::new(99), 4);
        let mut b = ParallelDice::new(SeedSequence::new(99), 4);
        assert_eq!(a.roll(250, 3).unwrap(), b.roll(250, 3).unwrap());
        assert_eq!(a.roll(17, 2).unwrap(), b.roll(17, 2).unwrap());
    }

    #[test]
    fn test_parallel_and_sequential_fill_agree() {
        let mut par = ParallelDice::new(SeedSequence::new(5), 4).with_parallel_threshold(0);
        let mut seq =
            ParallelDice::new(SeedSequence::new(5), 4).with_parallel_threshold(usize::MAX);
        assert_eq!(par.roll(1001, 3).unwrap(), seq.roll(1001, 3).unwrap());
    }

    #[test]
    fn test_repeated_calls_use_fresh_streams() {
        let mut dice = ParallelDice::new(SeedSequence::new(11), 1);
        let first = dice.roll(64, 4).unwrap();
        let second = dice.roll(64, 4).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_worker_slices_are_independent() {
        // Two workers, two rows each: the slices must not replay each other
        let mut dice = ParallelDice::new(SeedSequence::new(8), 2);
        let m = dice.roll(4, 16).unwrap();
        assert_ne!(m.row(0), m.row(2));
        assert_ne!(m.row(1), m.row(3));
    }

    #[test]
    fn test_more_workers_than_trials() {
        let mut dice = ParallelDice::new(SeedSequence::new(2), 16);
        let m = dice.roll(3, 2).unwrap();
        assert_eq!(m.rows(), 3);
        assert!(m.iter_rows().flatten().all(|&v| (1..=6).contains(&v)));
    }

    #[test]
    fn test_zero_width_roll_is_empty() {
        let mut dice = ParallelDice::new(SeedSequence::new(2), 4);
        let m = dice.roll(10, 0).unwrap();
        assert_eq!(m.rows(), 10);
        assert!(m.is_empty());
    }

    #[test]
    fn test_scripted_replays_in_order() {
        let mut dice = ScriptedDice::new();
        dice.push_rows(vec![vec![6, 5, 3, 2]]).unwrap();
        dice.push_rows(vec![vec![1, 2, 6]]).unwrap();

        assert_eq!(dice.roll(1, 4).unwrap().row(0), &[6, 5, 3, 2]);
        assert_eq!(dice.roll(1, 3).unwrap().row(0), &[1, 2, 6]);
        assert!(dice.roll(1, 3).is_err());
    }

    #[test]
    fn test_scripted_shape_mismatch() {
        let mut dice = ScriptedDice::new();
        dice.push_rows(vec![vec![6, 5]]).unwrap();
        assert!(matches!(dice.roll(1, 3), Err(SimError::Dice(_))));
    }

    #[test]
    fn test_scripted_zero_width_does_not_consume() {
        let mut dice = ScriptedDice::new();
        dice.push_rows(vec![vec![6]]).unwrap();
        assert!(dice.roll(5, 0).unwrap().is_empty());
        assert_eq!(dice.remaining(), 1);
    }
}
