//! Run-level seed sequence
//!
//! A single top-level seed fans out into any number of child seeds. Each
//! `spawn` call continues the same keyed ChaCha stream, so no two workers
//! (and no two batched calls within a run) ever share a child seed, yet the
//! whole run replays exactly from the top-level value.

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Seed material for one worker stream
pub type ChildSeed = [u8; 32];

#[derive(Debug, Clone)]
pub struct SeedSequence {
    entropy: u64,
    root: ChaCha8Rng,
    spawned: u64,
}

impl SeedSequence {
    pub fn new(entropy: u64) -> Self {
        Self {
            entropy,
            root: ChaCha8Rng::seed_from_u64(entropy),
            spawned: 0,
        }
    }

    /// Fresh OS entropy; the drawn value is still recoverable via `entropy()`
    pub fn from_entropy() -> Self {
        Self::new(rand::random())
    }

    /// Top-level seed this sequence was built from
    pub fn entropy(&self) -> u64 {
        self.entropy
    }

    /// Total child seeds handed out so far
    pub fn spawned(&self) -> u64 {
        self.spawned
    }

    /// Derive `n` child seeds, never repeating earlier ones
    pub fn spawn(&mut self, n: usize) -> Vec<ChildSeed> {
        let seeds: Vec<ChildSeed> = (0..n)
            .map(|_| {
                let mut seed = ChildSeed::default();
                self.root.fill_bytes(&mut seed);
                seed
            })
            .collect();
        self.spawned += n as u64;
        seeds
    }
}
