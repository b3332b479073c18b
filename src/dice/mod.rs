//! Dice generation: batched d6 matrices with reproducible parallel streams

pub mod matrix;
pub mod seed;
pub mod source;

pub use matrix::DiceMatrix;
pub use seed::SeedSequence;
pub use source::{DiceSource, ParallelDice, ScriptedDice};

/// Faces on every die in the game
pub const DIE_FACES: u8 = 6;
