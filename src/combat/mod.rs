//! Combat exchange resolution over batches of trials

pub mod attack;
pub mod damage;
pub mod defense;
pub mod trials;

pub use attack::{resolve_attack, AttackRoll};
pub use damage::{resolve_damage, DamageResult, WeaponDamage};
pub use defense::{resolve_defense, DefenseRoll, DEFENSE_DICE};
pub use trials::HitCounts;
