//! Unit profiles: the normalised attacker/defender inputs to a run

pub mod context;
pub mod modifier;
pub mod record;
pub mod unit;

pub use context::CombatContext;
pub use modifier::{Modifier, Modifiers, Reroll};
pub use record::ProfileRecord;
pub use unit::UnitProfile;
