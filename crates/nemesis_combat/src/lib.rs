//! Nemesis Combat - health, damage and attacks
//!
//! # Features
//!
//! - Integer [`Health`] pool clamped to `[0, max]`
//! - [`DamageSource`]/[`DamageEvent`] value objects and the [`DamageReceiver`] contract
//! - [`CombatModule`]: cooldown-gated strikes with a windup that is re-validated
//!   before damage lands
//!
//! # Example
//!
//! ```
//! use nemesis_combat::prelude::*;
//! use nemesis_core::EntityId;
//!
//! let mut combat = CombatModule::new(100, AttackProfile::default());
//! assert!(combat.try_attack(EntityId::new(1, 0)));
//! assert!(combat.is_attacking());
//! ```

pub mod attack;
pub mod damage;
pub mod health;

pub mod prelude {
    pub use crate::attack::{AttackOutcome, AttackProfile, CombatModule, DamageOutcome, StrikeDue};
    pub use crate::damage::{DamageEvent, DamageReceiver, DamageSource};
    pub use crate::health::{Health, HealthChange};
}

pub use prelude::*;
