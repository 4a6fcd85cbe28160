//! Nemesis Core - shared primitives for the enemy behavior engine
//!
//! # Contents
//!
//! - Entity ids and the [`StateId`] of the enemy state machine
//! - Yaw-only [`Pose`] math on top of `glam`
//! - [`EnemyConfig`] designer tunables with TOML loading and validation
//! - [`EnemyEvent`] notifications and the [`EffectSink`] hook

pub mod config;
pub mod error;
pub mod events;
pub mod id;
pub mod math;

pub use glam;

pub mod prelude {
    pub use crate::config::{
        AttackSettings, BehaviorKind, DetectionProfile, EnemyConfig, HitReactionProfile,
        PatrolSettings, SpeedProfile, TimerProfile,
    };
    pub use crate::error::ConfigError;
    pub use crate::events::{EffectSink, EnemyEvent, EventLog, NullSink};
    pub use crate::id::{EntityId, IdGenerator, StateId};
    pub use crate::math::Pose;
}

pub use prelude::*;
