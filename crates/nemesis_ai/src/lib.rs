//! Nemesis AI - enemy behavior on top of navigation and combat
//!
//! This crate provides the decision layer of a hostile entity.
//!
//! # Features
//!
//! - [`EnemyStateMachine`] over Idle, Patrol, Trace, Attack, Return and Die
//! - [`Perception`]: range, view cone and line of sight
//! - [`HitReaction`]: knockback and stagger with exclusive movement authority
//! - [`PatrolController`]: cyclic waypoint routes with waits and stuck detection
//! - [`BehaviorStrategy`] policies that tell enemy archetypes apart
//! - [`Enemy`]: one agent plus its machine, ticked with an [`Environment`]
//!
//! # Example
//!
//! ```ignore
//! use nemesis_ai::prelude::*;
//!
//! let mut enemy = Enemy::new(EntityId::new(0, 0), EnemyConfig::default(), Pose::default())?;
//! enemy.tick(&mut env, 1.0 / 60.0);
//! ```

pub mod agent;
pub mod context;
pub mod enemy;
pub mod error;
pub mod hit_reaction;
pub mod patrol;
pub mod perception;
pub mod state_machine;
pub mod states;
pub mod strategy;

#[cfg(test)]
mod test_support;

pub mod prelude {
    pub use crate::agent::Agent;
    pub use crate::context::{Environment, Target, TargetInfo};
    pub use crate::enemy::Enemy;
    pub use crate::error::{AiError, PatrolError};
    pub use crate::hit_reaction::{HitReaction, StaggerRelease};
    pub use crate::patrol::{PatrolController, PatrolStatus};
    pub use crate::perception::Perception;
    pub use crate::state_machine::{EnemyStateMachine, StateBehavior};
    pub use crate::states::{
        default_states, AttackState, DieState, IdleState, PatrolState, ReturnState, TraceState,
    };
    pub use crate::strategy::{
        strategy_for, BehaviorStrategy, PatrolAndLoseInterest, RelentlessChase, Sentry,
    };
}

pub use prelude::*;
