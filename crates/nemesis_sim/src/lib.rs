//! Nemesis Sim - headless runner for enemy scenarios
//!
//! Composition root of the workspace: builds a level from a [`ScenarioConfig`],
//! drives every [`Enemy`](nemesis_ai::Enemy) against a scripted
//! [`PlayerProxy`] and recycles finished enemies through an [`EnemyPool`].

pub mod config;
pub mod player;
pub mod pool;
pub mod simulation;

pub mod prelude {
    pub use crate::config::{
        MapConfig, ObstacleConfig, PlayerAttack, PlayerConfig, ScenarioConfig, SimError, SpawnConfig,
    };
    pub use crate::player::PlayerProxy;
    pub use crate::pool::{DiscardPool, EnemyPool, VecPool};
    pub use crate::simulation::{SimReport, Simulation};
}

pub use prelude::*;

/// Scenario used when no file is given
pub const DEMO_SCENARIO: &str = include_str!("../scenarios/courtyard.toml");
