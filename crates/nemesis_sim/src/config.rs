//! Scenario configuration
//!
//! A scenario describes the map, the player script and the enemy spawns.
//!
//! # Configuration Sources (in priority order)
//!
//! 1. Command line flags (`--seed`, `--ticks`)
//! 2. Environment variables: `NEMESIS_SEED`, `NEMESIS_TICKS`
//! 3. Scenario file (TOML)
//!
//! # Example Scenario File
//!
//! ```toml
//! name = "courtyard"
//! tick_rate = 30.0
//! ticks = 900
//! seed = 7
//!
//! [map]
//! cell_size = 1.0
//! rows = [
//!     "..........",
//!     "....##....",
//!     "..........",
//! ]
//!
//! [player]
//! position = [1.5, 0.0, 1.5]
//! waypoints = [[8.5, 0.0, 1.5]]
//!
//! [[enemies]]
//! position = [8.5, 0.0, 2.5]
//! [enemies.config]
//! health = 40
//! ```

use glam::Vec3;
use nemesis_ai::AiError;
use nemesis_core::{ConfigError, EnemyConfig};
use nemesis_nav::{CollisionLayer, NavMesh, ObstacleField};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading or running a scenario
#[derive(Debug, Error)]
pub enum SimError {
    #[error("Failed to read scenario {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse scenario: {0}")]
    Parse(#[from] toml::de::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Ai(#[from] AiError),

    #[error("Invalid scenario: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, SimError>;

/// Walkable layout of the level
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub cell_size: f32,
    /// One string per row, `#` is blocked
    pub rows: Vec<String>,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            cell_size: 1.0,
            rows: vec![".".repeat(24); 24],
        }
    }
}

impl MapConfig {
    pub fn build(&self) -> NavMesh {
        NavMesh::from_ascii(&self.rows.join("\n"), self.cell_size)
    }
}

/// An axis-aligned box that blocks sight
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObstacleConfig {
    pub min: Vec3,
    pub max: Vec3,
    #[serde(default = "default_layer")]
    pub layer: String,
}

fn default_layer() -> String {
    "environment".to_string()
}

/// Periodic melee swing of the scripted player
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerAttack {
    pub damage: i32,
    pub range: f32,
    /// Seconds between swings
    pub interval: f32,
}

impl Default for PlayerAttack {
    fn default() -> Self {
        Self {
            damage: 25,
            range: 2.0,
            interval: 1.0,
        }
    }
}

/// The scripted target
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub position: Vec3,
    pub health: i32,
    /// Walking speed along the waypoints (units/s)
    pub speed: f32,
    pub waypoints: Vec<Vec3>,
    /// Start over at the first waypoint after the last
    pub looping: bool,
    pub attack: Option<PlayerAttack>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(1.5, 0.0, 1.5),
            health: 100,
            speed: 2.5,
            waypoints: Vec::new(),
            looping: false,
            attack: None,
        }
    }
}

/// One enemy placed in the level
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnConfig {
    pub position: Vec3,
    #[serde(default = "default_facing")]
    pub facing: Vec3,
    #[serde(default)]
    pub config: EnemyConfig,
    /// Archetype file loaded instead of the inline `config`
    #[serde(default)]
    pub config_file: Option<PathBuf>,
}

fn default_facing() -> Vec3 {
    Vec3::Z
}

impl SpawnConfig {
    /// The tunables for this spawn, reading `config_file` relative to `base` if set
    pub fn resolve(&self, base: Option<&Path>) -> Result<EnemyConfig> {
        match &self.config_file {
            Some(file) => {
                let path = match base {
                    Some(base) if file.is_relative() => base.join(file),
                    _ => file.clone(),
                };
                Ok(EnemyConfig::load(path)?)
            }
            None => {
                self.config.validate()?;
                Ok(self.config.clone())
            }
        }
    }
}

/// Complete scenario description
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub name: String,
    /// Simulation steps per second
    pub tick_rate: f32,
    /// Number of steps to run
    pub ticks: u32,
    pub seed: u64,
    pub map: MapConfig,
    pub obstacles: Vec<ObstacleConfig>,
    pub player: PlayerConfig,
    pub enemies: Vec<SpawnConfig>,
    /// Directory of the scenario file, for relative archetype paths
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            name: "unnamed".to_string(),
            tick_rate: 30.0,
            ticks: 600,
            seed: 0,
            map: MapConfig::default(),
            obstacles: Vec::new(),
            player: PlayerConfig::default(),
            enemies: Vec::new(),
            base_dir: None,
        }
    }
}

impl ScenarioConfig {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let scenario: Self = toml::from_str(source)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Load a scenario file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| SimError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut scenario = Self::from_toml_str(&content)?;
        scenario.base_dir = path.parent().map(Path::to_path_buf);
        log::info!("Loaded scenario '{}' from {}", scenario.name, path.display());
        Ok(scenario)
    }

    /// Override with `NEMESIS_SEED` and `NEMESIS_TICKS`
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Override from any key lookup. Unparsable values are logged and ignored.
    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(value) = lookup("NEMESIS_SEED") {
            match value.trim().parse() {
                Ok(seed) => {
                    self.seed = seed;
                    log::info!("Seed from env: {}", self.seed);
                }
                Err(_) => log::warn!("Ignoring NEMESIS_SEED={value}: not an integer"),
            }
        }

        if let Some(value) = lookup("NEMESIS_TICKS") {
            match value.trim().parse() {
                Ok(ticks) => {
                    self.ticks = ticks;
                    log::info!("Ticks from env: {}", self.ticks);
                }
                Err(_) => log::warn!("Ignoring NEMESIS_TICKS={value}: not an integer"),
            }
        }
    }

    /// Seconds per step
    pub fn delta_time(&self) -> f32 {
        1.0 / self.tick_rate
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.tick_rate > 0.0 && self.tick_rate.is_finite()) {
            return Err(SimError::Invalid(format!(
                "tick_rate must be positive, got {}",
                self.tick_rate
            )));
        }
        if !(self.map.cell_size > 0.0) {
            return Err(SimError::Invalid("map.cell_size must be positive".into()));
        }
        if self.map.rows.iter().all(|row| row.trim().is_empty()) {
            return Err(SimError::Invalid("map has no rows".into()));
        }
        if self.player.health <= 0 {
            return Err(SimError::Invalid("player.health must be positive".into()));
        }
        for obstacle in &self.obstacles {
            if CollisionLayer::from_name(&obstacle.layer).is_none() {
                return Err(SimError::Invalid(format!(
                    "unknown collision layer '{}'",
                    obstacle.layer
                )));
            }
        }
        Ok(())
    }

    /// Sight blockers described by `obstacles`
    pub fn build_obstacles(&self) -> ObstacleField {
        let mut field = ObstacleField::new();
        for obstacle in &self.obstacles {
            let layer = CollisionLayer::from_name(&obstacle.layer).unwrap_or(CollisionLayer::ENVIRONMENT);
            field.add_box(obstacle.min, obstacle.max, layer);
        }
        field
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SCENARIO: &str = r#"
        name = "hall"
        tick_rate = 20.0
        ticks = 100

        [map]
        rows = ["......", "..##..", "......"]

        [[obstacles]]
        min = [2.0, 0.0, 1.0]
        max = [4.0, 3.0, 2.0]

        [[enemies]]
        position = [5.5, 0.0, 0.5]
        [enemies.config]
        health = 30
    "#;

    #[test]
    fn test_parse_scenario() {
        let scenario = match ScenarioConfig::from_toml_str(SCENARIO) {
            Ok(s) => s,
            Err(e) => panic!("scenario should parse: {e}"),
        };
        assert_eq!(scenario.name, "hall");
        assert_eq!(scenario.ticks, 100);
        assert_eq!(scenario.enemies.len(), 1);
        assert_eq!(scenario.enemies[0].config.health, 30);
        assert_eq!(scenario.enemies[0].facing, Vec3::Z);
        assert_eq!(scenario.build_obstacles().len(), 1);
        assert_eq!(scenario.map.build().walkable_count(), 16);
    }

    #[test]
    fn test_env_overrides() {
        let mut scenario = ScenarioConfig::default();
        let vars: HashMap<&str, &str> = [("NEMESIS_SEED", "42"), ("NEMESIS_TICKS", "oops")].into();
        scenario.apply_overrides_from(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(scenario.seed, 42);
        assert_eq!(scenario.ticks, 600);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(ScenarioConfig::from_toml_str("tick_rate = 0.0").is_err());
        assert!(ScenarioConfig::from_toml_str(
            "[[obstacles]]\nmin = [0.0, 0.0, 0.0]\nmax = [1.0, 1.0, 1.0]\nlayer = \"lava\""
        )
        .is_err());
    }

    #[test]
    fn test_spawn_resolve_validates_inline_config() {
        let mut spawn = SpawnConfig {
            position: Vec3::ZERO,
            facing: Vec3::Z,
            config: EnemyConfig::default(),
            config_file: None,
        };
        assert!(spawn.resolve(None).is_ok());
        spawn.config.health = -1;
        assert!(spawn.resolve(None).is_err());
    }
}
