//! Designer tunables for one enemy archetype
//!
//! Every section carries `#[serde(default)]`, so a TOML file only needs the
//! values it changes:
//!
//! ```toml
//! health = 60
//! behavior = "relentless_chase"
//!
//! [detection]
//! find_radius = 12.0
//! return_radius = 18.0
//!
//! [patrol]
//! waypoints = [[2.0, 0.0, 2.0], [8.0, 0.0, 2.0]]
//! ```

use crate::error::{ConfigError, Result};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Movement and turning speeds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeedProfile {
    /// Walking speed on the patrol route (units/s)
    pub patrol: f32,
    /// Chasing speed (units/s)
    pub trace: f32,
    /// Speed when walking home (units/s)
    #[serde(rename = "return")]
    pub return_: f32,
    /// Turning speed (degrees/s)
    pub rotation_deg: f32,
}

impl Default for SpeedProfile {
    fn default() -> Self {
        Self {
            patrol: 2.0,
            trace: 4.0,
            return_: 3.0,
            rotation_deg: 360.0,
        }
    }
}

/// Detection radii and view cones
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionProfile {
    /// Target must be inside this radius to be noticed
    pub find_radius: f32,
    /// Chase is abandoned beyond this path distance
    pub return_radius: f32,
    /// Strikes land inside this radius
    pub attack_radius: f32,
    /// Full view cone used for noticing a target (degrees)
    pub view_angle_deg: f32,
    /// Wider cone used when deciding to start attacking (degrees)
    pub attack_view_angle_deg: f32,
    /// Attack is kept until the target is beyond `attack_radius * margin`
    pub attack_exit_margin: f32,
    /// Height of the sight ray above the feet
    pub eye_height: f32,
}

impl Default for DetectionProfile {
    fn default() -> Self {
        Self {
            find_radius: 10.0,
            return_radius: 15.0,
            attack_radius: 2.0,
            view_angle_deg: 120.0,
            attack_view_angle_deg: 240.0,
            attack_exit_margin: 1.2,
            eye_height: 1.6,
        }
    }
}

/// Durations and intervals, all in seconds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimerProfile {
    pub idle_duration: f32,
    pub attack_cooldown: f32,
    /// Delay between starting a strike and resolving its hit
    pub attack_windup: f32,
    pub max_trace_duration: f32,
    pub max_return_duration: f32,
    /// How often Trace re-requests a path to the moving target
    pub path_update_interval: f32,
    /// How often Return re-requests its path home
    pub return_path_refresh: f32,
    /// Time between death and deactivation
    pub death_duration: f32,
    /// Time between look-around samples while idle
    pub look_around_interval: f32,
}

impl Default for TimerProfile {
    fn default() -> Self {
        Self {
            idle_duration: 3.0,
            attack_cooldown: 1.5,
            attack_windup: 0.4,
            max_trace_duration: 20.0,
            max_return_duration: 15.0,
            path_update_interval: 0.25,
            return_path_refresh: 3.0,
            death_duration: 3.0,
            look_around_interval: 1.5,
        }
    }
}

/// Knockback and stagger applied on damage
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HitReactionProfile {
    pub knockback_duration: f32,
    /// Total stagger window; must cover the knockback
    pub stagger_duration: f32,
    /// Knockback velocity (units/s)
    pub knockback_speed: f32,
}

impl Default for HitReactionProfile {
    fn default() -> Self {
        Self {
            knockback_duration: 0.2,
            stagger_duration: 0.5,
            knockback_speed: 6.0,
        }
    }
}

/// Patrol route settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PatrolSettings {
    /// Pause at each stop
    pub wait_time: f32,
    /// Give up on a stop after this long without progress
    pub stuck_timeout: f32,
    pub waypoints: Vec<Vec3>,
    /// Single point patrolled in place when there are no waypoints
    pub fallback_point: Option<Vec3>,
}

impl Default for PatrolSettings {
    fn default() -> Self {
        Self {
            wait_time: 2.0,
            stuck_timeout: 3.0,
            waypoints: Vec::new(),
            fallback_point: None,
        }
    }
}

/// Strike and positioning settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AttackSettings {
    pub damage: i32,
    /// Preferred distance to the target while attacking
    pub optimal_distance: f32,
    /// Candidate positions sampled when repositioning (0 disables it)
    pub reposition_samples: u32,
}

impl Default for AttackSettings {
    fn default() -> Self {
        Self {
            damage: 10,
            optimal_distance: 1.5,
            reposition_samples: 8,
        }
    }
}

/// Which built-in decision policy drives the enemy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BehaviorKind {
    /// Patrol, chase while the target is near, walk home when it escapes
    #[default]
    PatrolAndLoseInterest,
    /// Never gives up a chase until the trace timeout
    RelentlessChase,
    /// Stands guard and never patrols
    Sentry,
}

/// Complete tunable set for one enemy archetype
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    pub health: i32,
    pub speeds: SpeedProfile,
    pub detection: DetectionProfile,
    pub timers: TimerProfile,
    pub hit_reaction: HitReactionProfile,
    pub patrol: PatrolSettings,
    pub attack: AttackSettings,
    /// Arrival tolerance for destinations
    pub stopping_distance: f32,
    pub behavior: BehaviorKind,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            health: 100,
            speeds: SpeedProfile::default(),
            detection: DetectionProfile::default(),
            timers: TimerProfile::default(),
            hit_reaction: HitReactionProfile::default(),
            patrol: PatrolSettings::default(),
            attack: AttackSettings::default(),
            stopping_distance: 0.5,
            behavior: BehaviorKind::default(),
        }
    }
}

impl EnemyConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        log::info!("Loaded enemy config from {}", path.display());
        Ok(config)
    }

    /// Set the behavior kind
    pub fn with_behavior(mut self, behavior: BehaviorKind) -> Self {
        self.behavior = behavior;
        self
    }

    /// Set the patrol waypoints
    pub fn with_waypoints(mut self, waypoints: Vec<Vec3>) -> Self {
        self.patrol.waypoints = waypoints;
        self
    }

    /// Set the detection radii
    pub fn with_radii(mut self, find: f32, return_: f32, attack: f32) -> Self {
        self.detection.find_radius = find;
        self.detection.return_radius = return_;
        self.detection.attack_radius = attack;
        self
    }

    /// Whether `attack_radius < find_radius <= return_radius` holds
    pub fn radius_ordering_ok(&self) -> bool {
        let d = &self.detection;
        d.attack_radius < d.find_radius && d.find_radius <= d.return_radius
    }

    /// Reject values the engine cannot run with
    ///
    /// A broken radius ordering is only logged: the states stay total over it.
    pub fn validate(&self) -> Result<()> {
        if self.health <= 0 {
            return Err(ConfigError::invalid("health", "must be positive"));
        }

        non_negative("speeds.patrol", self.speeds.patrol)?;
        non_negative("speeds.trace", self.speeds.trace)?;
        non_negative("speeds.return", self.speeds.return_)?;
        positive("speeds.rotation_deg", self.speeds.rotation_deg)?;

        let d = &self.detection;
        non_negative("detection.find_radius", d.find_radius)?;
        non_negative("detection.return_radius", d.return_radius)?;
        non_negative("detection.attack_radius", d.attack_radius)?;
        positive("detection.view_angle_deg", d.view_angle_deg)?;
        positive("detection.attack_view_angle_deg", d.attack_view_angle_deg)?;
        non_negative("detection.eye_height", d.eye_height)?;
        if !(d.attack_exit_margin >= 1.0) {
            return Err(ConfigError::invalid(
                "detection.attack_exit_margin",
                format!("must be at least 1.0, got {}", d.attack_exit_margin),
            ));
        }

        let t = &self.timers;
        non_negative("timers.idle_duration", t.idle_duration)?;
        non_negative("timers.attack_cooldown", t.attack_cooldown)?;
        non_negative("timers.attack_windup", t.attack_windup)?;
        positive("timers.max_trace_duration", t.max_trace_duration)?;
        positive("timers.max_return_duration", t.max_return_duration)?;
        positive("timers.path_update_interval", t.path_update_interval)?;
        positive("timers.return_path_refresh", t.return_path_refresh)?;
        non_negative("timers.death_duration", t.death_duration)?;
        positive("timers.look_around_interval", t.look_around_interval)?;

        let h = &self.hit_reaction;
        non_negative("hit_reaction.knockback_duration", h.knockback_duration)?;
        non_negative("hit_reaction.stagger_duration", h.stagger_duration)?;
        non_negative("hit_reaction.knockback_speed", h.knockback_speed)?;
        if h.stagger_duration < h.knockback_duration {
            return Err(ConfigError::invalid(
                "hit_reaction.stagger_duration",
                format!(
                    "{} is shorter than knockback_duration {}",
                    h.stagger_duration, h.knockback_duration
                ),
            ));
        }

        non_negative("patrol.wait_time", self.patrol.wait_time)?;
        positive("patrol.stuck_timeout", self.patrol.stuck_timeout)?;
        non_negative("attack.optimal_distance", self.attack.optimal_distance)?;
        if self.attack.damage < 0 {
            return Err(ConfigError::invalid("attack.damage", "must not be negative"));
        }
        non_negative("stopping_distance", self.stopping_distance)?;

        if !self.radius_ordering_ok() {
            log::warn!(
                "Detection radii out of order (attack {} < find {} <= return {} expected)",
                d.attack_radius,
                d.find_radius,
                d.return_radius
            );
        }

        Ok(())
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("must be finite and >= 0, got {value}")))
    }
}

fn positive(field: &'static str, value: f32) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("must be finite and > 0, got {value}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = EnemyConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.radius_ordering_ok());
    }

    #[test]
    fn test_partial_toml() {
        let config = EnemyConfig::from_toml_str(
            r#"
            health = 40
            behavior = "sentry"

            [detection]
            find_radius = 12.0
            return_radius = 20.0

            [speeds]
            return = 5.0

            [patrol]
            waypoints = [[1.0, 0.0, 1.0], [4.0, 0.0, 1.0]]
            "#,
        )
        .unwrap();

        assert_eq!(config.health, 40);
        assert_eq!(config.behavior, BehaviorKind::Sentry);
        assert_eq!(config.detection.find_radius, 12.0);
        assert_eq!(config.detection.attack_radius, 2.0);
        assert_eq!(config.speeds.return_, 5.0);
        assert_eq!(config.patrol.waypoints.len(), 2);
        assert_eq!(config.patrol.waypoints[1], Vec3::new(4.0, 0.0, 1.0));
    }

    #[test]
    fn test_stagger_shorter_than_knockback_rejected() {
        let mut config = EnemyConfig::default();
        config.hit_reaction.knockback_duration = 1.0;
        config.hit_reaction.stagger_duration = 0.5;
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "hit_reaction.stagger_duration",
                ..
            }
        ));
    }

    #[test]
    fn test_bad_ordering_is_accepted() {
        let config = EnemyConfig::default().with_radii(5.0, 4.0, 6.0);
        assert!(!config.radius_ordering_ok());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_nan_rejected() {
        let mut config = EnemyConfig::default();
        config.timers.path_update_interval = f32::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_error() {
        let err = EnemyConfig::from_toml_str("health = \"lots\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = EnemyConfig::load("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
