//! Scripted stand-in for the player

use crate::config::{PlayerAttack, PlayerConfig};
use glam::Vec3;
use nemesis_ai::Target;
use nemesis_combat::{DamageReceiver, DamageSource};
use nemesis_core::EntityId;

/// Walks a waypoint script, takes hits and optionally swings back
#[derive(Debug, Clone)]
pub struct PlayerProxy {
    id: EntityId,
    position: Vec3,
    health: i32,
    max_health: i32,
    speed: f32,
    waypoints: Vec<Vec3>,
    looping: bool,
    next_waypoint: usize,
    attack: Option<PlayerAttack>,
    attack_timer: f32,
    damage_taken: i32,
    hits_taken: u32,
}

impl PlayerProxy {
    pub fn new(id: EntityId, config: &PlayerConfig) -> Self {
        Self {
            id,
            position: config.position,
            health: config.health.max(1),
            max_health: config.health.max(1),
            speed: config.speed.max(0.0),
            waypoints: config.waypoints.clone(),
            looping: config.looping,
            next_waypoint: 0,
            attack: config.attack.clone(),
            attack_timer: 0.0,
            damage_taken: 0,
            hits_taken: 0,
        }
    }

    pub fn health(&self) -> i32 {
        self.health
    }

    pub fn max_health(&self) -> i32 {
        self.max_health
    }

    pub fn damage_taken(&self) -> i32 {
        self.damage_taken
    }

    pub fn hits_taken(&self) -> u32 {
        self.hits_taken
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    /// Whether the script has no more waypoints to walk
    pub fn is_idle(&self) -> bool {
        self.next_waypoint >= self.waypoints.len()
    }

    /// Walk toward the next waypoint. Dead players stand still.
    pub fn update(&mut self, delta_time: f32) {
        if !self.is_alive() {
            return;
        }
        self.attack_timer += delta_time;

        let mut budget = self.speed * delta_time;
        // Bounded so a loop of coincident waypoints cannot spin forever
        let mut reached = 0;
        while budget > 0.0 && reached <= self.waypoints.len() {
            let Some(&goal) = self.waypoints.get(self.next_waypoint) else {
                break;
            };
            let to_goal = goal - self.position;
            let distance = to_goal.length();
            if distance <= budget {
                self.position = goal;
                budget -= distance;
                self.next_waypoint += 1;
                reached += 1;
                if self.looping && self.next_waypoint >= self.waypoints.len() {
                    self.next_waypoint = 0;
                }
            } else {
                self.position += to_goal / distance * budget;
                budget = 0.0;
            }
        }
    }

    /// Damage for a swing at a target `distance` away, if one is due
    pub fn try_swing(&mut self, distance: f32) -> Option<i32> {
        let attack = self.attack.as_ref()?;
        if !self.is_alive() || distance > attack.range || self.attack_timer < attack.interval {
            return None;
        }
        self.attack_timer = 0.0;
        Some(attack.damage)
    }
}

impl DamageReceiver for PlayerProxy {
    fn take_damage(&mut self, amount: i32, source: DamageSource) {
        if amount <= 0 || !self.is_alive() {
            return;
        }
        self.health = (self.health - amount).max(0);
        self.damage_taken += amount;
        self.hits_taken += 1;
        log::debug!(
            "Player took {amount} from {} ({}/{})",
            source.entity,
            self.health,
            self.max_health
        );
        if self.health == 0 {
            log::info!("Player was killed by {}", source.entity);
        }
    }
}

impl Target for PlayerProxy {
    fn entity_id(&self) -> EntityId {
        self.id
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn is_alive(&self) -> bool {
        self.health > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn player(waypoints: Vec<Vec3>, looping: bool) -> PlayerProxy {
        let config = PlayerConfig {
            position: Vec3::ZERO,
            speed: 2.0,
            waypoints,
            looping,
            ..PlayerConfig::default()
        };
        PlayerProxy::new(EntityId::new(9, 0), &config)
    }

    #[test]
    fn test_walks_waypoints() {
        let mut player = player(vec![Vec3::new(2.0, 0.0, 0.0), Vec3::new(2.0, 0.0, 2.0)], false);
        player.update(0.5);
        assert_abs_diff_eq!(player.position().x, 1.0);
        player.update(1.0);
        assert_abs_diff_eq!(player.position().z, 1.0);
        player.update(5.0);
        assert_eq!(player.position(), Vec3::new(2.0, 0.0, 2.0));
        assert!(player.is_idle());
    }

    #[test]
    fn test_loops() {
        let mut player = player(vec![Vec3::new(1.0, 0.0, 0.0), Vec3::ZERO], true);
        player.update(1.5);
        assert!(!player.is_idle());
        // Out to x = 1, back to the origin, out again
        assert_abs_diff_eq!(player.position().x, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_damage_and_death() {
        let mut player = player(Vec::new(), false);
        let source = DamageSource::new(EntityId::new(1, 0), Vec3::ZERO);
        player.take_damage(60, source);
        player.take_damage(60, source);
        player.take_damage(60, source);
        assert_eq!(player.health(), 0);
        assert!(!player.is_alive());
        assert_eq!(player.hits_taken(), 2);
        assert_eq!(player.damage_taken(), 120);
    }

    #[test]
    fn test_swing_respects_interval_and_range() {
        let mut config = PlayerConfig::default();
        config.attack = Some(PlayerAttack {
            damage: 5,
            range: 2.0,
            interval: 1.0,
        });
        let mut player = PlayerProxy::new(EntityId::new(9, 0), &config);
        assert_eq!(player.try_swing(1.0), None);
        player.update(1.0);
        assert_eq!(player.try_swing(3.0), None);
        assert_eq!(player.try_swing(1.0), Some(5));
        assert_eq!(player.try_swing(1.0), None);
    }
}
