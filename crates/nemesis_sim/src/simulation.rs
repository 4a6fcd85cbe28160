//! Simulation loop
//!
//! Owns the level, the scripted player and every active enemy, and advances
//! them in lockstep. Enemies that finished dying leave the active list and go
//! to the [`EnemyPool`].

use crate::config::{Result, ScenarioConfig};
use crate::player::PlayerProxy;
use crate::pool::{EnemyPool, VecPool};
use glam::Vec3;
use nemesis_ai::{Enemy, Environment, Target};
use nemesis_combat::{DamageEvent, DamageSource};
use nemesis_core::{EnemyConfig, EnemyEvent, EntityId, EventLog, IdGenerator, Pose};
use nemesis_nav::{FreeLocomotion, NavMeshProvider, ObstacleField};
use parking_lot::Mutex;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Summary of a run so far
#[derive(Debug, Clone, Serialize)]
pub struct SimReport {
    pub ticks: u64,
    pub elapsed: f32,
    pub active_enemies: usize,
    pub released_enemies: usize,
    pub player_health: i32,
    pub player_alive: bool,
    /// Active enemies per state name
    pub states: BTreeMap<String, usize>,
}

/// Headless world advancing enemies against a scripted player
pub struct Simulation {
    nav: NavMeshProvider,
    walls: ObstacleField,
    locomotion: FreeLocomotion,
    player: PlayerProxy,
    enemies: Vec<Enemy>,
    rng: ChaCha8Rng,
    events: Arc<Mutex<EventLog>>,
    pool: Box<dyn EnemyPool>,
    ids: IdGenerator,
    delta_time: f32,
    ticks: u64,
    released: usize,
}

impl Simulation {
    /// Build the level and spawn every enemy of `scenario`
    pub fn new(scenario: &ScenarioConfig) -> Result<Self> {
        scenario.validate()?;
        let ids = IdGenerator::new();
        let player = PlayerProxy::new(ids.next(), &scenario.player);

        let mut sim = Self {
            nav: NavMeshProvider::new(scenario.map.build()),
            walls: scenario.build_obstacles(),
            locomotion: FreeLocomotion,
            player,
            enemies: Vec::with_capacity(scenario.enemies.len()),
            rng: ChaCha8Rng::seed_from_u64(scenario.seed),
            events: Arc::new(Mutex::new(EventLog::new())),
            pool: Box::new(VecPool::new()),
            ids,
            delta_time: scenario.delta_time(),
            ticks: 0,
            released: 0,
        };

        for spawn in &scenario.enemies {
            let config = spawn.resolve(scenario.base_dir.as_deref())?;
            sim.spawn(config, Pose::looking(spawn.position, spawn.facing))?;
        }
        log::info!(
            "Simulation '{}' ready: {} enemies, dt {:.4}s, seed {}",
            scenario.name,
            sim.enemies.len(),
            sim.delta_time,
            scenario.seed
        );
        Ok(sim)
    }

    /// Use another pool for released enemies
    pub fn with_pool(mut self, pool: Box<dyn EnemyPool>) -> Self {
        self.pool = pool;
        self
    }

    /// Place an enemy, reusing a pooled one when available
    pub fn spawn(&mut self, config: EnemyConfig, pose: Pose) -> Result<EntityId> {
        let enemy = match self.pool.acquire() {
            Some(mut enemy) => {
                let id = enemy.id().next_generation();
                enemy.reconfigure(config)?;
                enemy.respawn(id, pose)?;
                log::debug!("Respawned pooled enemy as {id}");
                enemy
            }
            None => Enemy::new(self.ids.next(), config, pose)?,
        };
        let id = enemy.id();
        self.enemies.push(enemy);
        Ok(id)
    }

    /// Advance the world by one tick
    pub fn step(&mut self) {
        let dt = self.delta_time;
        self.player.update(dt);

        for enemy in &mut self.enemies {
            let mut env = Environment {
                navigation: &self.nav,
                raycaster: &self.walls,
                locomotion: &mut self.locomotion,
                target: Some(&mut self.player),
                events: &mut self.events,
                rng: &mut self.rng,
            };
            enemy.tick(&mut env, dt);
        }

        self.player_swing();
        self.release_finished();
        self.ticks += 1;
    }

    /// Run `ticks` steps and report
    pub fn run(&mut self, ticks: u32) -> SimReport {
        for _ in 0..ticks {
            self.step();
        }
        self.report()
    }

    /// The player hits the closest living enemy in reach
    fn player_swing(&mut self) {
        let origin = self.player.position();
        let closest = self
            .enemies
            .iter_mut()
            .filter(|enemy| !enemy.is_dead())
            .map(|enemy| (enemy.agent().body.position().distance(origin), enemy))
            .min_by(|a, b| a.0.total_cmp(&b.0));

        if let Some((distance, enemy)) = closest {
            if let Some(damage) = self.player.try_swing(distance) {
                log::debug!("Player swings at {} for {damage}", enemy.id());
                DamageEvent::new(damage, DamageSource::new(self.player.entity_id(), origin)).apply_to(enemy);
            }
        }
    }

    /// Hand every deactivated enemy to the pool, exactly once
    fn release_finished(&mut self) {
        if !self.enemies.iter().any(Enemy::is_deactivated) {
            return;
        }
        let (finished, active): (Vec<Enemy>, Vec<Enemy>) = std::mem::take(&mut self.enemies)
            .into_iter()
            .partition(Enemy::is_deactivated);
        self.enemies = active;
        for enemy in finished {
            log::info!("Enemy {} released", enemy.id());
            self.released += 1;
            self.pool.release(enemy);
        }
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn enemy_mut(&mut self, id: EntityId) -> Option<&mut Enemy> {
        self.enemies.iter_mut().find(|enemy| enemy.id() == id)
    }

    pub fn player(&self) -> &PlayerProxy {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut PlayerProxy {
        &mut self.player
    }

    /// Move the scripted player, for tests and tools
    pub fn teleport_player(&mut self, position: Vec3) {
        self.player.set_position(position);
    }

    /// Shared handle on the event log, for outside consumers
    pub fn events(&self) -> Arc<Mutex<EventLog>> {
        Arc::clone(&self.events)
    }

    /// Take the events recorded since the last drain
    pub fn drain_events(&self) -> Vec<EnemyEvent> {
        self.events.lock().drain()
    }

    pub fn pooled(&self) -> usize {
        self.pool.available()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn report(&self) -> SimReport {
        let mut states = BTreeMap::new();
        for enemy in &self.enemies {
            *states.entry(enemy.state().name().to_string()).or_insert(0) += 1;
        }
        SimReport {
            ticks: self.ticks,
            elapsed: self.ticks as f32 * self.delta_time,
            active_enemies: self.enemies.len(),
            released_enemies: self.released,
            player_health: self.player.health(),
            player_alive: self.player.is_alive(),
            states,
        }
    }
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("ticks", &self.ticks)
            .field("enemies", &self.enemies.len())
            .field("released", &self.released)
            .field("player", &self.player.position())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SpawnConfig;
    use crate::pool::DiscardPool;
    use nemesis_combat::DamageReceiver;

    fn scenario(enemy_at: Vec3, player_at: Vec3) -> ScenarioConfig {
        let mut scenario = ScenarioConfig::default();
        scenario.tick_rate = 10.0;
        scenario.player.position = player_at;
        scenario.enemies.push(SpawnConfig {
            position: enemy_at,
            facing: Vec3::Z,
            config: EnemyConfig::default(),
            config_file: None,
        });
        scenario
    }

    fn sim(scenario: &ScenarioConfig) -> Simulation {
        match Simulation::new(scenario) {
            Ok(sim) => sim,
            Err(e) => panic!("simulation should build: {e}"),
        }
    }

    #[test]
    fn test_enemy_chases_player() {
        let mut sim = sim(&scenario(Vec3::new(2.5, 0.0, 2.5), Vec3::new(2.5, 0.0, 9.5)));
        let report = sim.run(3);
        assert_eq!(report.states.get("trace"), Some(&1));
        assert!(sim.enemies()[0].agent().body.position().z > 2.5);
    }

    #[test]
    fn test_dead_enemy_is_released_once() {
        let mut scenario = scenario(Vec3::new(2.5, 0.0, 2.5), Vec3::new(20.5, 0.0, 20.5));
        scenario.enemies[0].config.timers.death_duration = 0.2;
        let mut sim = sim(&scenario);
        sim.step();

        let id = sim.enemies()[0].id();
        if let Some(enemy) = sim.enemy_mut(id) {
            enemy.take_damage(1000, DamageSource::new(EntityId::new(0, 0), Vec3::ZERO));
        }
        let report = sim.run(10);
        assert_eq!(report.active_enemies, 0);
        assert_eq!(report.released_enemies, 1);
        assert_eq!(sim.pooled(), 1);
    }

    #[test]
    fn test_discard_pool_never_recycles() {
        let mut scenario = scenario(Vec3::new(2.5, 0.0, 2.5), Vec3::new(20.5, 0.0, 20.5));
        scenario.enemies[0].config.timers.death_duration = 0.0;
        let mut sim = sim(&scenario).with_pool(Box::new(DiscardPool));
        let first = sim.enemies()[0].id();
        if let Some(enemy) = sim.enemy_mut(first) {
            enemy.take_damage(1000, DamageSource::new(EntityId::new(0, 0), Vec3::ZERO));
        }
        let report = sim.run(2);
        assert_eq!(report.released_enemies, 1);
        assert_eq!(sim.pooled(), 0);

        let spawned = match sim.spawn(EnemyConfig::default(), Pose::looking(Vec3::new(5.5, 0.0, 5.5), Vec3::Z)) {
            Ok(id) => id,
            Err(e) => panic!("spawn should succeed: {e}"),
        };
        assert_ne!(spawned.index(), first.index());
    }

    #[test]
    fn test_spawn_reuses_pooled_enemy() {
        let mut scenario = scenario(Vec3::new(2.5, 0.0, 2.5), Vec3::new(20.5, 0.0, 20.5));
        scenario.enemies[0].config.timers.death_duration = 0.0;
        let mut sim = sim(&scenario);
        let first = sim.enemies()[0].id();
        if let Some(enemy) = sim.enemy_mut(first) {
            enemy.take_damage(1000, DamageSource::new(EntityId::new(0, 0), Vec3::ZERO));
        }
        sim.run(2);
        assert_eq!(sim.pooled(), 1);

        let spawned = match sim.spawn(EnemyConfig::default(), Pose::looking(Vec3::new(5.5, 0.0, 5.5), Vec3::Z)) {
            Ok(id) => id,
            Err(e) => panic!("spawn should succeed: {e}"),
        };
        assert_eq!(spawned.index(), first.index());
        assert_eq!(spawned.generation(), first.generation() + 1);
        assert_eq!(sim.pooled(), 0);
        assert!(!sim.enemies()[0].is_dead());
    }

    #[test]
    fn test_events_are_shared() {
        let mut sim = sim(&scenario(Vec3::new(2.5, 0.0, 2.5), Vec3::new(2.5, 0.0, 6.5)));
        let handle = sim.events();
        sim.step();
        assert!(!handle.lock().is_empty());
        assert!(!sim.drain_events().is_empty());
        assert!(handle.lock().is_empty());
    }
}
