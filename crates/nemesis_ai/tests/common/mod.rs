//! Shared world for scenario tests

#![allow(dead_code)]

use glam::Vec3;
use nemesis_ai::prelude::*;
use nemesis_combat::{DamageReceiver, DamageSource};
use nemesis_core::prelude::*;
use nemesis_nav::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub const DT: f32 = 0.1;

pub struct Player {
    pub id: EntityId,
    pub position: Vec3,
    pub health: i32,
    pub hits: Vec<i32>,
}

impl DamageReceiver for Player {
    fn take_damage(&mut self, amount: i32, _source: DamageSource) {
        self.hits.push(amount);
        self.health = (self.health - amount).max(0);
    }
}

impl Target for Player {
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

pub struct World {
    pub nav: NavMeshProvider,
    pub walls: ObstacleField,
    pub locomotion: FreeLocomotion,
    pub player: Option<Player>,
    pub log: EventLog,
    pub rng: ChaCha8Rng,
}

impl World {
    /// 60x60 open floor centred on the origin
    pub fn open() -> Self {
        Self {
            nav: NavMeshProvider::new(NavMesh::create_grid_at(
                Vec3::new(-30.0, 0.0, -30.0),
                60,
                60,
                1.0,
            )),
            walls: ObstacleField::new(),
            locomotion: FreeLocomotion,
            player: None,
            log: EventLog::new(),
            rng: ChaCha8Rng::seed_from_u64(7),
        }
    }

    pub fn with_player(mut self, position: Vec3) -> Self {
        self.player = Some(Player {
            id: EntityId::new(500, 0),
            position,
            health: 100,
            hits: Vec::new(),
        });
        self
    }

    pub fn move_player(&mut self, position: Vec3) {
        if let Some(player) = self.player.as_mut() {
            player.position = position;
        }
    }

    pub fn player_hits(&self) -> Vec<i32> {
        self.player.as_ref().map(|p| p.hits.clone()).unwrap_or_default()
    }

    pub fn env(&mut self) -> Environment<'_> {
        Environment {
            navigation: &self.nav,
            raycaster: &self.walls,
            locomotion: &mut self.locomotion,
            target: self.player.as_mut().map(|p| p as &mut dyn Target),
            events: &mut self.log,
            rng: &mut self.rng,
        }
    }

    pub fn tick(&mut self, enemy: &mut Enemy) {
        enemy.tick(&mut self.env(), DT);
    }

    /// Tick until `state` is reached, returning the number of ticks taken
    pub fn tick_until(&mut self, enemy: &mut Enemy, state: StateId, max_ticks: usize) -> Option<usize> {
        for i in 1..=max_ticks {
            self.tick(enemy);
            if enemy.state() == state {
                return Some(i);
            }
        }
        None
    }
}

pub fn enemy_at_origin(config: EnemyConfig) -> Enemy {
    Enemy::new(EntityId::new(1, 0), config, Pose::looking(Vec3::ZERO, Vec3::Z))
        .expect("valid enemy config")
}

pub fn hit_from(enemy: &mut Enemy, amount: i32, from: Vec3) {
    enemy.take_damage(amount, DamageSource::new(EntityId::new(500, 0), from));
}
