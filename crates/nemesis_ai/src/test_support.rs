//! Shared fixtures for unit tests

use crate::context::{Environment, Target};
use glam::Vec3;
use nemesis_combat::{DamageReceiver, DamageSource};
use nemesis_core::{EntityId, EventLog};
use nemesis_nav::{FreeLocomotion, NavMesh, NavMeshProvider, ObstacleField};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub(crate) struct DummyTarget {
    pub id: EntityId,
    pub position: Vec3,
    pub health: i32,
    pub received: i32,
}

impl DummyTarget {
    pub fn at(position: Vec3) -> Self {
        Self {
            id: EntityId::new(99, 0),
            position,
            health: 100,
            received: 0,
        }
    }
}

impl DamageReceiver for DummyTarget {
    fn take_damage(&mut self, amount: i32, _source: DamageSource) {
        self.received += amount;
        self.health = (self.health - amount).max(0);
    }
}

impl Target for DummyTarget {
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

pub(crate) struct Fixture {
    pub nav: NavMeshProvider,
    pub walls: ObstacleField,
    pub locomotion: FreeLocomotion,
    pub target: Option<DummyTarget>,
    pub log: EventLog,
    pub rng: ChaCha8Rng,
}

impl Fixture {
    /// 40x40 open floor centred on the origin, no target
    pub fn open() -> Self {
        Self {
            nav: NavMeshProvider::new(NavMesh::create_grid_at(Vec3::new(-20.0, 0.0, -20.0), 40, 40, 1.0)),
            walls: ObstacleField::new(),
            locomotion: FreeLocomotion,
            target: None,
            log: EventLog::new(),
            rng: ChaCha8Rng::seed_from_u64(11),
        }
    }

    pub fn with_target(mut self, position: Vec3) -> Self {
        self.target = Some(DummyTarget::at(position));
        self
    }

    pub fn env(&mut self) -> Environment<'_> {
        Environment {
            navigation: &self.nav,
            raycaster: &self.walls,
            locomotion: &mut self.locomotion,
            target: self.target.as_mut().map(|t| t as &mut dyn Target),
            events: &mut self.log,
            rng: &mut self.rng,
        }
    }
}
