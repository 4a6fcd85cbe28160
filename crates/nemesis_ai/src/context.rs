//! Per-tick collaborators handed to the behavior layer

use glam::Vec3;
use nemesis_combat::DamageReceiver;
use nemesis_core::{EffectSink, EntityId};
use nemesis_nav::{Locomotion, NavigationProvider, RaycastBackend};
use rand::RngCore;

/// Something an enemy can see, chase and hit
pub trait Target: DamageReceiver {
    fn entity_id(&self) -> EntityId;
    fn position(&self) -> Vec3;
    fn is_alive(&self) -> bool;
}

/// Copy of what a state needs to know about the target this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetInfo {
    pub id: EntityId,
    pub position: Vec3,
    pub alive: bool,
}

/// Everything outside the enemy that a tick may touch
pub struct Environment<'a> {
    pub navigation: &'a dyn NavigationProvider,
    pub raycaster: &'a dyn RaycastBackend,
    pub locomotion: &'a mut dyn Locomotion,
    /// Missing when no target reference is available
    pub target: Option<&'a mut dyn Target>,
    pub events: &'a mut dyn EffectSink,
    pub rng: &'a mut dyn RngCore,
}

impl<'a> Environment<'a> {
    /// Snapshot of the target, if one is wired in
    pub fn target(&self) -> Option<TargetInfo> {
        self.target.as_deref().map(|target| TargetInfo {
            id: target.entity_id(),
            position: target.position(),
            alive: target.is_alive(),
        })
    }

    /// Snapshot of the target only if it is alive
    pub fn live_target(&self) -> Option<TargetInfo> {
        self.target().filter(|t| t.alive)
    }
}
