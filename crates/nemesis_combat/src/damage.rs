//! Damage value objects and the receiver contract

use glam::Vec3;
use nemesis_core::EntityId;
use serde::{Deserialize, Serialize};

/// Who dealt a hit and from where
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DamageSource {
    /// Entity that caused the damage
    pub entity: EntityId,
    /// World position the hit came from
    pub position: Vec3,
}

impl DamageSource {
    pub fn new(entity: EntityId, position: Vec3) -> Self {
        Self { entity, position }
    }
}

/// A single hit, consumed once by the receiver
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DamageEvent {
    pub amount: i32,
    pub source: DamageSource,
}

impl DamageEvent {
    pub fn new(amount: i32, source: DamageSource) -> Self {
        Self { amount, source }
    }

    /// Deliver the hit
    pub fn apply_to(self, receiver: &mut dyn DamageReceiver) {
        receiver.take_damage(self.amount, self.source);
    }
}

/// Anything that can be hit: enemies, the player, destructible scenery.
pub trait DamageReceiver {
    fn take_damage(&mut self, amount: i32, source: DamageSource);
}
