//! Fire-and-forget notifications emitted by enemies
//!
//! The engine never awaits or inspects what a sink does with an event.
//! Presentation layers (death effects, health bars, attack sounds) hang off
//! these hooks.

use crate::id::{EntityId, StateId};
use glam::Vec3;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Notifications emitted by the behavior engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EnemyEvent {
    /// The state machine moved to a new state
    StateChanged {
        agent: EntityId,
        from: StateId,
        to: StateId,
    },
    /// Health changed (for health bars)
    HealthChanged {
        agent: EntityId,
        current: i32,
        max: i32,
    },
    /// A strike was started (play attack animation/sound)
    AttackPerformed { agent: EntityId, target: EntityId },
    /// A strike finished its windup
    AttackResolved {
        agent: EntityId,
        target: EntityId,
        damage: i32,
        landed: bool,
    },
    /// Hit reaction started
    Staggered { agent: EntityId, source: EntityId },
    /// Play the death effect
    DeathEffect { agent: EntityId, position: Vec3 },
    /// The death timer elapsed; the agent can go back to its pool
    Deactivated { agent: EntityId },
    /// Return ran out of time and the agent was put back at its start pose
    ReturnTimedOut { agent: EntityId, position: Vec3 },
}

impl EnemyEvent {
    /// The enemy that emitted this event
    pub fn agent(&self) -> EntityId {
        match self {
            EnemyEvent::StateChanged { agent, .. }
            | EnemyEvent::HealthChanged { agent, .. }
            | EnemyEvent::AttackPerformed { agent, .. }
            | EnemyEvent::AttackResolved { agent, .. }
            | EnemyEvent::Staggered { agent, .. }
            | EnemyEvent::DeathEffect { agent, .. }
            | EnemyEvent::Deactivated { agent }
            | EnemyEvent::ReturnTimedOut { agent, .. } => *agent,
        }
    }
}

/// Receiver for enemy notifications
pub trait EffectSink {
    fn emit(&mut self, event: EnemyEvent);
}

/// Discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EffectSink for NullSink {
    fn emit(&mut self, _event: EnemyEvent) {}
}

/// Records events in order
#[derive(Debug, Default, Clone)]
pub struct EventLog {
    events: Vec<EnemyEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[EnemyEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Take every recorded event, leaving the log empty
    pub fn drain(&mut self) -> Vec<EnemyEvent> {
        std::mem::take(&mut self.events)
    }

    /// Count events matching a predicate
    pub fn count(&self, predicate: impl Fn(&EnemyEvent) -> bool) -> usize {
        self.events.iter().filter(|e| predicate(e)).count()
    }

    /// Sequence of states `agent` moved into
    pub fn transitions_of(&self, agent: EntityId) -> Vec<StateId> {
        self.events
            .iter()
            .filter_map(|e| match e {
                EnemyEvent::StateChanged { agent: a, to, .. } if *a == agent => Some(*to),
                _ => None,
            })
            .collect()
    }
}

impl EffectSink for EventLog {
    fn emit(&mut self, event: EnemyEvent) {
        self.events.push(event);
    }
}

impl EffectSink for Vec<EnemyEvent> {
    fn emit(&mut self, event: EnemyEvent) {
        self.push(event);
    }
}

/// A sink shared with an outside consumer such as a HUD
impl<S: EffectSink + ?Sized> EffectSink for Arc<Mutex<S>> {
    fn emit(&mut self, event: EnemyEvent) {
        self.lock().emit(event);
    }
}
