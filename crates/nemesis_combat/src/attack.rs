//! Cooldown and windup gated attacks plus the health they protect

use crate::damage::{DamageReceiver, DamageSource};
use crate::health::Health;
use nemesis_core::{EnemyConfig, EntityId};
use serde::{Deserialize, Serialize};

/// Attack tunables
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttackProfile {
    /// Damage per landed strike
    pub damage: i32,
    /// Minimum seconds between strikes
    pub cooldown: f32,
    /// Delay between starting a strike and resolving it
    pub windup: f32,
}

impl AttackProfile {
    pub fn from_config(config: &EnemyConfig) -> Self {
        Self {
            damage: config.attack.damage,
            cooldown: config.timers.attack_cooldown,
            windup: config.timers.attack_windup,
        }
    }
}

impl Default for AttackProfile {
    fn default() -> Self {
        Self {
            damage: 10,
            cooldown: 1.5,
            windup: 0.4,
        }
    }
}

/// A strike waiting for its windup to finish
#[derive(Debug, Clone, Copy, PartialEq)]
struct PendingStrike {
    target: EntityId,
    remaining: f32,
}

/// A strike whose windup just finished and needs validating
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrikeDue {
    pub target: EntityId,
    pub damage: i32,
}

/// What happened to incoming damage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Dead, staggered or a non-positive amount
    Ignored,
    /// Health dropped but is above zero
    Damaged { current: i32, max: i32 },
    /// Health reached zero with this hit
    Killed { max: i32 },
}

/// What happened to a resolved strike
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackOutcome {
    /// Damage was handed to the receiver
    Landed { damage: i32 },
    /// Target left range, got obstructed or vanished during the windup
    Missed,
}

impl AttackOutcome {
    pub fn landed(&self) -> bool {
        matches!(self, AttackOutcome::Landed { .. })
    }
}

/// Health pool plus the attack cycle of one enemy
#[derive(Debug, Clone)]
pub struct CombatModule {
    health: Health,
    profile: AttackProfile,
    /// Seconds since the last strike started, capped at the cooldown
    cooldown_timer: f32,
    strike: Option<PendingStrike>,
}

impl CombatModule {
    /// Create a module with full health and a ready attack
    pub fn new(max_health: i32, profile: AttackProfile) -> Self {
        Self {
            health: Health::new(max_health),
            cooldown_timer: profile.cooldown.max(0.0),
            profile,
            strike: None,
        }
    }

    pub fn from_config(config: &EnemyConfig) -> Self {
        Self::new(config.health, AttackProfile::from_config(config))
    }

    pub fn health(&self) -> &Health {
        &self.health
    }

    pub fn profile(&self) -> &AttackProfile {
        &self.profile
    }

    pub fn is_dead(&self) -> bool {
        self.health.is_dead()
    }

    /// Apply incoming damage. Staggered or dead enemies ignore it.
    pub fn take_damage(&mut self, amount: i32, staggered: bool) -> DamageOutcome {
        if staggered || self.health.is_dead() {
            return DamageOutcome::Ignored;
        }
        let change = self.health.apply_damage(amount);
        if change.applied == 0 {
            return DamageOutcome::Ignored;
        }
        if change.died {
            self.cancel_attack();
            DamageOutcome::Killed {
                max: self.health.max(),
            }
        } else {
            DamageOutcome::Damaged {
                current: change.current,
                max: self.health.max(),
            }
        }
    }

    /// Check if a strike can start now
    pub fn can_attack(&self) -> bool {
        !self.health.is_dead()
            && self.strike.is_none()
            && self.cooldown_timer >= self.profile.cooldown
    }

    /// Start a strike against `target`.
    /// Returns true if started.
    pub fn try_attack(&mut self, target: EntityId) -> bool {
        if !self.can_attack() {
            return false;
        }
        self.cooldown_timer = 0.0;
        self.strike = Some(PendingStrike {
            target,
            remaining: self.profile.windup.max(0.0),
        });
        true
    }

    pub fn is_attacking(&self) -> bool {
        self.strike.is_some()
    }

    /// Advance the cooldown and any windup. Returns the strike once its windup is over.
    pub fn update(&mut self, delta_time: f32) -> Option<StrikeDue> {
        if self.health.is_dead() {
            return None;
        }
        let cap = self.profile.cooldown.max(0.0);
        self.cooldown_timer = (self.cooldown_timer + delta_time).min(cap);

        let strike = self.strike.as_mut()?;
        strike.remaining -= delta_time;
        if strike.remaining > 0.0 {
            return None;
        }
        let target = strike.target;
        self.strike = None;
        Some(StrikeDue {
            target,
            damage: self.profile.damage,
        })
    }

    /// Apply a due strike if it is still `valid` and a receiver is present
    pub fn resolve_strike<R>(
        &mut self,
        due: StrikeDue,
        valid: bool,
        receiver: Option<&mut R>,
        source: DamageSource,
    ) -> AttackOutcome
    where
        R: DamageReceiver + ?Sized,
    {
        match receiver {
            Some(receiver) if valid && !self.health.is_dead() => {
                receiver.take_damage(due.damage, source);
                AttackOutcome::Landed { damage: due.damage }
            }
            _ => {
                log::trace!("Strike on {} missed", due.target);
                AttackOutcome::Missed
            }
        }
    }

    /// Drop a strike still in its windup
    pub fn cancel_attack(&mut self) {
        self.strike = None;
    }

    /// Full health, ready attack, no strike
    pub fn reset(&mut self) {
        self.health.reset();
        self.cooldown_timer = self.profile.cooldown.max(0.0);
        self.strike = None;
    }
}
