//! Knockback and stagger played out on the body after a hit
//!
//! The reaction runs beside the state machine: an agent can be in Trace while
//! staggered. For the whole window the body's movement authority belongs to
//! the reaction (knockback first, then a hold), so state updates cannot move it.

use glam::Vec3;
use nemesis_core::math;
use nemesis_core::HitReactionProfile;
use nemesis_nav::{AgentBody, Locomotion, MovementAuthority};

/// Emitted when the stagger window closes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaggerRelease {
    /// The body had a destination when it was hit
    pub was_navigating: bool,
}

/// Timed knockback plus stagger hold
#[derive(Debug, Clone)]
pub struct HitReaction {
    profile: HitReactionProfile,
    active: bool,
    elapsed: f32,
    pending_knockback: Vec3,
    was_navigating: bool,
}

impl HitReaction {
    pub fn new(profile: HitReactionProfile) -> Self {
        Self {
            profile,
            active: false,
            elapsed: 0.0,
            pending_knockback: Vec3::ZERO,
            was_navigating: false,
        }
    }

    pub fn profile(&self) -> &HitReactionProfile {
        &self.profile
    }

    pub fn is_staggered(&self) -> bool {
        self.active
    }

    /// Velocity still to be applied by the knockback, zero once it is over
    pub fn pending_knockback(&self) -> Vec3 {
        self.pending_knockback
    }

    fn knockback_duration(&self) -> f32 {
        self.profile.knockback_duration.max(0.0)
    }

    fn stagger_duration(&self) -> f32 {
        self.profile.stagger_duration.max(self.knockback_duration())
    }

    /// Start reacting to a hit coming from `source_position`.
    /// Faces the source at once and takes movement away from navigation.
    pub fn begin(&mut self, source_position: Vec3, body: &mut AgentBody) {
        if body.is_disabled() {
            return;
        }
        let away = math::flatten(body.position() - source_position);
        let direction = if away.length_squared() > math::DIRECTION_EPSILON {
            away.normalize()
        } else {
            -math::flatten(body.forward()).normalize_or_zero()
        };

        body.snap_facing(-direction);
        if !self.active {
            self.was_navigating = body.destination().is_some();
        }
        self.active = true;
        self.elapsed = 0.0;

        if self.knockback_duration() > 0.0 {
            self.pending_knockback = direction * self.profile.knockback_speed;
            body.set_authority(MovementAuthority::Knockback);
        } else {
            self.pending_knockback = Vec3::ZERO;
            body.set_authority(MovementAuthority::Held);
        }
        log::debug!(
            "Hit reaction started, knockback {:.2}s, stagger {:.2}s",
            self.knockback_duration(),
            self.stagger_duration()
        );
    }

    /// Play the reaction for `delta_time`. Returns the release once the stagger is over.
    pub fn update(
        &mut self,
        delta_time: f32,
        body: &mut AgentBody,
        locomotion: &mut dyn Locomotion,
    ) -> Option<StaggerRelease> {
        if !self.active {
            return None;
        }

        let knockback = self.knockback_duration();
        let before = self.elapsed;
        self.elapsed += delta_time.max(0.0);

        if before < knockback {
            let moving_time = self.elapsed.min(knockback) - before;
            body.push(self.pending_knockback * moving_time, locomotion);
        }
        if self.elapsed >= knockback && self.pending_knockback != Vec3::ZERO {
            self.pending_knockback = Vec3::ZERO;
            body.set_authority(MovementAuthority::Held);
        }

        if self.elapsed >= self.stagger_duration() {
            self.active = false;
            body.set_authority(MovementAuthority::Navigation);
            return Some(StaggerRelease {
                was_navigating: self.was_navigating,
            });
        }
        None
    }

    /// Abort the reaction, handing movement back to navigation
    pub fn cancel(&mut self, body: &mut AgentBody) {
        if self.active {
            body.set_authority(MovementAuthority::Navigation);
        }
        self.active = false;
        self.elapsed = 0.0;
        self.pending_knockback = Vec3::ZERO;
    }
}
