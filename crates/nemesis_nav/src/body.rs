//! The physical side of an agent: where it stands, where it faces and who moves it

use crate::path::NavPath;
use glam::{Quat, Vec3};
use nemesis_core::math::{self, Pose};
use serde::{Deserialize, Serialize};

/// Distance at which a path corner counts as reached
const CORNER_THRESHOLD: f32 = 0.05;

/// Horizontal angle, in degrees, at which a turn counts as finished
const FACING_TOLERANCE_DEG: f32 = 0.25;

/// Who is currently allowed to move the body.
///
/// Navigation and knockback must never push the body in the same tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MovementAuthority {
    /// Path following drives the body
    #[default]
    Navigation,
    /// Hit reaction displacement drives the body
    Knockback,
    /// Nothing moves the body (stagger hold)
    Held,
    /// Body is off; only `enable` brings it back
    Disabled,
}

/// Moves a body through the world, resolving collisions if it can
pub trait Locomotion {
    /// Apply `displacement` starting at `from`. Returns the resolved position.
    fn move_body(&mut self, from: Vec3, displacement: Vec3, radius: f32) -> Vec3;

    /// Whether a body standing at `position` is on the ground
    fn is_grounded(&self, position: Vec3) -> bool;
}

/// Locomotion without collision: displacement is applied as is
#[derive(Debug, Clone, Copy, Default)]
pub struct FreeLocomotion;

impl Locomotion for FreeLocomotion {
    fn move_body(&mut self, from: Vec3, displacement: Vec3, _radius: f32) -> Vec3 {
        from + displacement
    }

    fn is_grounded(&self, _position: Vec3) -> bool {
        true
    }
}

/// Navigation agent body
#[derive(Debug, Clone)]
pub struct AgentBody {
    position: Vec3,
    rotation: Quat,
    velocity: Vec3,
    /// Movement speed in units per second
    speed: f32,
    /// Agent radius
    radius: f32,
    grounded: bool,
    path: Option<NavPath>,
    destination: Option<Vec3>,
    stopped: bool,
    authority: MovementAuthority,
}

impl AgentBody {
    /// Create a body standing at `pose`
    pub fn new(pose: Pose) -> Self {
        Self {
            position: pose.position,
            rotation: pose.rotation,
            velocity: Vec3::ZERO,
            speed: 3.0,
            radius: 0.4,
            grounded: true,
            path: None,
            destination: None,
            stopped: false,
            authority: MovementAuthority::Navigation,
        }
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed.max(0.0);
        self
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius.max(0.0);
        self
    }

    pub fn pose(&self) -> Pose {
        Pose::new(self.position, self.rotation)
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    pub fn forward(&self) -> Vec3 {
        math::forward(self.rotation)
    }

    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed.max(0.0);
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    pub fn authority(&self) -> MovementAuthority {
        self.authority
    }

    /// Hand movement to someone else. A disabled body stays disabled.
    pub fn set_authority(&mut self, authority: MovementAuthority) {
        if self.authority == MovementAuthority::Disabled {
            return;
        }
        if authority != MovementAuthority::Navigation {
            self.velocity = Vec3::ZERO;
        }
        self.authority = authority;
    }

    /// Turn the body off: no movement, no path
    pub fn disable(&mut self) {
        self.clear_path();
        self.velocity = Vec3::ZERO;
        self.authority = MovementAuthority::Disabled;
    }

    /// Turn a disabled body back on under navigation
    pub fn enable(&mut self) {
        self.authority = MovementAuthority::Navigation;
        self.stopped = false;
    }

    pub fn is_disabled(&self) -> bool {
        self.authority == MovementAuthority::Disabled
    }

    /// Follow `path` towards `destination`
    pub fn set_path(&mut self, path: NavPath, destination: Vec3) {
        self.path = Some(path);
        self.destination = Some(destination);
        self.stopped = false;
    }

    /// Forget the current path and destination
    pub fn clear_path(&mut self) {
        self.path = None;
        self.destination = None;
        self.velocity = Vec3::ZERO;
    }

    /// Whether the body still has corners to walk to
    pub fn has_path(&self) -> bool {
        self.path.as_ref().is_some_and(|p| !p.is_complete())
    }

    pub fn path(&self) -> Option<&NavPath> {
        self.path.as_ref()
    }

    pub fn destination(&self) -> Option<Vec3> {
        self.destination
    }

    /// Path distance left, zero without a path
    pub fn remaining_distance(&self) -> f32 {
        self.path
            .as_ref()
            .map_or(0.0, |p| p.remaining_distance(self.position))
    }

    /// Pause path following, keeping the path
    pub fn stop(&mut self) {
        self.stopped = true;
        self.velocity = Vec3::ZERO;
    }

    /// Continue path following after `stop`
    pub fn resume(&mut self) {
        self.stopped = false;
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Follow the path for `dt` seconds. Returns the displacement applied.
    pub fn step(&mut self, dt: f32, locomotion: &mut dyn Locomotion) -> Vec3 {
        if self.authority != MovementAuthority::Navigation || self.stopped || dt <= 0.0 {
            self.velocity = Vec3::ZERO;
            return Vec3::ZERO;
        }
        let Some(path) = self.path.as_mut() else {
            self.velocity = Vec3::ZERO;
            return Vec3::ZERO;
        };

        let mut budget = self.speed * dt;
        let mut target = self.position;
        while let Some(corner) = path.current_corner() {
            let to_corner = corner - target;
            let distance = to_corner.length();
            if distance <= CORNER_THRESHOLD {
                path.advance();
                continue;
            }
            if budget <= 0.0 {
                break;
            }
            let travel = budget.min(distance);
            target += to_corner / distance * travel;
            budget -= travel;
            if travel >= distance {
                path.advance();
            }
        }

        let from = self.position;
        self.position = locomotion.move_body(from, target - from, self.radius);
        self.grounded = locomotion.is_grounded(self.position);
        let displacement = self.position - from;
        self.velocity = displacement / dt;
        displacement
    }

    /// Apply an external displacement. Only honoured under knockback authority.
    pub fn push(&mut self, displacement: Vec3, locomotion: &mut dyn Locomotion) -> Vec3 {
        if self.authority != MovementAuthority::Knockback {
            return Vec3::ZERO;
        }
        let from = self.position;
        self.position = locomotion.move_body(from, displacement, self.radius);
        self.grounded = locomotion.is_grounded(self.position);
        self.position - from
    }

    /// Teleport to `pose`, dropping any path
    pub fn warp(&mut self, pose: Pose) {
        self.position = pose.position;
        self.rotation = pose.rotation;
        self.clear_path();
    }

    /// Turn towards a horizontal direction at `degrees_per_second`.
    /// Returns true once facing it.
    pub fn face_direction(&mut self, direction: Vec3, degrees_per_second: f32, dt: f32) -> bool {
        let Some(target) = math::yaw_rotation(direction) else {
            return true;
        };
        let max_step = degrees_per_second.max(0.0).to_radians() * dt.max(0.0);
        self.rotation = math::rotate_towards(self.rotation, target, max_step);
        math::flat_angle_deg(math::forward(self.rotation), math::forward(target)) <= FACING_TOLERANCE_DEG
    }

    /// Turn towards a world point
    pub fn face_point(&mut self, point: Vec3, degrees_per_second: f32, dt: f32) -> bool {
        self.face_direction(point - self.position, degrees_per_second, dt)
    }

    /// Turn towards the current velocity, if moving
    pub fn face_velocity(&mut self, degrees_per_second: f32, dt: f32) {
        if math::flatten(self.velocity).length_squared() > math::DIRECTION_EPSILON {
            self.face_direction(self.velocity, degrees_per_second, dt);
        }
    }

    /// Face a direction instantly
    pub fn snap_facing(&mut self, direction: Vec3) {
        if let Some(rotation) = math::yaw_rotation(direction) {
            self.rotation = rotation;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn body_at_origin() -> AgentBody {
        AgentBody::new(Pose::default()).with_speed(2.0)
    }

    fn straight_path() -> NavPath {
        NavPath::new(vec![Vec3::ZERO, Vec3::new(4.0, 0.0, 0.0)])
    }

    #[test]
    fn test_step_follows_path() {
        let mut body = body_at_origin();
        body.set_path(straight_path(), Vec3::new(4.0, 0.0, 0.0));
        let moved = body.step(0.5, &mut FreeLocomotion);
        assert_abs_diff_eq!(moved.x, 1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(body.velocity().x, 2.0, epsilon = 1e-5);
        assert_abs_diff_eq!(body.remaining_distance(), 3.0, epsilon = 1e-5);
    }

    #[test]
    fn test_step_stops_at_destination() {
        let mut body = body_at_origin();
        body.set_path(straight_path(), Vec3::new(4.0, 0.0, 0.0));
        for _ in 0..10 {
            body.step(0.5, &mut FreeLocomotion);
        }
        assert_abs_diff_eq!(body.position().x, 4.0, epsilon = 1e-5);
        assert!(!body.has_path());
        body.step(0.5, &mut FreeLocomotion);
        assert_eq!(body.velocity(), Vec3::ZERO);
    }

    #[test]
    fn test_stopped_body_does_not_move() {
        let mut body = body_at_origin();
        body.set_path(straight_path(), Vec3::new(4.0, 0.0, 0.0));
        body.stop();
        assert_eq!(body.step(1.0, &mut FreeLocomotion), Vec3::ZERO);
        body.resume();
        assert!(body.step(1.0, &mut FreeLocomotion).length() > 0.0);
    }

    #[test]
    fn test_authority_gates_movement() {
        let mut body = body_at_origin();
        body.set_path(straight_path(), Vec3::new(4.0, 0.0, 0.0));
        body.set_authority(MovementAuthority::Knockback);
        assert_eq!(body.step(1.0, &mut FreeLocomotion), Vec3::ZERO);
        let pushed = body.push(Vec3::new(0.0, 0.0, -1.0), &mut FreeLocomotion);
        assert_abs_diff_eq!(pushed.z, -1.0);

        body.set_authority(MovementAuthority::Navigation);
        assert_eq!(body.push(Vec3::Z, &mut FreeLocomotion), Vec3::ZERO);
    }

    #[test]
    fn test_disabled_body_stays_disabled() {
        let mut body = body_at_origin();
        body.disable();
        body.set_authority(MovementAuthority::Navigation);
        assert!(body.is_disabled());
        body.enable();
        assert_eq!(body.authority(), MovementAuthority::Navigation);
    }

    #[test]
    fn test_face_direction_is_rate_limited() {
        let mut body = body_at_origin();
        // 90 degrees at 90 deg/s takes a full second
        assert!(!body.face_direction(Vec3::X, 90.0, 0.5));
        assert!(body.face_direction(Vec3::X, 90.0, 0.6));
        assert_abs_diff_eq!(body.forward().x, 1.0, epsilon = 1e-3);
    }

    #[test]
    fn test_facing_reached_survives_rounding() {
        let mut body = body_at_origin();
        let diagonal = Vec3::new(1.0, 0.0, 1.0);
        assert!(body.face_direction(diagonal, 360.0, 1.0));
        // No time to turn, but nothing left to turn either
        assert!(body.face_direction(diagonal, 360.0, 0.0));
        assert!(body.face_direction(Vec3::new(3.0, 2.0, 3.0), 0.0, 0.1));
    }

    #[test]
    fn test_warp_clears_path() {
        let mut body = body_at_origin();
        body.set_path(straight_path(), Vec3::new(4.0, 0.0, 0.0));
        body.warp(Pose::looking(Vec3::new(9.0, 0.0, 9.0), Vec3::NEG_Z));
        assert!(!body.has_path());
        assert_eq!(body.destination(), None);
        assert_eq!(body.position(), Vec3::new(9.0, 0.0, 9.0));
    }
}
