//! Pose and yaw-only rotation helpers
//!
//! Y is up. Facing is a rotation about Y; the forward vector is `+Z`
//! rotated by the facing.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Below this length a direction is treated as undefined
pub const DIRECTION_EPSILON: f32 = 1e-4;

/// Position plus facing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Pose {
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Pose at `position` facing along `direction` (horizontal part only)
    pub fn looking(position: Vec3, direction: Vec3) -> Self {
        Self {
            position,
            rotation: yaw_rotation(direction).unwrap_or(Quat::IDENTITY),
        }
    }

    pub fn forward(&self) -> Vec3 {
        forward(self.rotation)
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

/// Drop the vertical component
#[inline]
pub fn flatten(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Distance in the horizontal plane
#[inline]
pub fn horizontal_distance(a: Vec3, b: Vec3) -> f32 {
    flatten(b - a).length()
}

/// Forward vector of a facing
#[inline]
pub fn forward(rotation: Quat) -> Vec3 {
    rotation * Vec3::Z
}

/// Yaw rotation that faces along the horizontal part of `direction`
pub fn yaw_rotation(direction: Vec3) -> Option<Quat> {
    let flat = flatten(direction);
    if flat.length_squared() < DIRECTION_EPSILON * DIRECTION_EPSILON {
        return None;
    }
    Some(Quat::from_rotation_y(flat.x.atan2(flat.z)))
}

/// Rotate `from` toward `to` by at most `max_radians`
pub fn rotate_towards(from: Quat, to: Quat, max_radians: f32) -> Quat {
    let angle = from.angle_between(to);
    if angle <= max_radians || angle <= f32::EPSILON {
        return to;
    }
    if max_radians <= 0.0 {
        return from;
    }
    from.slerp(to, max_radians / angle)
}

/// Unsigned angle in degrees between `forward` and `to` in the horizontal plane
///
/// Returns 0 when either vector has no horizontal extent.
pub fn flat_angle_deg(forward: Vec3, to: Vec3) -> f32 {
    let a = flatten(forward);
    let b = flatten(to);
    if a.length_squared() < DIRECTION_EPSILON || b.length_squared() < DIRECTION_EPSILON {
        return 0.0;
    }
    a.angle_between(b).to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_yaw_rotation_faces_direction() {
        let rotation = yaw_rotation(Vec3::new(1.0, 5.0, 0.0)).unwrap();
        let f = forward(rotation);
        assert_abs_diff_eq!(f.x, 1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(f.y, 0.0, epsilon = 1e-5);
        assert_abs_diff_eq!(f.z, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_vertical_direction_has_no_yaw() {
        assert!(yaw_rotation(Vec3::Y).is_none());
    }

    #[test]
    fn test_rotate_towards_limits_step() {
        let from = Quat::IDENTITY;
        let to = Quat::from_rotation_y(std::f32::consts::FRAC_PI_2);
        let step = rotate_towards(from, to, 0.25);
        assert_abs_diff_eq!(from.angle_between(step), 0.25, epsilon = 1e-4);

        let done = forward(rotate_towards(from, to, 10.0));
        let expected = forward(to);
        assert_abs_diff_eq!(done.x, expected.x, epsilon = 1e-5);
        assert_abs_diff_eq!(done.z, expected.z, epsilon = 1e-5);
    }

    #[test]
    fn test_flat_angle() {
        assert_abs_diff_eq!(flat_angle_deg(Vec3::Z, Vec3::X), 90.0, epsilon = 1e-3);
        assert_abs_diff_eq!(flat_angle_deg(Vec3::Z, Vec3::new(0.0, 3.0, 2.0)), 0.0, epsilon = 1e-3);
        assert_eq!(flat_angle_deg(Vec3::Z, Vec3::Y), 0.0);
    }

    #[test]
    fn test_horizontal_distance_ignores_height() {
        let d = horizontal_distance(Vec3::ZERO, Vec3::new(3.0, 10.0, 4.0));
        assert_abs_diff_eq!(d, 5.0, epsilon = 1e-5);
    }
}
