//! Sight checks: range, view cone and obstruction

use glam::Vec3;
use nemesis_core::math::{self, Pose};
use nemesis_nav::{LayerMask, RaycastBackend};

/// Line-of-sight settings for one agent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Perception {
    /// Height of the eyes above the feet
    pub eye_height: f32,
    /// Layers that block sight
    pub obstruction_mask: LayerMask,
}

impl Default for Perception {
    fn default() -> Self {
        Self {
            eye_height: 1.6,
            obstruction_mask: LayerMask::obstruction(),
        }
    }
}

impl Perception {
    pub fn new(eye_height: f32) -> Self {
        Self {
            eye_height,
            ..Default::default()
        }
    }

    pub fn with_mask(mut self, mask: LayerMask) -> Self {
        self.obstruction_mask = mask;
        self
    }

    /// Whether `point` lies within `view_angle_deg` (full cone width) of the observer's forward.
    /// 360 degrees or more sees all around.
    pub fn in_view_cone(&self, observer: &Pose, point: Vec3, view_angle_deg: f32) -> bool {
        if view_angle_deg >= 360.0 {
            return true;
        }
        let to_point = point - observer.position;
        if math::flatten(to_point).length_squared() < math::DIRECTION_EPSILON {
            return true;
        }
        math::flat_angle_deg(observer.forward(), to_point) <= view_angle_deg * 0.5
    }

    /// Whether something in the obstruction mask blocks the eye line between two ground points
    pub fn is_obstructed(&self, from: Vec3, to: Vec3, raycaster: &dyn RaycastBackend) -> bool {
        let eye = Vec3::Y * self.eye_height;
        !raycaster.line_of_sight(from + eye, to + eye, self.obstruction_mask)
    }

    /// Range, cone and obstruction in one check
    pub fn can_see(
        &self,
        observer: &Pose,
        target: Vec3,
        range: f32,
        view_angle_deg: f32,
        raycaster: &dyn RaycastBackend,
    ) -> bool {
        observer.position.distance(target) <= range
            && self.in_view_cone(observer, target, view_angle_deg)
            && !self.is_obstructed(observer.position, target, raycaster)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nemesis_nav::{CollisionLayer, ObstacleField};

    fn observer() -> Pose {
        Pose::looking(Vec3::ZERO, Vec3::Z)
    }

    #[test]
    fn test_view_cone() {
        let perception = Perception::default();
        let pose = observer();
        assert!(perception.in_view_cone(&pose, Vec3::new(0.0, 0.0, 5.0), 120.0));
        assert!(perception.in_view_cone(&pose, Vec3::new(2.0, 0.0, 5.0), 120.0));
        assert!(!perception.in_view_cone(&pose, Vec3::new(5.0, 0.0, 1.0), 120.0));
        assert!(!perception.in_view_cone(&pose, Vec3::new(0.0, 0.0, -5.0), 120.0));
        assert!(perception.in_view_cone(&pose, Vec3::new(0.0, 0.0, -5.0), 360.0));
    }

    #[test]
    fn test_obstruction_uses_eye_height() {
        let perception = Perception::default();
        let low_wall = ObstacleField::new().with_box(
            Vec3::new(-2.0, 0.0, 2.0),
            Vec3::new(2.0, 1.0, 2.5),
            CollisionLayer::ENVIRONMENT,
        );
        // Eyes at 1.6 look over a 1.0 wall
        assert!(!perception.is_obstructed(Vec3::ZERO, Vec3::new(0.0, 0.0, 5.0), &low_wall));

        let high_wall = ObstacleField::new().with_box(
            Vec3::new(-2.0, 0.0, 2.0),
            Vec3::new(2.0, 3.0, 2.5),
            CollisionLayer::ENVIRONMENT,
        );
        assert!(perception.is_obstructed(Vec3::ZERO, Vec3::new(0.0, 0.0, 5.0), &high_wall));
    }

    #[test]
    fn test_mask_filters_layers() {
        let perception = Perception::default().with_mask(LayerMask::NONE);
        let wall = ObstacleField::new().with_box(
            Vec3::new(-2.0, 0.0, 2.0),
            Vec3::new(2.0, 3.0, 2.5),
            CollisionLayer::ENVIRONMENT,
        );
        assert!(!perception.is_obstructed(Vec3::ZERO, Vec3::new(0.0, 0.0, 5.0), &wall));
    }

    #[test]
    fn test_can_see_range() {
        let perception = Perception::default();
        let open = ObstacleField::new();
        let pose = observer();
        assert!(perception.can_see(&pose, Vec3::new(0.0, 0.0, 5.0), 10.0, 120.0, &open));
        assert!(!perception.can_see(&pose, Vec3::new(0.0, 0.0, 11.0), 10.0, 120.0, &open));
    }
}
