//! Obstruction raycasts against world geometry

use crate::layers::{CollisionLayer, LayerMask};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Result of a raycast query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastHit {
    /// Hit point in world space
    pub point: Vec3,
    /// Surface normal at hit point
    pub normal: Vec3,
    /// Distance from ray origin
    pub distance: f32,
    /// Layer of the geometry that was hit
    pub layer: CollisionLayer,
}

/// Anything that can answer "what does this ray hit first"
pub trait RaycastBackend {
    /// Cast a ray. `direction` must be normalized. Only geometry on a layer in `mask` is considered.
    fn raycast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<RaycastHit>;

    /// True when nothing in `mask` lies strictly between `from` and `to`
    fn line_of_sight(&self, from: Vec3, to: Vec3, mask: LayerMask) -> bool {
        let delta = to - from;
        let distance = delta.length();
        if distance <= f32::EPSILON {
            return true;
        }
        match self.raycast(from, delta / distance, distance, mask) {
            Some(hit) => hit.distance >= distance - 1e-3,
            None => true,
        }
    }
}

/// Axis aligned box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Box from two opposite corners in any order
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// Slab test. Returns entry distance and entry normal.
    pub fn ray_intersect(&self, origin: Vec3, direction: Vec3) -> Option<(f32, Vec3)> {
        let mut t_min = f32::MIN;
        let mut t_max = f32::MAX;
        let mut normal = Vec3::ZERO;

        for axis in 0..3 {
            let o = origin[axis];
            let d = direction[axis];
            let (lo, hi) = (self.min[axis], self.max[axis]);
            if d.abs() < 1e-8 {
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / d;
            let mut t1 = (lo - o) * inv;
            let mut t2 = (hi - o) * inv;
            if t1 > t2 {
                std::mem::swap(&mut t1, &mut t2);
            }
            if t1 > t_min {
                t_min = t1;
                normal = Vec3::ZERO;
                normal[axis] = -d.signum();
            }
            t_max = t_max.min(t2);
            if t_min > t_max {
                return None;
            }
        }

        if t_max < 0.0 {
            return None;
        }
        if t_min < 0.0 {
            // Origin inside the box
            return Some((0.0, -direction));
        }
        Some((t_min, normal))
    }
}

/// A solid box on a layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub bounds: Aabb,
    pub layer: CollisionLayer,
}

/// A flat list of box obstacles, enough for level blockouts and tests
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObstacleField {
    obstacles: Vec<Obstacle>,
}

impl ObstacleField {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a box between two corners
    pub fn add_box(&mut self, a: Vec3, b: Vec3, layer: CollisionLayer) -> &mut Self {
        self.obstacles.push(Obstacle {
            bounds: Aabb::new(a, b),
            layer,
        });
        self
    }

    pub fn with_box(mut self, a: Vec3, b: Vec3, layer: CollisionLayer) -> Self {
        self.add_box(a, b, layer);
        self
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }
}

impl RaycastBackend for ObstacleField {
    fn raycast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<RaycastHit> {
        self.obstacles
            .iter()
            .filter(|obstacle| mask.contains(obstacle.layer))
            .filter_map(|obstacle| {
                let (distance, normal) = obstacle.bounds.ray_intersect(origin, direction)?;
                (distance <= max_distance).then(|| RaycastHit {
                    point: origin + direction * distance,
                    normal,
                    distance,
                    layer: obstacle.layer,
                })
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }
}
