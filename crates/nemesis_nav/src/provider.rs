//! Navigation queries used by the behavior layer

use crate::body::AgentBody;
use crate::layers::LayerMask;
use crate::mesh::NavMesh;
use crate::raycast::RaycastBackend;
use glam::Vec3;
use nemesis_core::math::{self, horizontal_distance};
use rand::{Rng, RngCore};
use std::f32::consts::TAU;

/// Outcome of a reachability query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathQuery {
    /// A complete path exists
    pub reachable: bool,
    /// Path length, infinite when unreachable
    pub length: f32,
}

impl PathQuery {
    pub fn unreachable() -> Self {
        Self {
            reachable: false,
            length: f32::INFINITY,
        }
    }
}

/// Arc to sample around an observer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcSample {
    /// Observer position on the ground
    pub center: Vec3,
    /// Direction the arc is centered on
    pub facing: Vec3,
    /// Full arc width in degrees
    pub angle_range_deg: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Height of the sight ray above the ground
    pub eye_height: f32,
}

/// Navigation capabilities an agent relies on
pub trait NavigationProvider {
    /// Plan a path to `destination` and hand it to the body.
    /// Leaves the body untouched and returns false when no path exists.
    fn try_set_destination(&self, body: &mut AgentBody, destination: Vec3) -> bool;

    /// Distance from the body to `point`. With `use_network_path` this is the
    /// distance left along the body's current path plus the leg from the path's
    /// end to `point`; it never plans a new path. Without a path it is the
    /// straight-line distance.
    fn distance_to(&self, body: &AgentBody, point: Vec3, use_network_path: bool) -> f32;

    /// Whether the body stands within `tolerance` of `point`
    fn has_reached(&self, body: &AgentBody, point: Vec3, tolerance: f32) -> bool;

    /// Whether the body is enabled and on the surface
    fn is_agent_valid(&self, body: &AgentBody) -> bool;

    /// Nearest surface point within `search_radius`
    fn snap_to_surface(&self, point: Vec3, search_radius: f32) -> Option<Vec3>;

    /// Whether a complete path joins the two points, and how long it is
    fn can_reach(&self, from: Vec3, to: Vec3) -> PathQuery;

    /// Uniform surface point inside a disc, if one is found
    fn random_point_within(&self, rng: &mut dyn RngCore, center: Vec3, radius: f32)
        -> Option<Vec3>;

    /// Surface point inside an arc with a clear sight line from the observer
    fn random_visible_point_around(
        &self,
        rng: &mut dyn RngCore,
        arc: &ArcSample,
        raycaster: &dyn RaycastBackend,
        obstruction: LayerMask,
    ) -> Option<Vec3>;
}

/// [`NavigationProvider`] backed by a [`NavMesh`]
#[derive(Debug, Clone)]
pub struct NavMeshProvider {
    mesh: NavMesh,
    /// Radius used to snap off-mesh points onto the surface
    snap_radius: f32,
    /// Attempts made by random sampling queries
    sample_attempts: u32,
}

impl NavMeshProvider {
    pub fn new(mesh: NavMesh) -> Self {
        let snap_radius = mesh.cell_size();
        Self {
            mesh,
            snap_radius,
            sample_attempts: 16,
        }
    }

    pub fn with_snap_radius(mut self, radius: f32) -> Self {
        self.snap_radius = radius.max(0.0);
        self
    }

    pub fn with_sample_attempts(mut self, attempts: u32) -> Self {
        self.sample_attempts = attempts.max(1);
        self
    }

    pub fn mesh(&self) -> &NavMesh {
        &self.mesh
    }
}

impl NavigationProvider for NavMeshProvider {
    fn try_set_destination(&self, body: &mut AgentBody, destination: Vec3) -> bool {
        if body.is_disabled() {
            return false;
        }
        let Some(goal) = self.mesh.closest_point(destination, self.snap_radius) else {
            log::trace!("Destination {destination} is off the nav mesh");
            return false;
        };
        let Some(start) = self.mesh.closest_point(body.position(), self.snap_radius) else {
            return false;
        };
        match self.mesh.find_path(start, goal) {
            Some(path) => {
                body.set_path(path, goal);
                true
            }
            None => {
                log::trace!("No path from {start} to {goal}");
                false
            }
        }
    }

    fn distance_to(&self, body: &AgentBody, point: Vec3, use_network_path: bool) -> f32 {
        let straight = body.position().distance(point);
        if !use_network_path {
            return straight;
        }
        match body.destination() {
            Some(end) if body.has_path() => body.remaining_distance() + end.distance(point),
            _ => straight,
        }
    }

    fn has_reached(&self, body: &AgentBody, point: Vec3, tolerance: f32) -> bool {
        horizontal_distance(body.position(), point) <= tolerance.max(0.01)
            && (body.position().y - point.y).abs() <= self.mesh.vertical_tolerance()
    }

    fn is_agent_valid(&self, body: &AgentBody) -> bool {
        !body.is_disabled()
            && self
                .mesh
                .closest_point(body.position(), body.radius())
                .is_some()
    }

    fn snap_to_surface(&self, point: Vec3, search_radius: f32) -> Option<Vec3> {
        self.mesh.closest_point(point, search_radius)
    }

    fn can_reach(&self, from: Vec3, to: Vec3) -> PathQuery {
        let Some(start) = self.mesh.closest_point(from, self.snap_radius) else {
            return PathQuery::unreachable();
        };
        let Some(goal) = self.mesh.closest_point(to, self.snap_radius) else {
            return PathQuery::unreachable();
        };
        match self.mesh.find_path(start, goal) {
            Some(path) => PathQuery {
                reachable: true,
                length: path.total_length(),
            },
            None => PathQuery::unreachable(),
        }
    }

    fn random_point_within(
        &self,
        rng: &mut dyn RngCore,
        center: Vec3,
        radius: f32,
    ) -> Option<Vec3> {
        if radius <= 0.0 {
            return self.mesh.closest_point(center, self.snap_radius);
        }
        for _ in 0..self.sample_attempts {
            let angle = rng.gen_range(0.0..TAU);
            let distance = radius * rng.gen::<f32>().sqrt();
            let candidate = center + Vec3::new(angle.sin(), 0.0, angle.cos()) * distance;
            if let Some(idx) = self.mesh.find_walkable_polygon(candidate) {
                let y = self.mesh.polygons[idx].center.y;
                return Some(Vec3::new(candidate.x, y, candidate.z));
            }
        }
        None
    }

    fn random_visible_point_around(
        &self,
        rng: &mut dyn RngCore,
        arc: &ArcSample,
        raycaster: &dyn RaycastBackend,
        obstruction: LayerMask,
    ) -> Option<Vec3> {
        let facing = math::flatten(arc.facing);
        let base_yaw = if facing.length_squared() > math::DIRECTION_EPSILON {
            facing.x.atan2(facing.z)
        } else {
            0.0
        };
        let half = (arc.angle_range_deg.clamp(0.0, 360.0) * 0.5).to_radians();
        let min = arc.min_distance.max(0.0);
        let max = arc.max_distance.max(min);
        let eye = arc.center + Vec3::Y * arc.eye_height;

        for _ in 0..self.sample_attempts {
            let yaw = if half > 0.0 {
                base_yaw + rng.gen_range(-half..=half)
            } else {
                base_yaw
            };
            let distance = if max > min {
                rng.gen_range(min..=max)
            } else {
                min
            };
            let candidate = arc.center + Vec3::new(yaw.sin(), 0.0, yaw.cos()) * distance;
            let Some(idx) = self.mesh.find_walkable_polygon(candidate) else {
                continue;
            };
            let point = Vec3::new(candidate.x, self.mesh.polygons[idx].center.y, candidate.z);
            let sight_target = point + Vec3::Y * arc.eye_height;
            if raycaster.line_of_sight(eye, sight_target, obstruction) {
                return Some(point);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::CollisionLayer;
    use crate::raycast::ObstacleField;
    use approx::assert_abs_diff_eq;
    use nemesis_core::Pose;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn open_floor() -> NavMeshProvider {
        NavMeshProvider::new(NavMesh::create_grid(20.0, 20.0, 1.0))
    }

    fn body_at(x: f32, z: f32) -> AgentBody {
        AgentBody::new(Pose::new(Vec3::new(x, 0.0, z), Default::default()))
    }

    #[test]
    fn test_set_destination() {
        let nav = open_floor();
        let mut body = body_at(1.5, 1.5);
        assert!(nav.try_set_destination(&mut body, Vec3::new(10.5, 0.0, 1.5)));
        assert!(body.has_path());
        assert_eq!(body.destination(), Some(Vec3::new(10.5, 0.0, 1.5)));
    }

    #[test]
    fn test_failed_destination_leaves_body_untouched() {
        let map = "\
..#..
..#..";
        let nav = NavMeshProvider::new(NavMesh::from_ascii(map, 1.0));
        let mut body = body_at(0.5, 0.5);
        assert!(nav.try_set_destination(&mut body, Vec3::new(1.5, 0.0, 0.5)));
        let before = body.destination();
        assert!(!nav.try_set_destination(&mut body, Vec3::new(4.5, 0.0, 0.5)));
        assert_eq!(body.destination(), before);
        assert!(!nav.try_set_destination(&mut body, Vec3::new(50.0, 0.0, 50.0)));
    }

    #[test]
    fn test_distance_to_falls_back_to_straight_line() {
        let map = "\
..#..
..#..";
        let nav = NavMeshProvider::new(NavMesh::from_ascii(map, 1.0));
        let body = body_at(0.5, 0.5);
        let target = Vec3::new(4.5, 0.0, 0.5);
        assert_abs_diff_eq!(nav.distance_to(&body, target, true), 4.0, epsilon = 1e-5);
    }

    #[test]
    fn test_path_distance_exceeds_straight_line_around_walls() {
        let map = "\
.....
.###.
.....";
        let nav = NavMeshProvider::new(NavMesh::from_ascii(map, 1.0));
        let mut body = body_at(0.5, 1.5);
        let target = Vec3::new(4.5, 0.0, 1.5);
        assert!(nav.try_set_destination(&mut body, target));
        let straight = nav.distance_to(&body, target, false);
        let network = nav.distance_to(&body, target, true);
        assert!(network > straight);
    }

    #[test]
    fn test_path_distance_adds_leg_to_moved_target() {
        let nav = open_floor();
        let mut body = body_at(1.5, 1.5);
        assert!(nav.try_set_destination(&mut body, Vec3::new(5.5, 0.0, 1.5)));
        let along = body.remaining_distance();
        // Target walked on since the last repath; the path is not replanned
        let moved = Vec3::new(5.5, 0.0, 4.5);
        assert_abs_diff_eq!(nav.distance_to(&body, moved, true), along + 3.0, epsilon = 1e-4);
        assert_eq!(body.destination(), Some(Vec3::new(5.5, 0.0, 1.5)));
    }

    #[test]
    fn test_has_reached_is_horizontal() {
        let nav = open_floor();
        let body = body_at(5.0, 5.0);
        assert!(nav.has_reached(&body, Vec3::new(5.2, 0.5, 5.0), 0.3));
        assert!(!nav.has_reached(&body, Vec3::new(6.0, 0.0, 5.0), 0.3));
    }

    #[test]
    fn test_agent_validity() {
        let nav = open_floor();
        let mut body = body_at(5.0, 5.0);
        assert!(nav.is_agent_valid(&body));
        body.disable();
        assert!(!nav.is_agent_valid(&body));
        assert!(!nav.is_agent_valid(&body_at(-10.0, -10.0)));
    }

    #[test]
    fn test_random_point_within_stays_on_surface() {
        let nav = open_floor();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..20 {
            let p = nav
                .random_point_within(&mut rng, Vec3::new(10.0, 0.0, 10.0), 3.0)
                .unwrap();
            assert!(horizontal_distance(p, Vec3::new(10.0, 0.0, 10.0)) <= 3.0 + 1e-4);
        }
    }

    #[test]
    fn test_random_visible_point_respects_walls() {
        let nav = open_floor();
        // Wall in front of the observer along +Z
        let walls = ObstacleField::new().with_box(
            Vec3::new(5.0, 0.0, 11.0),
            Vec3::new(15.0, 3.0, 11.5),
            CollisionLayer::ENVIRONMENT,
        );
        let arc = ArcSample {
            center: Vec3::new(10.0, 0.0, 10.0),
            facing: Vec3::Z,
            angle_range_deg: 30.0,
            min_distance: 3.0,
            max_distance: 5.0,
            eye_height: 1.6,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert!(nav
            .random_visible_point_around(&mut rng, &arc, &walls, LayerMask::obstruction())
            .is_none());

        let behind = ArcSample {
            facing: Vec3::NEG_Z,
            ..arc
        };
        let point = nav
            .random_visible_point_around(&mut rng, &behind, &walls, LayerMask::obstruction())
            .unwrap();
        assert!(point.z < 10.0);
    }
}
