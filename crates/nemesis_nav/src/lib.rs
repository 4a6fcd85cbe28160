//! Nemesis Nav - movement substrate for enemy agents
//!
//! Provides:
//! - A polygon [`NavMesh`] with A* search and corner smoothing
//! - The [`NavigationProvider`] query trait and its mesh-backed implementation
//! - [`AgentBody`], the position/facing/path state an agent moves with
//! - [`RaycastBackend`] obstruction queries filtered by [`LayerMask`]

pub mod body;
pub mod layers;
pub mod mesh;
pub mod path;
pub mod provider;
pub mod raycast;

pub mod prelude {
    pub use crate::body::{AgentBody, FreeLocomotion, Locomotion, MovementAuthority};
    pub use crate::layers::{CollisionLayer, LayerMask};
    pub use crate::mesh::{NavMesh, NavPolygon};
    pub use crate::path::NavPath;
    pub use crate::provider::{ArcSample, NavMeshProvider, NavigationProvider, PathQuery};
    pub use crate::raycast::{Aabb, Obstacle, ObstacleField, RaycastBackend, RaycastHit};
}

pub use prelude::*;
