//! Polygon navigation mesh with A* search and corner smoothing

use crate::path::NavPath;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

/// Tolerance used when testing whether a point lies inside polygon bounds
const EDGE_EPSILON: f32 = 1e-4;

/// A polygon in the navigation mesh
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavPolygon {
    /// Vertex indices
    pub vertices: Vec<usize>,
    /// Center point
    pub center: Vec3,
    /// Neighboring polygon indices
    pub neighbors: Vec<usize>,
    /// Area cost multiplier (higher = harder to traverse)
    pub cost: f32,
    /// Whether agents may stand on this polygon
    pub walkable: bool,
    /// Horizontal bounds, minimum corner
    pub min: Vec3,
    /// Horizontal bounds, maximum corner
    pub max: Vec3,
}

impl NavPolygon {
    /// Create a new polygon from its vertices
    pub fn new(vertices: Vec<usize>, positions: &[Vec3]) -> Self {
        let mut min = Vec3::splat(f32::MAX);
        let mut max = Vec3::splat(f32::MIN);
        let mut sum = Vec3::ZERO;
        for &index in &vertices {
            let p = positions[index];
            min = min.min(p);
            max = max.max(p);
            sum += p;
        }
        let center = if vertices.is_empty() {
            Vec3::ZERO
        } else {
            sum / vertices.len() as f32
        };
        Self {
            vertices,
            center,
            neighbors: Vec::new(),
            cost: 1.0,
            walkable: true,
            min,
            max,
        }
    }

    /// Whether `point` lies inside the horizontal bounds
    pub fn contains_xz(&self, point: Vec3) -> bool {
        point.x >= self.min.x - EDGE_EPSILON
            && point.x <= self.max.x + EDGE_EPSILON
            && point.z >= self.min.z - EDGE_EPSILON
            && point.z <= self.max.z + EDGE_EPSILON
    }

    /// Closest point of the polygon surface to `point`
    pub fn clamp(&self, point: Vec3) -> Vec3 {
        Vec3::new(
            point.x.clamp(self.min.x, self.max.x),
            self.center.y,
            point.z.clamp(self.min.z, self.max.z),
        )
    }
}

/// Navigation mesh for pathfinding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavMesh {
    /// Vertices of the mesh
    pub vertices: Vec<Vec3>,
    /// Polygons of the mesh
    pub polygons: Vec<NavPolygon>,
    /// Grid cell size for spatial queries
    cell_size: f32,
    /// Maximum height difference between a point and the surface it stands on
    vertical_tolerance: f32,
    /// Spatial hash for quick polygon lookup
    #[serde(skip)]
    spatial_hash: HashMap<(i32, i32), Vec<usize>>,
}

impl Default for NavMesh {
    fn default() -> Self {
        Self::new()
    }
}

impl NavMesh {
    /// Create a new empty nav mesh
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            polygons: Vec::new(),
            cell_size: 1.0,
            vertical_tolerance: 1.0,
            spatial_hash: HashMap::new(),
        }
    }

    /// Create a flat grid mesh starting at the origin
    pub fn create_grid(width: f32, depth: f32, cell_size: f32) -> Self {
        let cols = (width / cell_size).ceil().max(0.0) as usize;
        let rows = (depth / cell_size).ceil().max(0.0) as usize;
        Self::create_grid_at(Vec3::ZERO, cols, rows, cell_size)
    }

    /// Create a flat grid of `cols` x `rows` quads with its minimum corner at `origin`
    pub fn create_grid_at(origin: Vec3, cols: usize, rows: usize, cell_size: f32) -> Self {
        let mut mesh = Self::new();
        mesh.cell_size = cell_size;

        for row in 0..=rows {
            for col in 0..=cols {
                mesh.vertices.push(
                    origin + Vec3::new(col as f32 * cell_size, 0.0, row as f32 * cell_size),
                );
            }
        }

        let stride = cols + 1;
        for row in 0..rows {
            for col in 0..cols {
                let base = row * stride + col;
                let vertices = vec![base, base + 1, base + stride + 1, base + stride];
                let polygon = NavPolygon::new(vertices, &mesh.vertices);
                mesh.polygons.push(polygon);
            }
        }

        for row in 0..rows {
            for col in 0..cols {
                let idx = row * cols + col;
                let mut neighbors = Vec::new();
                if col > 0 {
                    neighbors.push(idx - 1);
                }
                if col + 1 < cols {
                    neighbors.push(idx + 1);
                }
                if row > 0 {
                    neighbors.push(idx - cols);
                }
                if row + 1 < rows {
                    neighbors.push(idx + cols);
                }
                mesh.polygons[idx].neighbors = neighbors;
            }
        }

        mesh.rebuild_spatial_hash();
        mesh
    }

    /// Build a grid from an ASCII map, one character per cell.
    ///
    /// `#` marks a blocked cell, anything else is walkable. The first line maps to
    /// `z = 0`, the first column to `x = 0`. Short lines are padded with blocked cells.
    pub fn from_ascii(map: &str, cell_size: f32) -> Self {
        let lines: Vec<&str> = map
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.is_empty())
            .collect();
        let rows = lines.len();
        let cols = lines.iter().map(|line| line.chars().count()).max().unwrap_or(0);
        let mut mesh = Self::create_grid_at(Vec3::ZERO, cols, rows, cell_size);

        for (row, line) in lines.iter().enumerate() {
            let chars: Vec<char> = line.chars().collect();
            for col in 0..cols {
                if chars.get(col).map_or(true, |&c| c == '#') {
                    mesh.set_walkable(row * cols + col, false);
                }
            }
        }

        log::debug!(
            "Built nav mesh {}x{} from map ({} walkable cells)",
            cols,
            rows,
            mesh.walkable_count()
        );
        mesh
    }

    /// Set the maximum height difference accepted by surface queries
    pub fn with_vertical_tolerance(mut self, tolerance: f32) -> Self {
        self.vertical_tolerance = tolerance.max(0.0);
        self
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn vertical_tolerance(&self) -> f32 {
        self.vertical_tolerance
    }

    /// Number of polygons agents may stand on
    pub fn walkable_count(&self) -> usize {
        self.polygons.iter().filter(|p| p.walkable).count()
    }

    /// Rebuild spatial hash for queries
    pub fn rebuild_spatial_hash(&mut self) {
        self.spatial_hash.clear();
        for (idx, poly) in self.polygons.iter().enumerate() {
            let key = self.cell_key(poly.center);
            self.spatial_hash.entry(key).or_default().push(idx);
        }
    }

    fn cell_key(&self, point: Vec3) -> (i32, i32) {
        (
            (point.x / self.cell_size).floor() as i32,
            (point.z / self.cell_size).floor() as i32,
        )
    }

    fn contains(&self, idx: usize, point: Vec3) -> bool {
        let poly = &self.polygons[idx];
        poly.contains_xz(point) && (point.y - poly.center.y).abs() <= self.vertical_tolerance
    }

    /// Find the polygon containing a point
    pub fn find_polygon(&self, point: Vec3) -> Option<usize> {
        let (cell_x, cell_z) = self.cell_key(point);

        for dx in -1..=1 {
            for dz in -1..=1 {
                if let Some(indices) = self.spatial_hash.get(&(cell_x + dx, cell_z + dz)) {
                    for &idx in indices {
                        if self.contains(idx, point) {
                            return Some(idx);
                        }
                    }
                }
            }
        }

        // Large polygons can sit outside the neighbouring cells
        (0..self.polygons.len()).find(|&idx| self.contains(idx, point))
    }

    /// Find a walkable polygon containing a point
    pub fn find_walkable_polygon(&self, point: Vec3) -> Option<usize> {
        let (cell_x, cell_z) = self.cell_key(point);

        for dx in -1..=1 {
            for dz in -1..=1 {
                if let Some(indices) = self.spatial_hash.get(&(cell_x + dx, cell_z + dz)) {
                    for &idx in indices {
                        if self.polygons[idx].walkable && self.contains(idx, point) {
                            return Some(idx);
                        }
                    }
                }
            }
        }

        (0..self.polygons.len()).find(|&idx| self.polygons[idx].walkable && self.contains(idx, point))
    }

    /// Nearest walkable surface point within `radius` of `point`
    pub fn closest_point(&self, point: Vec3, radius: f32) -> Option<Vec3> {
        if let Some(idx) = self.find_walkable_polygon(point) {
            return Some(Vec3::new(point.x, self.polygons[idx].center.y, point.z));
        }

        self.polygons
            .iter()
            .filter(|poly| poly.walkable)
            .map(|poly| poly.clamp(point))
            .map(|candidate| (candidate, candidate.distance(point)))
            .filter(|(_, distance)| *distance <= radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(candidate, _)| candidate)
    }

    /// Whether the straight segment from `from` to `to` stays on walkable surface
    pub fn segment_walkable(&self, from: Vec3, to: Vec3) -> bool {
        let length = from.distance(to);
        let step = (self.cell_size * 0.25).max(0.01);
        let steps = (length / step).ceil().max(1.0) as usize;
        (0..=steps).all(|i| {
            let t = i as f32 / steps as f32;
            self.find_walkable_polygon(from.lerp(to, t)).is_some()
        })
    }

    /// Find path between two points using A*, with corners pulled tight
    pub fn find_path(&self, start: Vec3, end: Vec3) -> Option<NavPath> {
        let start_poly = self.find_walkable_polygon(start)?;
        let end_poly = self.find_walkable_polygon(end)?;

        let start = Vec3::new(start.x, self.polygons[start_poly].center.y, start.z);
        let end = Vec3::new(end.x, self.polygons[end_poly].center.y, end.z);

        if start_poly == end_poly {
            return Some(NavPath::new(vec![start, end]));
        }

        let path_indices = self.astar(start_poly, end_poly)?;

        let mut corners = Vec::with_capacity(path_indices.len() + 2);
        corners.push(start);
        // Skip the polygons the endpoints already stand on
        for &idx in &path_indices[1..path_indices.len() - 1] {
            corners.push(self.polygons[idx].center);
        }
        corners.push(end);

        Some(NavPath::new(self.smooth(corners)))
    }

    /// Drop corners that can be skipped with a straight walkable segment
    fn smooth(&self, corners: Vec<Vec3>) -> Vec<Vec3> {
        if corners.len() <= 2 {
            return corners;
        }
        let last = corners.len() - 1;
        let mut result = vec![corners[0]];
        let mut i = 0;
        while i < last {
            let mut j = last;
            while j > i + 1 && !self.segment_walkable(corners[i], corners[j]) {
                j -= 1;
            }
            result.push(corners[j]);
            i = j;
        }
        result
    }

    /// A* over polygon centers, weighted by the entered polygon's cost.
    ///
    /// Returns the polygon indices from `start` to `goal`, both included.
    fn astar(&self, start: usize, goal: usize) -> Option<Vec<usize>> {
        let count = self.polygons.len();
        let goal_center = self.polygons[goal].center;
        let heuristic = |idx: usize| self.polygons[idx].center.distance(goal_center);

        let mut best = vec![f32::INFINITY; count];
        let mut parent: Vec<Option<usize>> = vec![None; count];
        let mut settled = vec![false; count];
        let mut frontier = BinaryHeap::new();

        best[start] = 0.0;
        frontier.push(Frontier {
            estimate: heuristic(start),
            idx: start,
        });

        while let Some(Frontier { idx, .. }) = frontier.pop() {
            if idx == goal {
                let mut route = vec![goal];
                let mut cursor = goal;
                while let Some(prev) = parent[cursor] {
                    route.push(prev);
                    cursor = prev;
                }
                route.reverse();
                return Some(route);
            }
            if std::mem::replace(&mut settled[idx], true) {
                continue;
            }

            let here = &self.polygons[idx];
            for &next in &here.neighbors {
                let there = &self.polygons[next];
                if settled[next] || !there.walkable {
                    continue;
                }
                let cost = best[idx] + here.center.distance(there.center) * there.cost;
                if cost < best[next] {
                    best[next] = cost;
                    parent[next] = Some(idx);
                    frontier.push(Frontier {
                        estimate: cost + heuristic(next),
                        idx: next,
                    });
                }
            }
        }

        log::debug!("No route between polygons {start} and {goal}");
        None
    }

    /// Mark a polygon as walkable or blocked
    pub fn set_walkable(&mut self, polygon_idx: usize, walkable: bool) {
        if let Some(poly) = self.polygons.get_mut(polygon_idx) {
            poly.walkable = walkable;
        }
    }

    /// Set cost for a polygon
    pub fn set_cost(&mut self, polygon_idx: usize, cost: f32) {
        if let Some(poly) = self.polygons.get_mut(polygon_idx) {
            poly.cost = cost;
        }
    }

    /// Block every polygon whose center lies inside the horizontal box
    pub fn block_region(&mut self, min: Vec3, max: Vec3) -> usize {
        let mut blocked = 0;
        for poly in &mut self.polygons {
            let c = poly.center;
            if c.x >= min.x && c.x <= max.x && c.z >= min.z && c.z <= max.z && poly.walkable {
                poly.walkable = false;
                blocked += 1;
            }
        }
        blocked
    }
}

/// Open-set entry; the smallest estimate pops first, ties by lower index
#[derive(Debug, Clone, Copy)]
struct Frontier {
    estimate: f32,
    idx: usize,
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier {}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .estimate
            .total_cmp(&self.estimate)
            .then_with(|| other.idx.cmp(&self.idx))
    }
}
