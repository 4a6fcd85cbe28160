//! Paths across the navigable surface

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// A route of corner points with a cursor at the next corner to reach
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NavPath {
    /// Corner points, first is the start
    pub corners: Vec<Vec3>,
    /// Index of the corner the agent is heading to
    pub current_index: usize,
}

impl NavPath {
    pub fn new(corners: Vec<Vec3>) -> Self {
        Self {
            corners,
            current_index: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.corners.is_empty()
    }

    /// Whether every corner has been reached
    pub fn is_complete(&self) -> bool {
        self.current_index >= self.corners.len()
    }

    pub fn current_corner(&self) -> Option<Vec3> {
        self.corners.get(self.current_index).copied()
    }

    /// Final corner
    pub fn destination(&self) -> Option<Vec3> {
        self.corners.last().copied()
    }

    /// Move the cursor to the next corner
    pub fn advance(&mut self) {
        if self.current_index < self.corners.len() {
            self.current_index += 1;
        }
    }

    /// Distance left when standing at `position`, following the remaining corners
    pub fn remaining_distance(&self, position: Vec3) -> f32 {
        let Some(next) = self.current_corner() else {
            return 0.0;
        };
        let mut distance = position.distance(next);
        for pair in self.corners[self.current_index..].windows(2) {
            distance += pair[0].distance(pair[1]);
        }
        distance
    }

    /// Length from first to last corner
    pub fn total_length(&self) -> f32 {
        self.corners.windows(2).map(|pair| pair[0].distance(pair[1])).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn straight() -> NavPath {
        NavPath::new(vec![
            Vec3::ZERO,
            Vec3::new(5.0, 0.0, 0.0),
            Vec3::new(5.0, 0.0, 5.0),
        ])
    }

    #[test]
    fn test_total_length() {
        assert_abs_diff_eq!(straight().total_length(), 10.0, epsilon = 1e-5);
    }

    #[test]
    fn test_remaining_distance_from_position() {
        let mut path = straight();
        path.advance();
        let remaining = path.remaining_distance(Vec3::new(2.0, 0.0, 0.0));
        assert_abs_diff_eq!(remaining, 8.0, epsilon = 1e-5);
    }

    #[test]
    fn test_completion() {
        let mut path = straight();
        assert!(!path.is_complete());
        for _ in 0..5 {
            path.advance();
        }
        assert!(path.is_complete());
        assert_eq!(path.current_corner(), None);
        assert_eq!(path.remaining_distance(Vec3::ZERO), 0.0);
        assert_eq!(path.destination(), Some(Vec3::new(5.0, 0.0, 5.0)));
    }
}
