//! Health pool

use serde::{Deserialize, Serialize};

/// Result of applying damage to a [`Health`] pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthChange {
    /// Damage actually removed
    pub applied: i32,
    /// Health after the hit
    pub current: i32,
    /// This hit brought health to zero
    pub died: bool,
}

/// Integer health clamped to `[0, max]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    current: i32,
    max: i32,
}

impl Health {
    /// Create a full pool. A non-positive maximum becomes 1.
    pub fn new(max: i32) -> Self {
        let max = max.max(1);
        Self { current: max, max }
    }

    pub fn current(&self) -> i32 {
        self.current
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    pub fn is_dead(&self) -> bool {
        self.current <= 0
    }

    pub fn is_full(&self) -> bool {
        self.current >= self.max
    }

    /// Health as a fraction (0.0 - 1.0)
    pub fn fraction(&self) -> f32 {
        self.current as f32 / self.max as f32
    }

    /// Remove `amount`. Non-positive amounts and hits on a dead pool change nothing.
    pub fn apply_damage(&mut self, amount: i32) -> HealthChange {
        if amount <= 0 || self.is_dead() {
            return HealthChange {
                applied: 0,
                current: self.current,
                died: false,
            };
        }
        let before = self.current;
        self.current = self.current.saturating_sub(amount).max(0);
        HealthChange {
            applied: before - self.current,
            current: self.current,
            died: self.current == 0,
        }
    }

    /// Back to full
    pub fn reset(&mut self) {
        self.current = self.max;
    }
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100)
    }
}
