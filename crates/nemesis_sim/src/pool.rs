//! Where finished enemies go and new ones come from

use nemesis_ai::Enemy;

/// Recycles deactivated enemies.
///
/// `release` takes the enemy by value, so one instance can only be released once.
pub trait EnemyPool {
    /// Take back an enemy whose death timer has elapsed
    fn release(&mut self, enemy: Enemy);

    /// Hand out a previously released enemy, if any
    fn acquire(&mut self) -> Option<Enemy>;

    /// Number of enemies waiting for reuse
    fn available(&self) -> usize;
}

/// Stack of released enemies
#[derive(Debug, Default)]
pub struct VecPool {
    free: Vec<Enemy>,
    released: usize,
    capacity: Option<usize>,
}

impl VecPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep at most `capacity` enemies; extra releases are dropped
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            free: Vec::with_capacity(capacity),
            released: 0,
            capacity: Some(capacity),
        }
    }

    /// Total number of releases seen
    pub fn released(&self) -> usize {
        self.released
    }
}

impl EnemyPool for VecPool {
    fn release(&mut self, enemy: Enemy) {
        self.released += 1;
        if self.capacity.is_some_and(|cap| self.free.len() >= cap) {
            log::debug!("Pool full, dropping enemy {}", enemy.id());
            return;
        }
        log::debug!("Enemy {} returned to the pool", enemy.id());
        self.free.push(enemy);
    }

    fn acquire(&mut self) -> Option<Enemy> {
        self.free.pop()
    }

    fn available(&self) -> usize {
        self.free.len()
    }
}

/// Drops everything it is given
#[derive(Debug, Default, Clone, Copy)]
pub struct DiscardPool;

impl EnemyPool for DiscardPool {
    fn release(&mut self, enemy: Enemy) {
        log::trace!("Discarding enemy {}", enemy.id());
    }

    fn acquire(&mut self) -> Option<Enemy> {
        None
    }

    fn available(&self) -> usize {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nemesis_core::{EnemyConfig, EntityId, Pose};

    fn enemy(index: u32) -> Enemy {
        match Enemy::new(EntityId::new(index, 0), EnemyConfig::default(), Pose::default()) {
            Ok(enemy) => enemy,
            Err(e) => panic!("enemy should build: {e}"),
        }
    }

    #[test]
    fn test_release_then_acquire() {
        let mut pool = VecPool::new();
        pool.release(enemy(1));
        pool.release(enemy(2));
        assert_eq!(pool.available(), 2);
        assert_eq!(pool.acquire().map(|e| e.id()), Some(EntityId::new(2, 0)));
        assert_eq!(pool.released(), 2);
    }

    #[test]
    fn test_capacity_limits_free_list() {
        let mut pool = VecPool::with_capacity(1);
        pool.release(enemy(1));
        pool.release(enemy(2));
        assert_eq!(pool.available(), 1);
        assert_eq!(pool.released(), 2);
    }
}
