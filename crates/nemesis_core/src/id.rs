//! Entity identifiers and state identities

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Opaque identifier for anything that can deal or receive damage
///
/// Lower 32 bits hold the slot index, upper 32 bits the generation, so a
/// pooled enemy that is recycled gets a distinct id.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId {
    bits: u64,
}

impl EntityId {
    /// Create an id from index and generation
    #[inline]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self {
            bits: (generation as u64) << 32 | index as u64,
        }
    }

    /// The null id, used when a damage source is unknown
    #[inline]
    pub const fn null() -> Self {
        Self { bits: u64::MAX }
    }

    #[inline]
    pub const fn is_null(&self) -> bool {
        self.bits == u64::MAX
    }

    #[inline]
    pub const fn index(&self) -> u32 {
        self.bits as u32
    }

    #[inline]
    pub const fn generation(&self) -> u32 {
        (self.bits >> 32) as u32
    }

    /// Same slot, next generation
    #[inline]
    pub const fn next_generation(&self) -> Self {
        Self::new(self.index(), self.generation().wrapping_add(1))
    }

    #[inline]
    pub const fn to_bits(&self) -> u64 {
        self.bits
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::null()
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "EntityId(null)")
        } else {
            write!(f, "EntityId({}v{})", self.index(), self.generation())
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "null")
        } else {
            write!(f, "{}v{}", self.index(), self.generation())
        }
    }
}

/// Hands out fresh entity ids
pub struct IdGenerator {
    next: AtomicU64,
}

impl IdGenerator {
    pub const fn new() -> Self {
        Self {
            next: AtomicU64::new(0),
        }
    }

    /// Generate the next unique id
    pub fn next(&self) -> EntityId {
        let index = self.next.fetch_add(1, Ordering::Relaxed);
        EntityId::new(index as u32, 0)
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Behavior state of an enemy. Exactly one is active per agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StateId {
    /// Initial state: wait in place and look around
    Idle,
    /// Walk the patrol route
    Patrol,
    /// Chase the target
    Trace,
    /// Walk back to the start pose
    Return,
    /// Face and strike the target
    Attack,
    /// Terminal state
    Die,
}

impl StateId {
    pub const ALL: [StateId; 6] = [
        StateId::Idle,
        StateId::Patrol,
        StateId::Trace,
        StateId::Return,
        StateId::Attack,
        StateId::Die,
    ];

    /// Whether no transition may leave this state
    pub const fn is_terminal(self) -> bool {
        matches!(self, StateId::Die)
    }

    pub const fn name(self) -> &'static str {
        match self {
            StateId::Idle => "idle",
            StateId::Patrol => "patrol",
            StateId::Trace => "trace",
            StateId::Return => "return",
            StateId::Attack => "attack",
            StateId::Die => "die",
        }
    }
}

impl Default for StateId {
    fn default() -> Self {
        Self::Idle
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
