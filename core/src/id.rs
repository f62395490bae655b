//! Identity types for relational genes.
//!
//! Every primary-key gene owns a `UniqueId` that is:
//! - Unique within one generator's lifetime
//! - Monotonically assigned, never reused
//! - Opaque to external users (foreign keys reference it by value only)

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Unique identifier owned by a primary-key gene and referenced by
/// foreign-key genes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UniqueId(pub u64);

impl UniqueId {
    /// Create a UniqueId from a raw value.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for UniqueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonic source of fresh `UniqueId`s.
///
/// Owned by the insertion builder of one schema-load session rather than
/// living in process-wide static state. Ids are never reused: truncating or
/// discarding actions leaves holes in the sequence, which is fine since only
/// equality of ids is ever observed.
#[derive(Debug, Default)]
pub struct IdGenerator {
    next: AtomicU64,
}

impl IdGenerator {
    /// Create a generator starting at id 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out the next id.
    pub fn fresh(&self) -> UniqueId {
        UniqueId(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_id_equality() {
        let id1 = UniqueId::new(1);
        let id2 = UniqueId::new(1);
        let id3 = UniqueId::new(2);

        assert_eq!(id1, id2);
        assert_ne!(id1, id3);
    }

    #[test]
    fn test_generator_is_monotonic() {
        let gen = IdGenerator::new();
        let a = gen.fresh();
        let b = gen.fresh();
        let c = gen.fresh();

        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn test_generators_are_independent() {
        let gen1 = IdGenerator::new();
        let gen2 = IdGenerator::new();

        // Two sessions produce overlapping raw values; ids are only
        // meaningful within one builder session.
        assert_eq!(gen1.fresh(), gen2.fresh());
    }
}
