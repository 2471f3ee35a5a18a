//! Per-entity sequence numbers for in-flight moves.
//!
//! Each movable entity has its own monotonically increasing counter. A move
//! is tagged with the value its entity's counter had right after the move was
//! applied, and only a response carrying the entity's current value may touch
//! the store.

use crate::EntityKey;
use std::collections::BTreeMap;

/// Sequence number attached to a move.
pub type Seq = u64;

/// Tracks the latest sequence number handed out per entity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoveClock {
    latest: BTreeMap<EntityKey, Seq>,
}

impl MoveClock {
    /// Create a clock with no history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the counter for `entity` and return the new value.
    ///
    /// The first tick for an entity returns 1.
    pub fn tick(&mut self, entity: EntityKey) -> Seq {
        let counter = self.latest.entry(entity).or_insert(0);
        *counter += 1;
        *counter
    }

    /// Latest value handed out for `entity`, or 0 if none.
    pub fn current(&self, entity: EntityKey) -> Seq {
        self.latest.get(&entity).copied().unwrap_or(0)
    }

    /// Whether `seq` is still the newest move for `entity`.
    pub fn is_latest(&self, entity: EntityKey, seq: Seq) -> bool {
        self.current(entity) == seq
    }

    /// Number of entities that have been moved at least once.
    pub fn tracked(&self) -> usize {
        self.latest.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_clock_has_no_history() {
        let clock = MoveClock::new();
        assert_eq!(clock.current(EntityKey::Card(1)), 0);
        assert_eq!(clock.tracked(), 0);
    }

    #[test]
    fn tick_increments_per_entity() {
        let mut clock = MoveClock::new();
        assert_eq!(clock.tick(EntityKey::Card(1)), 1);
        assert_eq!(clock.tick(EntityKey::Card(1)), 2);
        assert_eq!(clock.tick(EntityKey::Card(2)), 1);
        assert_eq!(clock.tick(EntityKey::Section(1)), 1);
        assert_eq!(clock.tracked(), 3);
    }

    #[test]
    fn only_newest_is_latest() {
        let mut clock = MoveClock::new();
        let first = clock.tick(EntityKey::Section(4));
        assert!(clock.is_latest(EntityKey::Section(4), first));

        let second = clock.tick(EntityKey::Section(4));
        assert!(!clock.is_latest(EntityKey::Section(4), first));
        assert!(clock.is_latest(EntityKey::Section(4), second));
    }
}
