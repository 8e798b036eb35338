//! In-flight mutation tracking per board item.
//!
//! # Invariants
//! - An item key is present at most once; a second `begin` is refused.
//! - `begin_all` is all-or-nothing.
//! - Tracking is per item; other keys are never blocked.
//! - Structural holds only gate the operations they conflict with: a pending
//!   tier create or delete blocks reorders, a pending reorder blocks tier
//!   deletes.

use crate::model::item::ItemKey;
use crate::model::tier::TierId;
use std::collections::BTreeSet;

/// Board-wide mutation that conflicts with other operations beyond its own
/// item key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructuralHold {
    /// Tier create or delete; a reorder assignment would name a tier the
    /// server may not have.
    TierChange(TierId),
    /// Reorder whose assignment names every tier on the board.
    Reorder,
}

/// Set of item keys with an unconfirmed mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveStateTracker {
    in_flight: BTreeSet<ItemKey>,
    tier_changes: BTreeSet<TierId>,
    reordering: bool,
}

impl SaveStateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `key` as saving. Returns `false` when it already was.
    pub fn begin(&mut self, key: ItemKey) -> bool {
        self.in_flight.insert(key)
    }

    /// Marks every key as saving, or none of them.
    ///
    /// Returns the first busy key on conflict. Duplicate keys in `keys` are
    /// tolerated.
    pub fn begin_all(&mut self, keys: &[ItemKey]) -> Result<(), ItemKey> {
        if let Some(busy) = keys.iter().find(|key| self.in_flight.contains(key)) {
            return Err(*busy);
        }
        self.in_flight.extend(keys.iter().copied());
        Ok(())
    }

    /// Clears `key`. Returns `false` when it was not saving.
    pub fn end(&mut self, key: ItemKey) -> bool {
        self.in_flight.remove(&key)
    }

    pub fn end_all(&mut self, keys: &[ItemKey]) {
        for key in keys {
            self.in_flight.remove(key);
        }
    }

    pub fn is_saving(&self, key: ItemKey) -> bool {
        self.in_flight.contains(&key)
    }

    pub fn is_idle(&self) -> bool {
        self.in_flight.is_empty() && self.tier_changes.is_empty() && !self.reordering
    }

    /// Takes a structural hold. Returns `false` when a reorder is already
    /// held.
    pub fn hold(&mut self, hold: StructuralHold) -> bool {
        match hold {
            StructuralHold::TierChange(id) => self.tier_changes.insert(id),
            StructuralHold::Reorder => !std::mem::replace(&mut self.reordering, true),
        }
    }

    pub fn release(&mut self, hold: StructuralHold) {
        match hold {
            StructuralHold::TierChange(id) => {
                self.tier_changes.remove(&id);
            }
            StructuralHold::Reorder => self.reordering = false,
        }
    }

    /// First tier with a pending create or delete.
    pub fn pending_tier_change(&self) -> Option<TierId> {
        self.tier_changes.iter().next().copied()
    }

    pub fn is_reordering(&self) -> bool {
        self.reordering
    }

    pub fn len(&self) -> usize {
        self.in_flight.len()
    }

    pub fn is_empty(&self) -> bool {
        self.in_flight.is_empty()
    }

    pub fn keys(&self) -> &BTreeSet<ItemKey> {
        &self.in_flight
    }
}

#[cfg(test)]
mod tests {
    use super::{SaveStateTracker, StructuralHold};
    use crate::model::item::ItemKey;
    use crate::model::player::PlayerId;
    use crate::model::tier::TierId;

    #[test]
    fn second_begin_on_same_key_is_refused() {
        let mut tracker = SaveStateTracker::new();
        let key = ItemKey::Player(PlayerId(7));
        assert!(tracker.begin(key));
        assert!(!tracker.begin(key));
        assert!(tracker.begin(ItemKey::Player(PlayerId(8))));
        assert!(tracker.end(key));
        assert!(!tracker.end(key));
    }

    #[test]
    fn begin_all_is_atomic() {
        let mut tracker = SaveStateTracker::new();
        let busy = ItemKey::Player(PlayerId(2));
        tracker.begin(busy);

        let keys = [ItemKey::Player(PlayerId(1)), busy];
        assert_eq!(tracker.begin_all(&keys), Err(busy));
        assert!(!tracker.is_saving(ItemKey::Player(PlayerId(1))));
        assert_eq!(tracker.len(), 1);

        tracker.end(busy);
        tracker.begin_all(&keys).unwrap();
        tracker.end_all(&keys);
        assert!(tracker.is_idle());
    }

    #[test]
    fn structural_holds_keep_tracker_busy_until_released() {
        let mut tracker = SaveStateTracker::new();
        let tier = TierId::generate();

        assert!(tracker.hold(StructuralHold::TierChange(tier)));
        assert_eq!(tracker.pending_tier_change(), Some(tier));
        assert!(!tracker.is_idle());
        tracker.release(StructuralHold::TierChange(tier));
        assert_eq!(tracker.pending_tier_change(), None);

        assert!(tracker.hold(StructuralHold::Reorder));
        assert!(!tracker.hold(StructuralHold::Reorder));
        assert!(tracker.is_reordering());
        assert!(tracker.is_empty());
        tracker.release(StructuralHold::Reorder);
        assert!(tracker.is_idle());
    }
}
