//! Concurrent registry of tracked positions.
//!
//! Shared by three loop classes: the two discovery paths insert, the health
//! monitor reads and updates. Backed by a `DashMap`, so insert-if-absent and
//! enumeration are safe under concurrent writers; per-address entries are
//! unique by construction.

use alloy::primitives::Address;
use dashmap::DashMap;

use crate::position::TrackedPosition;

/// Concurrent address -> position map.
#[derive(Default)]
pub struct PositionRegistry {
    positions: DashMap<Address, TrackedPosition>,
}

impl PositionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            positions: DashMap::new(),
        }
    }

    /// Insert a fresh position unless the address is already tracked.
    /// Returns true if a new entry was created.
    pub fn insert_if_absent(&self, user: Address) -> bool {
        let mut inserted = false;
        self.positions.entry(user).or_insert_with(|| {
            inserted = true;
            TrackedPosition::new(user)
        });
        inserted
    }

    /// Read a snapshot of one position.
    pub fn get(&self, user: &Address) -> Option<TrackedPosition> {
        self.positions.get(user).map(|p| p.clone())
    }

    /// Apply a mutation to a tracked position, if present.
    pub fn update(&self, user: &Address, f: impl FnOnce(&mut TrackedPosition)) {
        if let Some(mut entry) = self.positions.get_mut(user) {
            f(entry.value_mut());
        }
    }

    /// Whether an address is tracked.
    pub fn contains(&self, user: &Address) -> bool {
        self.positions.contains_key(user)
    }

    /// Number of tracked addresses.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// True when nothing is tracked yet.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Snapshot of all tracked addresses.
    ///
    /// Taken per monitoring round so the per-address pass iterates a stable
    /// set while discovery keeps inserting.
    pub fn addresses(&self) -> Vec<Address> {
        self.positions.iter().map(|e| *e.key()).collect()
    }
}
