use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::*;

/// Identity of one reusable prototype. Strongly typed so pool lookups can
/// never drift out of sync with a display name.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PoolKey {
    BombTile,
    EmptyTile,
    DiamondTile,
    Cover,
    HintBurst,
    ExplosionBurst,
}

impl PoolKey {
    /// Pool key for the tile prototype matching a cell value's sign.
    pub const fn for_tile_value(value: TileValue) -> Self {
        if value < 0 {
            Self::BombTile
        } else if value == 0 {
            Self::EmptyTile
        } else {
            Self::DiamondTile
        }
    }
}

/// Borrowed pool entry. Only the pool can mint these; callers hold them
/// while the underlying object is in use and must release each exactly once.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Handle {
    key: PoolKey,
    slot: usize,
}

impl Handle {
    pub const fn key(&self) -> PoolKey {
        self.key
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ReleaseOutcome {
    /// Handle went back to its pool.
    Returned,
    /// The slot was already pooled; the extra release was rejected.
    AlreadyPooled,
    /// No pool was ever registered for the handle's key; bookkeeping
    /// discards it.
    Unregistered,
}

impl ReleaseOutcome {
    pub const fn was_returned(self) -> bool {
        matches!(self, Self::Returned)
    }
}

#[derive(Clone, Debug, Default)]
struct Bucket {
    // One flag per instantiated object; true while borrowed.
    active: Vec<bool>,
    preallocated: usize,
}

impl Bucket {
    fn idle_slot(&self) -> Option<usize> {
        self.active.iter().position(|&active| !active)
    }
}

/// Keyed pool of reusable handles. Preallocation is a soft floor: an
/// exhausted pool grows by one object per acquire instead of failing.
#[derive(Clone, Debug, Default)]
pub struct HandlePool {
    buckets: HashMap<PoolKey, Bucket>,
}

impl HandlePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `key` and instantiates `count` idle entries up front.
    /// Registering the same key twice is a configuration error: logged,
    /// second definition ignored.
    pub fn preallocate(&mut self, key: PoolKey, count: usize) {
        if self.buckets.contains_key(&key) {
            log::warn!("Pool already contains a bucket for {:?}", key);
            return;
        }
        self.buckets.insert(
            key,
            Bucket {
                active: vec![false; count],
                preallocated: count,
            },
        );
    }

    /// Borrows an idle handle for `key`, growing the pool when none is
    /// available.
    pub fn acquire(&mut self, key: PoolKey) -> Result<Handle> {
        let bucket = self
            .buckets
            .get_mut(&key)
            .ok_or(GameError::UnknownKey(key))?;

        let slot = match bucket.idle_slot() {
            Some(slot) => slot,
            None => {
                bucket.active.push(false);
                log::debug!(
                    "Pool for {:?} grew to {} entries",
                    key,
                    bucket.active.len()
                );
                bucket.active.len() - 1
            }
        };
        bucket.active[slot] = true;
        Ok(Handle { key, slot })
    }

    /// Deactivates `handle` and returns it to its bucket. Misuse is
    /// reported and ignored; the simulation must keep running.
    pub fn release(&mut self, handle: Handle) -> ReleaseOutcome {
        let Some(bucket) = self.buckets.get_mut(&handle.key) else {
            log::warn!(
                "Tried to return a handle for unregistered {:?}",
                handle.key
            );
            return ReleaseOutcome::Unregistered;
        };

        match bucket.active.get_mut(handle.slot) {
            Some(active) if *active => {
                *active = false;
                ReleaseOutcome::Returned
            }
            _ => {
                log::warn!("Double release of {:?} slot {}", handle.key, handle.slot);
                ReleaseOutcome::AlreadyPooled
            }
        }
    }

    pub fn active_count(&self, key: PoolKey) -> usize {
        self.buckets
            .get(&key)
            .map(|bucket| bucket.active.iter().filter(|&&active| active).count())
            .unwrap_or(0)
    }

    pub fn idle_count(&self, key: PoolKey) -> usize {
        self.total_count(key) - self.active_count(key)
    }

    /// Preallocated count plus net growth.
    pub fn total_count(&self, key: PoolKey) -> usize {
        self.buckets
            .get(&key)
            .map(|bucket| bucket.active.len())
            .unwrap_or(0)
    }

    pub fn growth(&self, key: PoolKey) -> usize {
        self.buckets
            .get(&key)
            .map(|bucket| bucket.active.len() - bucket.preallocated)
            .unwrap_or(0)
    }
}
