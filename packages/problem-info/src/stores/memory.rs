//! In-memory cache store.

use async_trait::async_trait;
use std::sync::RwLock;

use crate::error::StoreResult;
use crate::traits::store::ProblemCache;
use crate::types::problem::{CacheEntry, PageKey, ProblemRecord};

/// Single-slot in-memory cache.
///
/// Only the current page's record ever matters, so the store holds one
/// entry and `put` replaces it unconditionally. A lookup for any other
/// page key is a miss. Not durable across restarts; durability is a
/// non-goal here.
pub struct MemoryStore {
    slot: RwLock<Option<CacheEntry>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            slot: RwLock::new(None),
        }
    }

    /// Whether the store currently holds an entry.
    pub fn is_empty(&self) -> bool {
        self.slot.read().unwrap().is_none()
    }

    /// Key of the current entry, if any.
    pub fn current_key(&self) -> Option<PageKey> {
        self.slot.read().unwrap().as_ref().map(|e| e.key.clone())
    }

    /// Drop whatever is stored.
    pub fn clear(&self) {
        *self.slot.write().unwrap() = None;
    }
}

#[async_trait]
impl ProblemCache for MemoryStore {
    async fn get(&self, key: &PageKey) -> StoreResult<Option<CacheEntry>> {
        Ok(self
            .slot
            .read()
            .unwrap()
            .as_ref()
            .filter(|entry| entry.matches(key))
            .cloned())
    }

    async fn put(&self, record: ProblemRecord) -> StoreResult<()> {
        *self.slot.write().unwrap() = Some(CacheEntry::new(record));
        Ok(())
    }

    async fn invalidate(&self, key: &PageKey) -> StoreResult<()> {
        let mut slot = self.slot.write().unwrap();
        if slot.as_ref().is_some_and(|entry| entry.matches(key)) {
            *slot = None;
        }
        Ok(())
    }
}
