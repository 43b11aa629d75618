//! Cache store trait for extracted problem records.

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::types::problem::{CacheEntry, PageKey, ProblemRecord};

/// Cache for the last successfully extracted problem record.
///
/// Implementations own their entries exclusively. `get` must return an
/// entry only when its key matches the requested key exactly - a record
/// cached for a different page is a miss, never a stale hit.
#[async_trait]
pub trait ProblemCache: Send + Sync {
    /// Look up the entry for a page, if one matches exactly.
    async fn get(&self, key: &PageKey) -> StoreResult<Option<CacheEntry>>;

    /// Store a record, unconditionally replacing any previous entry
    /// (last-write-wins).
    async fn put(&self, record: ProblemRecord) -> StoreResult<()>;

    /// Drop the entry for a page if one is present.
    async fn invalidate(&self, key: &PageKey) -> StoreResult<()>;
}

#[async_trait]
impl<T: ProblemCache + ?Sized> ProblemCache for std::sync::Arc<T> {
    async fn get(&self, key: &PageKey) -> StoreResult<Option<CacheEntry>> {
        (**self).get(key).await
    }

    async fn put(&self, record: ProblemRecord) -> StoreResult<()> {
        (**self).put(record).await
    }

    async fn invalidate(&self, key: &PageKey) -> StoreResult<()> {
        (**self).invalidate(key).await
    }
}
