//! Extraction source traits.

use async_trait::async_trait;

use crate::error::ExtractResult;
use crate::types::{page::PageSnapshot, problem::ProblemRecord};

/// A source of extracted problem records.
///
/// `Ok(None)` means "no problem found" after all strategies and the
/// single retry are exhausted; errors are reserved for environment
/// faults (e.g. the page source is gone).
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Extract the current page's problem, if any.
    async fn extract(&self) -> ExtractResult<Option<ProblemRecord>>;
}

/// Supplies the current rendered content of the active page.
///
/// The extractor re-reads the source after its settle wait, so a
/// source should always return the freshest view it has.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Take a snapshot of the page as currently rendered.
    async fn snapshot(&self) -> ExtractResult<PageSnapshot>;
}
