//! Typed errors for the coordination library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling. "Not found" is never an
//! error here: extraction and cache lookups report misses as `None`.

use thiserror::Error;

/// Errors crossing the messaging channel boundary.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// No response arrived within the timeout budget.
    #[error("no response from target `{target}` within {timeout_ms}ms")]
    Timeout { target: String, timeout_ms: u64 },

    /// The target context is not registered or its worker has stopped.
    #[error("target `{target}` is not reachable")]
    Unreachable { target: String },

    /// The target dropped the reply without answering.
    #[error("target `{target}` closed the reply channel")]
    Closed { target: String },

    /// Remediation (activating the target) failed.
    #[error("failed to activate target `{target}`: {reason}")]
    Activation { target: String, reason: String },
}

/// Errors from an extraction source.
///
/// Reserved for genuine environment faults. "No problem found on the
/// page" is `Ok(None)`, not an error.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The page source could not produce a snapshot.
    #[error("page source unavailable: {0}")]
    SourceUnavailable(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A caller-supplied strategy pattern failed to compile.
    #[error("invalid strategy pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// A cache store operation failed.
#[derive(Debug, Error)]
#[error("storage error: {0}")]
pub struct StoreError(#[source] pub Box<dyn std::error::Error + Send + Sync>);

impl StoreError {
    /// Wrap an underlying storage failure.
    pub fn new(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self(Box::new(source))
    }
}

/// Errors surfaced at the coordinator boundary.
///
/// Channel and extraction failures are absorbed into the fallback chain
/// (live -> cache -> delayed retry); only exhaustion of all tiers and
/// explicit storage faults escape.
#[derive(Debug, Error)]
pub enum CoordinationError {
    /// Live extraction, the cache, and the delayed retry all missed.
    #[error("no problem information available for {page}")]
    NoProblemInfo { page: String },

    /// Cache storage failed outside the fallback path.
    #[error(transparent)]
    Storage(#[from] StoreError),
}

/// Result type alias for coordinator operations.
pub type Result<T> = std::result::Result<T, CoordinationError>;

/// Result type alias for channel operations.
pub type ChannelResult<T> = std::result::Result<T, ChannelError>;

/// Result type alias for extraction operations.
pub type ExtractResult<T> = std::result::Result<T, ExtractError>;

/// Result type alias for cache store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
