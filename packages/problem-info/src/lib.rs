//! Cross-Context Problem Coordination Library
//!
//! Coordinates "get the current problem's title and description"
//! across execution contexts: a typed request/response channel with
//! timeout and one-shot remediation, a strategy-cascade extraction
//! source, a cache of the last successful extraction, and the
//! coordinator that ties them together with a live -> cache -> retry
//! fallback chain.
//!
//! # Design Philosophy
//!
//! - Misses are data, not errors: extraction and cache lookups return
//!   `None`; errors are reserved for environment faults.
//! - Closed, typed envelopes at the channel boundary - no duck-typed
//!   payloads.
//! - One response per request, correlated by id, with the timeout
//!   built into the send.
//! - Each target context processes serially; no shared-mutable state
//!   across in-flight calls.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use problem_info::{
//!     Channel, Coordinator, ExtractionTarget, MemoryStore, SnapshotExtractor, TargetId,
//! };
//! use problem_info::testing::NoopActivator;
//!
//! let channel = Arc::new(Channel::new());
//! let target = TargetId::from("content");
//! channel.register(target.clone(), ExtractionTarget::new(SnapshotExtractor::new(source)));
//!
//! let coordinator = Coordinator::new(
//!     channel,
//!     target,
//!     MemoryStore::new(),
//!     NoopActivator::new(),
//!     "https://example.com/problems/two-sum",
//! );
//! let record = coordinator.problem_info().await?;
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Core trait abstractions (Extractor, PageSource, ProblemCache, TargetActivator)
//! - [`types`] - Records, envelopes, and configuration
//! - [`channel`] - In-process request/response messaging
//! - [`extract`] - Strategy-cascade extraction source
//! - [`stores`] - Cache store implementations
//! - [`coordinator`] - The fallback-ordering orchestrator
//! - [`testing`] - Mock implementations for testing

pub mod channel;
pub mod coordinator;
pub mod error;
pub mod extract;
pub mod stores;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use channel::{Channel, RequestHandler, TargetId};
pub use coordinator::Coordinator;
pub use error::{ChannelError, CoordinationError, ExtractError, StoreError};
pub use extract::{
    default_strategies, ExtractionTarget, PatternStrategy, SnapshotExtractor, Strategy,
    VisibleTextStrategy,
};
pub use stores::MemoryStore;
pub use traits::{Extractor, PageSource, ProblemCache, TargetActivator};
pub use types::{
    config::{CoordinatorConfig, ExtractorConfig},
    envelope::{EnvelopeError, ErrorDetails, Request, RequestEnvelope, Response, ResultEnvelope},
    page::PageSnapshot,
    problem::{CacheEntry, PageKey, ProblemRecord},
};
