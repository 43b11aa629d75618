//! Data types for records, envelopes, and configuration.

pub mod config;
pub mod envelope;
pub mod page;
pub mod problem;

pub use config::{CoordinatorConfig, ExtractorConfig};
pub use envelope::{
    EnvelopeError, ErrorDetails, Request, RequestEnvelope, Response, ResultEnvelope,
};
pub use page::PageSnapshot;
pub use problem::{CacheEntry, PageKey, ProblemRecord};
