//! Core trait abstractions (Extractor, PageSource, ProblemCache,
//! TargetActivator).

pub mod activator;
pub mod extractor;
pub mod store;

pub use activator::TargetActivator;
pub use extractor::{Extractor, PageSource};
pub use store::ProblemCache;
