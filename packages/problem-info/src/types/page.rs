//! Page snapshot type - the rendered content an extractor works on.

/// A point-in-time view of a page's rendered content.
///
/// Produced by a [`PageSource`](crate::traits::PageSource); the
/// extractor may ask for a second snapshot after its settle wait, since
/// content can load after the initial read.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSnapshot {
    /// URL of the page the snapshot was taken from
    pub url: String,

    /// Rendered HTML content
    pub html: String,
}

impl PageSnapshot {
    /// Create a snapshot.
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            html: html.into(),
        }
    }
}
