//! Problem records and the page identity they are keyed by.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Normalized page identity used as the cache key.
///
/// Two URLs identify the same page when their normalized paths are
/// equal; scheme, host, query, and fragment are ignored so that
/// navigation noise does not invalidate the cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageKey(String);

impl PageKey {
    /// Derive a key from a URL. Falls back to treating the input as a
    /// bare path when it does not parse as an absolute URL.
    pub fn from_url(url: &str) -> Self {
        let path = match url::Url::parse(url) {
            Ok(parsed) => parsed.path().to_string(),
            Err(_) => url.split(['?', '#']).next().unwrap_or(url).to_string(),
        };
        Self::from_path(&path)
    }

    /// Build a key from an already-extracted path.
    pub fn from_path(path: &str) -> Self {
        let trimmed = path.trim_end_matches('/');
        if trimmed.is_empty() {
            Self("/".to_string())
        } else {
            Self(trimmed.to_string())
        }
    }

    /// The normalized path backing this key.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A successfully extracted problem.
///
/// Extraction is all-or-nothing: a record only exists when both title
/// and description are non-empty, which the constructor enforces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemRecord {
    /// Problem title
    pub title: String,

    /// Full problem description text
    pub description: String,

    /// URL of the page the record was extracted from
    pub source_url: String,

    /// When the record was captured
    pub captured_at: DateTime<Utc>,

    /// Whether the record was served from the cache rather than a
    /// live extraction
    #[serde(default)]
    pub from_cache: bool,
}

impl ProblemRecord {
    /// Create a record from extracted text. Returns `None` when either
    /// the title or the description is empty after trimming.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        source_url: impl Into<String>,
    ) -> Option<Self> {
        let title = title.into().trim().to_string();
        let description = description.into().trim().to_string();

        if title.is_empty() || description.is_empty() {
            return None;
        }

        Some(Self {
            title,
            description,
            source_url: source_url.into(),
            captured_at: Utc::now(),
            from_cache: false,
        })
    }

    /// Set the capture timestamp.
    pub fn with_captured_at(mut self, captured_at: DateTime<Utc>) -> Self {
        self.captured_at = captured_at;
        self
    }

    /// Tag the record as served from the cache.
    pub fn mark_cached(mut self) -> Self {
        self.from_cache = true;
        self
    }

    /// Cache key for the page this record came from.
    pub fn page_key(&self) -> PageKey {
        PageKey::from_url(&self.source_url)
    }

    /// Check if the record is older than the given threshold.
    pub fn is_stale(&self, max_age: chrono::Duration) -> bool {
        Utc::now() - self.captured_at > max_age
    }
}

/// A cache slot entry: the record plus the key it was stored under.
///
/// Owned exclusively by the cache store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Key derived from the record's source URL
    pub key: PageKey,

    /// The cached record
    pub record: ProblemRecord,

    /// When the entry was written
    pub stored_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Create an entry keyed by the record's own page identity.
    pub fn new(record: ProblemRecord) -> Self {
        Self {
            key: record.page_key(),
            record,
            stored_at: Utc::now(),
        }
    }

    /// Check whether this entry belongs to the requested page.
    pub fn matches(&self, key: &PageKey) -> bool {
        self.key == *key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_requires_title_and_description() {
        assert!(ProblemRecord::new("Two Sum", "Given an array...", "u").is_some());
        assert!(ProblemRecord::new("", "Given an array...", "u").is_none());
        assert!(ProblemRecord::new("Two Sum", "", "u").is_none());
        assert!(ProblemRecord::new("   ", "\n\t", "u").is_none());
    }

    #[test]
    fn test_record_trims_whitespace() {
        let record = ProblemRecord::new("  Two Sum \n", " body ", "u").unwrap();
        assert_eq!(record.title, "Two Sum");
        assert_eq!(record.description, "body");
        assert!(!record.from_cache);
    }

    #[test]
    fn test_page_key_normalization() {
        let a = PageKey::from_url("https://example.com/problems/two-sum/");
        let b = PageKey::from_url("http://example.com/problems/two-sum?tab=description");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "/problems/two-sum");

        // Non-URL input is treated as a bare path
        let c = PageKey::from_url("/problems/two-sum");
        assert_eq!(a, c);
    }

    #[test]
    fn test_page_key_root() {
        assert_eq!(PageKey::from_url("https://example.com/").as_str(), "/");
        assert_eq!(PageKey::from_path("").as_str(), "/");
    }

    #[test]
    fn test_cache_entry_matches() {
        let record =
            ProblemRecord::new("Two Sum", "desc", "https://example.com/problems/two-sum").unwrap();
        let entry = CacheEntry::new(record);

        assert!(entry.matches(&PageKey::from_path("/problems/two-sum")));
        assert!(!entry.matches(&PageKey::from_path("/problems/three-sum")));
    }

    #[test]
    fn test_is_stale() {
        let record = ProblemRecord::new("T", "d", "u")
            .unwrap()
            .with_captured_at(Utc::now() - chrono::Duration::minutes(10));

        assert!(record.is_stale(chrono::Duration::minutes(5)));
        assert!(!record.is_stale(chrono::Duration::hours(1)));
    }
}
