//! Priority-ordered extraction strategies over a page snapshot.
//!
//! Each strategy independently attempts to produce both a title and a
//! description; the extractor walks the list in order and takes the
//! first complete result. Patterns here are deliberately generic -
//! site-specific selector tuning is an application concern.

use regex::Regex;

use crate::error::ExtractResult;
use crate::types::page::PageSnapshot;

/// Default minimum visible-text length for the loose fallback to
/// accept a description.
pub const DEFAULT_MIN_FALLBACK_LEN: usize = 100;

/// One way of reading a title/description pair out of a snapshot.
pub trait Strategy: Send + Sync {
    /// Strategy name, for logging.
    fn name(&self) -> &str;

    /// Attempt extraction. `None` when this strategy cannot produce
    /// both a non-empty title and description.
    fn apply(&self, snapshot: &PageSnapshot) -> Option<(String, String)>;
}

/// Strategy driven by a title pattern and a description pattern.
///
/// Each pattern's first capture group is taken, stripped of markup,
/// and whitespace-normalized.
pub struct PatternStrategy {
    name: String,
    title: Regex,
    description: Regex,
    min_description_len: usize,
}

impl PatternStrategy {
    /// Compile a strategy from caller-supplied patterns.
    pub fn new(
        name: impl Into<String>,
        title_pattern: &str,
        description_pattern: &str,
    ) -> ExtractResult<Self> {
        Ok(Self {
            name: name.into(),
            title: Regex::new(title_pattern)?,
            description: Regex::new(description_pattern)?,
            min_description_len: 1,
        })
    }

    /// Require a minimum description length.
    pub fn with_min_description_len(mut self, len: usize) -> Self {
        self.min_description_len = len;
        self
    }
}

impl Strategy for PatternStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, snapshot: &PageSnapshot) -> Option<(String, String)> {
        let title = first_capture(&self.title, &snapshot.html)?;
        let description = first_capture(&self.description, &snapshot.html)?;

        let title = clean_text(&strip_tags(&title));
        let description = clean_text(&strip_tags(&description));

        if title.is_empty() || description.len() < self.min_description_len {
            return None;
        }
        Some((title, description))
    }
}

/// Loose fallback: document title plus the whole visible body text.
///
/// Only accepts pages with a reasonable amount of text, so an empty
/// shell that has not rendered yet reads as "not found" rather than a
/// junk record.
pub struct VisibleTextStrategy {
    min_len: usize,
}

impl Default for VisibleTextStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl VisibleTextStrategy {
    /// Create the fallback with the default length guard.
    pub fn new() -> Self {
        Self {
            min_len: DEFAULT_MIN_FALLBACK_LEN,
        }
    }

    /// Set the minimum accepted description length.
    pub fn with_min_len(mut self, min_len: usize) -> Self {
        self.min_len = min_len;
        self
    }
}

impl Strategy for VisibleTextStrategy {
    fn name(&self) -> &str {
        "visible-text"
    }

    fn apply(&self, snapshot: &PageSnapshot) -> Option<(String, String)> {
        let title_pattern = Regex::new(r"(?is)<title[^>]*>(.*?)</title>").unwrap();
        let title = clean_text(&first_capture(&title_pattern, &snapshot.html)?);

        let body = clean_text(&strip_tags(&snapshot.html));
        // The stripped body still contains the title text; that is fine
        // for a last-resort description.
        if title.is_empty() || body.len() < self.min_len {
            return None;
        }
        Some((title, body))
    }
}

/// The built-in strategy list, in priority order.
pub fn default_strategies() -> Vec<Box<dyn Strategy>> {
    vec![
        Box::new(
            PatternStrategy::new(
                "article",
                r"(?is)<h1[^>]*>(.*?)</h1>",
                r"(?is)<article[^>]*>(.*?)</article>",
            )
            .expect("built-in pattern"),
        ),
        Box::new(
            PatternStrategy::new(
                "meta-description",
                r"(?is)<title[^>]*>(.*?)</title>",
                r#"(?is)<meta\s+name="description"\s+content="([^"]*)""#,
            )
            .expect("built-in pattern"),
        ),
        Box::new(VisibleTextStrategy::new()),
    ]
}

fn first_capture(pattern: &Regex, html: &str) -> Option<String> {
    pattern
        .captures(html)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().to_string())
}

/// Remove script/style blocks and markup, then decode common entities.
pub fn strip_tags(html: &str) -> String {
    let script_pattern = Regex::new(r"(?is)<script[^>]*>.*?</script>").unwrap();
    let style_pattern = Regex::new(r"(?is)<style[^>]*>.*?</style>").unwrap();
    let tag_pattern = Regex::new(r"<[^>]+>").unwrap();

    let text = script_pattern.replace_all(html, " ");
    let text = style_pattern.replace_all(&text, " ");
    let text = tag_pattern.replace_all(&text, " ");

    text.replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
}

/// Collapse all whitespace runs to single spaces and trim.
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
