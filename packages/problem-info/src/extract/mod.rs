//! Extraction source - strategy cascade over page snapshots.

pub mod strategies;

pub use strategies::{
    clean_text, default_strategies, strip_tags, PatternStrategy, Strategy, VisibleTextStrategy,
    DEFAULT_MIN_FALLBACK_LEN,
};

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::channel::RequestHandler;
use crate::error::ExtractResult;
use crate::traits::extractor::{Extractor, PageSource};
use crate::types::{
    config::ExtractorConfig,
    envelope::{EnvelopeError, ErrorDetails, Request, Response},
    page::PageSnapshot,
    problem::ProblemRecord,
};

/// Extractor that runs a fixed strategy list over page snapshots.
///
/// Tries every strategy in priority order; if none yields a complete
/// record, waits once for late-loading content (the settle delay),
/// re-reads the page, and tries the same list a single further time.
pub struct SnapshotExtractor<P> {
    source: P,
    strategies: Vec<Box<dyn Strategy>>,
    config: ExtractorConfig,
}

impl<P: PageSource> SnapshotExtractor<P> {
    /// Create an extractor with the built-in strategy list.
    pub fn new(source: P) -> Self {
        Self {
            source,
            strategies: default_strategies(),
            config: ExtractorConfig::default(),
        }
    }

    /// Replace the strategy list.
    pub fn with_strategies(mut self, strategies: Vec<Box<dyn Strategy>>) -> Self {
        self.strategies = strategies;
        self
    }

    /// Set the extractor config.
    pub fn with_config(mut self, config: ExtractorConfig) -> Self {
        self.config = config;
        self
    }

    fn run_strategies(&self, snapshot: &PageSnapshot) -> Option<ProblemRecord> {
        for strategy in &self.strategies {
            if let Some((title, description)) = strategy.apply(snapshot) {
                if let Some(record) = ProblemRecord::new(title, description, &snapshot.url) {
                    debug!(
                        strategy = strategy.name(),
                        url = %snapshot.url,
                        title = %record.title,
                        description_len = record.description.len(),
                        "extraction strategy matched"
                    );
                    return Some(record);
                }
            }
        }
        None
    }
}

#[async_trait]
impl<P: PageSource> Extractor for SnapshotExtractor<P> {
    async fn extract(&self) -> ExtractResult<Option<ProblemRecord>> {
        let snapshot = self.source.snapshot().await?;
        if let Some(record) = self.run_strategies(&snapshot) {
            return Ok(Some(record));
        }

        // Content may not have rendered yet; wait once and re-read.
        debug!(
            url = %snapshot.url,
            settle_ms = self.config.settle_delay.as_millis() as u64,
            "no strategy matched, waiting for content to settle"
        );
        tokio::time::sleep(self.config.settle_delay).await;

        let snapshot = self.source.snapshot().await?;
        Ok(self.run_strategies(&snapshot))
    }
}

/// Channel handler exposing an extractor as a target context.
///
/// Answers `Ping` with `Pong` and `ExtractProblem` with the extracted
/// record; a miss or an extraction fault becomes a failure envelope,
/// never a crash.
pub struct ExtractionTarget<E> {
    extractor: E,
}

impl<E> ExtractionTarget<E> {
    /// Wrap an extractor.
    pub fn new(extractor: E) -> Self {
        Self { extractor }
    }
}

#[async_trait]
impl<E: Extractor + 'static> RequestHandler for ExtractionTarget<E> {
    async fn handle(&self, request: Request) -> std::result::Result<Response, EnvelopeError> {
        match request {
            Request::Ping => Ok(Response::Pong),
            Request::ExtractProblem => match self.extractor.extract().await {
                Ok(Some(record)) => Ok(Response::Problem { record }),
                Ok(None) => Err(EnvelopeError::new("could not extract problem information")),
                Err(e) => {
                    warn!(error = %e, "extraction fault");
                    Err(EnvelopeError::new("extraction failed").with_details(
                        ErrorDetails::new().with_context("cause", e.to_string()),
                    ))
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockPageSource;
    use std::time::Duration;

    const PROBLEM_PAGE: &str = r"
        <html><body>
        <h1>Two Sum</h1>
        <article>Given an array of integers, return indices of the two
        numbers such that they add up to a target.</article>
        </body></html>
    ";

    const EMPTY_SHELL: &str =
        "<html><head><title>Loading</title></head><body><div id=app></div></body></html>";

    #[tokio::test]
    async fn test_extracts_on_first_read() {
        let source = MockPageSource::new().with_snapshot(PageSnapshot::new(
            "https://example.com/problems/two-sum",
            PROBLEM_PAGE,
        ));
        let extractor = SnapshotExtractor::new(source.clone());

        let record = extractor.extract().await.unwrap().unwrap();
        assert_eq!(record.title, "Two Sum");
        assert!(record.description.starts_with("Given an array"));
        assert_eq!(source.snapshots_taken(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_once_after_settle_delay() {
        // First read sees an unrendered shell, second sees the content.
        let source = MockPageSource::new()
            .with_snapshot(PageSnapshot::new("https://e.com/p/two-sum", EMPTY_SHELL))
            .with_snapshot(PageSnapshot::new("https://e.com/p/two-sum", PROBLEM_PAGE));
        let extractor = SnapshotExtractor::new(source.clone());

        let record = extractor.extract().await.unwrap().unwrap();
        assert_eq!(record.title, "Two Sum");
        assert_eq!(source.snapshots_taken(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_returns_none_when_all_strategies_miss() {
        let source = MockPageSource::new()
            .with_snapshot(PageSnapshot::new("https://e.com/p/x", EMPTY_SHELL));
        let extractor = SnapshotExtractor::new(source.clone());

        assert!(extractor.extract().await.unwrap().is_none());
        // Initial read plus exactly one retry.
        assert_eq!(source.snapshots_taken(), 2);
    }

    #[tokio::test]
    async fn test_source_fault_propagates() {
        let source = MockPageSource::new(); // no snapshots scripted
        let extractor = SnapshotExtractor::new(source);

        assert!(extractor.extract().await.is_err());
    }

    #[tokio::test]
    async fn test_custom_strategy_priority() {
        let html = r#"
            <html><head><title>Doc Title</title>
            <meta name="description" content="Meta text that is long enough.">
            </head><body><h1>Heading</h1><article>Article body text.</article></body></html>
        "#;
        let source = MockPageSource::new()
            .with_snapshot(PageSnapshot::new("https://e.com/p/x", html));

        // Meta strategy first: it should win over the article strategy.
        let extractor = SnapshotExtractor::new(source).with_strategies(vec![
            Box::new(
                PatternStrategy::new(
                    "meta-first",
                    r"(?is)<title[^>]*>(.*?)</title>",
                    r#"(?is)<meta\s+name="description"\s+content="([^"]*)""#,
                )
                .unwrap(),
            ),
            Box::new(VisibleTextStrategy::new()),
        ]);

        let record = extractor.extract().await.unwrap().unwrap();
        assert_eq!(record.title, "Doc Title");
        assert_eq!(record.description, "Meta text that is long enough.");
    }

    #[tokio::test]
    async fn test_target_answers_ping_and_extract() {
        let source = MockPageSource::new().with_snapshot(PageSnapshot::new(
            "https://example.com/problems/two-sum",
            PROBLEM_PAGE,
        ));
        let target = ExtractionTarget::new(SnapshotExtractor::new(source));

        assert_eq!(target.handle(Request::Ping).await.unwrap(), Response::Pong);
        match target.handle(Request::ExtractProblem).await.unwrap() {
            Response::Problem { record } => assert_eq!(record.title, "Two Sum"),
            other => panic!("unexpected response: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_target_reports_miss_as_failure_envelope() {
        let source = MockPageSource::new()
            .with_snapshot(PageSnapshot::new("https://e.com/p/x", EMPTY_SHELL));
        let target = ExtractionTarget::new(SnapshotExtractor::new(source));

        let err = target.handle(Request::ExtractProblem).await.unwrap_err();
        assert!(err.message.contains("could not extract"));
    }
}
