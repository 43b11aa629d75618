//! Configuration for the coordinator and the extraction source.

use std::time::Duration;

/// Timeout and retry budgets for the coordinator's fallback chain.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Budget for one extraction request over the channel. Default: 2s.
    pub extract_timeout: Duration,

    /// Budget for the reachability probe. Default: 500ms.
    pub probe_timeout: Duration,

    /// Delay before the single retry after a cache miss. Default: 1s.
    pub retry_delay: Duration,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            extract_timeout: Duration::from_millis(2000),
            probe_timeout: Duration::from_millis(500),
            retry_delay: Duration::from_millis(1000),
        }
    }
}

impl CoordinatorConfig {
    /// Create a config with default budgets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the extraction request timeout.
    pub fn with_extract_timeout(mut self, timeout: Duration) -> Self {
        self.extract_timeout = timeout;
        self
    }

    /// Set the reachability probe timeout.
    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// Set the delay before the fallback retry.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }
}

/// Tuning for the snapshot extractor.
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// How long to wait for late-loading content before the single
    /// re-read of the page. Default: 1s.
    pub settle_delay: Duration,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_millis(1000),
        }
    }
}

impl ExtractorConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the settle delay before the re-read.
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }
}
