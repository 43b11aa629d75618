//! The fallback-ordering orchestrator: live extraction, then cache,
//! then one delayed retry.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::channel::{Channel, TargetId};
use crate::error::{CoordinationError, Result};
use crate::traits::{activator::TargetActivator, store::ProblemCache};
use crate::types::{
    config::CoordinatorConfig,
    envelope::{Request, Response},
    problem::{PageKey, ProblemRecord},
};

/// Orchestrates "get the current problem info" across the extraction
/// target and the cache store.
///
/// The chain is: live extraction (bounded timeout, one unreachable
/// remediation) -> cache lookup for the current page -> one delayed
/// retry of the live extraction -> `NoProblemInfo`. A timed-out
/// extraction is not cancelled; its result settles in the worker and
/// is discarded.
pub struct Coordinator<C, A> {
    channel: Arc<Channel>,
    target: TargetId,
    cache: C,
    activator: A,
    page_url: String,
    config: CoordinatorConfig,
}

impl<C, A> Coordinator<C, A>
where
    C: ProblemCache,
    A: TargetActivator,
{
    /// Create a coordinator for the given page.
    pub fn new(
        channel: Arc<Channel>,
        target: TargetId,
        cache: C,
        activator: A,
        page_url: impl Into<String>,
    ) -> Self {
        Self {
            channel,
            target,
            cache,
            activator,
            page_url: page_url.into(),
            config: CoordinatorConfig::default(),
        }
    }

    /// Set the timeout/retry budgets.
    pub fn with_config(mut self, config: CoordinatorConfig) -> Self {
        self.config = config;
        self
    }

    /// The page this coordinator serves.
    pub fn page_url(&self) -> &str {
        &self.page_url
    }

    fn page_key(&self) -> PageKey {
        PageKey::from_url(&self.page_url)
    }

    /// Get the current problem, live if possible, cached otherwise.
    ///
    /// Fails with [`CoordinationError::NoProblemInfo`] only when live
    /// extraction, the cache, and the delayed retry all miss.
    pub async fn problem_info(&self) -> Result<ProblemRecord> {
        let key = self.page_key();
        debug!(page = %key, "problem info requested");

        // 1. Reachability probe, remediating once. A failure here is
        // not fatal: the extraction attempt gets its own remediation
        // and the cache path remains.
        if !self.ensure_reachable().await {
            warn!(target = %self.target, "extraction target unreachable after remediation");
        }

        // 2-3. Live extraction; persist on success.
        if let Some(record) = self.try_extract().await {
            self.persist(&record).await;
            info!(page = %key, title = %record.title, "problem info extracted live");
            return Ok(record);
        }

        // 4. Cache fallback, exact key match only.
        match self.cache.get(&key).await {
            Ok(Some(entry)) => {
                info!(page = %key, stored_at = %entry.stored_at, "serving problem info from cache");
                return Ok(entry.record.mark_cached());
            }
            Ok(None) => debug!(page = %key, "no cached entry for page"),
            Err(e) => warn!(page = %key, error = %e, "cache read failed, treating as miss"),
        }

        // 5. One delayed retry, then give up.
        debug!(
            page = %key,
            delay_ms = self.config.retry_delay.as_millis() as u64,
            "retrying extraction after delay"
        );
        tokio::time::sleep(self.config.retry_delay).await;

        if let Some(record) = self.try_extract().await {
            self.persist(&record).await;
            info!(page = %key, title = %record.title, "problem info extracted on retry");
            return Ok(record);
        }

        warn!(page = %key, "no problem info from extraction or cache");
        Err(CoordinationError::NoProblemInfo {
            page: self.page_url.clone(),
        })
    }

    /// Drop the current page's cache entry and re-run the full flow.
    ///
    /// Used for an explicit user-triggered refresh; a storage fault
    /// here is surfaced rather than absorbed, since the caller asked
    /// for the invalidation.
    pub async fn refresh(&self) -> Result<ProblemRecord> {
        let key = self.page_key();
        debug!(page = %key, "refresh requested, invalidating cache");
        self.cache.invalidate(&key).await?;
        self.problem_info().await
    }

    async fn ensure_reachable(&self) -> bool {
        let result = self
            .channel
            .send_with_remediation(
                &self.target,
                Request::Ping,
                self.config.probe_timeout,
                &self.activator,
            )
            .await;

        match result {
            Ok(envelope) => matches!(envelope.into_outcome(), Ok(Response::Pong)),
            Err(e) => {
                debug!(target = %self.target, error = %e, "reachability probe failed");
                false
            }
        }
    }

    async fn try_extract(&self) -> Option<ProblemRecord> {
        let result = self
            .channel
            .send_with_remediation(
                &self.target,
                Request::ExtractProblem,
                self.config.extract_timeout,
                &self.activator,
            )
            .await;

        match result {
            Ok(envelope) => match envelope.into_outcome() {
                Ok(Response::Problem { record }) => Some(record),
                Ok(other) => {
                    warn!(target = %self.target, response = ?other, "unexpected response to extract request");
                    None
                }
                Err(reported) => {
                    debug!(target = %self.target, message = %reported.message, "extraction reported failure");
                    None
                }
            },
            Err(e) => {
                debug!(target = %self.target, error = %e, "extract request failed");
                None
            }
        }
    }

    async fn persist(&self, record: &ProblemRecord) {
        // A failed cache write must not discard a fresh record.
        if let Err(e) = self.cache.put(record.clone()).await {
            warn!(page = %record.page_key(), error = %e, "failed to cache extracted record");
        }
    }
}
