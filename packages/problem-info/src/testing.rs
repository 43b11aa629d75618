//! Testing utilities including mock implementations.
//!
//! These are useful for testing applications that use the coordination
//! library without a real page or target context. All mocks are cheap
//! to clone and share their state, so a test can keep a handle for
//! assertions after handing the mock to a coordinator or target.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::channel::{Channel, RequestHandler, TargetId};
use crate::error::{ChannelError, ChannelResult, ExtractError, ExtractResult};
use crate::traits::{
    activator::TargetActivator,
    extractor::{Extractor, PageSource},
};
use crate::types::{page::PageSnapshot, problem::ProblemRecord};

/// Shorthand for a valid record in tests.
pub fn sample_record(path: &str) -> ProblemRecord {
    ProblemRecord::new(
        "Two Sum",
        "Given an array of integers, return indices of the two numbers \
         such that they add up to a target.",
        format!("https://example.com{path}"),
    )
    .expect("sample record fields are non-empty")
}

enum ScriptedExtract {
    Found(ProblemRecord),
    NotFound,
    Fault(String),
}

/// A mock extractor replaying a scripted sequence of outcomes.
///
/// Outcomes are consumed in order; once the script is exhausted every
/// further call reports "not found". An optional latency is applied to
/// each call, for timeout-path tests.
#[derive(Clone, Default)]
pub struct MockExtractor {
    script: Arc<Mutex<VecDeque<ScriptedExtract>>>,
    latency: Option<Duration>,
    calls: Arc<AtomicUsize>,
}

impl MockExtractor {
    /// Create a mock that always reports "not found".
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful extraction.
    pub fn then_found(self, record: ProblemRecord) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(ScriptedExtract::Found(record));
        self
    }

    /// Queue a "not found" outcome.
    pub fn then_not_found(self) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(ScriptedExtract::NotFound);
        self
    }

    /// Queue an environment fault.
    pub fn then_fault(self, reason: impl Into<String>) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(ScriptedExtract::Fault(reason.into()));
        self
    }

    /// Apply a fixed delay to every call.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// How many times `extract` was called.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Extractor for MockExtractor {
    async fn extract(&self) -> ExtractResult<Option<ProblemRecord>> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let scripted = self.script.lock().unwrap().pop_front();
        match scripted {
            Some(ScriptedExtract::Found(record)) => Ok(Some(record)),
            Some(ScriptedExtract::NotFound) | None => Ok(None),
            Some(ScriptedExtract::Fault(reason)) => {
                Err(ExtractError::SourceUnavailable(reason.into()))
            }
        }
    }
}

/// A mock page source replaying scripted snapshots.
///
/// Snapshots are consumed in order; the last one is kept and repeated
/// once the script runs down to it. With no snapshots at all, the
/// source reports an environment fault.
#[derive(Clone, Default)]
pub struct MockPageSource {
    snapshots: Arc<Mutex<VecDeque<PageSnapshot>>>,
    taken: Arc<AtomicUsize>,
}

impl MockPageSource {
    /// Create a source with no snapshots (faults on read).
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a snapshot.
    pub fn with_snapshot(self, snapshot: PageSnapshot) -> Self {
        self.snapshots.lock().unwrap().push_back(snapshot);
        self
    }

    /// How many snapshots were taken.
    pub fn snapshots_taken(&self) -> usize {
        self.taken.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageSource for MockPageSource {
    async fn snapshot(&self) -> ExtractResult<PageSnapshot> {
        self.taken.fetch_add(1, Ordering::SeqCst);

        let mut snapshots = self.snapshots.lock().unwrap();
        match snapshots.len() {
            0 => Err(ExtractError::SourceUnavailable(
                "no page available".into(),
            )),
            1 => Ok(snapshots.front().cloned().expect("len checked")),
            _ => Ok(snapshots.pop_front().expect("len checked")),
        }
    }
}

/// An activator that succeeds without doing anything.
///
/// Models remediation that completes but leaves the target absent; the
/// resend after it still fails as unreachable.
#[derive(Clone, Default)]
pub struct NoopActivator {
    activations: Arc<AtomicUsize>,
}

impl NoopActivator {
    /// Create a no-op activator.
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times `activate` was called.
    pub fn activations(&self) -> usize {
        self.activations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TargetActivator for NoopActivator {
    async fn activate(&self, _target: &TargetId) -> ChannelResult<()> {
        self.activations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// An activator that registers a pending handler with the channel,
/// modeling successful script injection.
///
/// The handler is installed on the first activation; later activations
/// succeed without effect.
#[derive(Clone)]
pub struct RegisteringActivator {
    channel: Arc<Channel>,
    pending: Arc<Mutex<Option<Box<dyn RequestHandler>>>>,
    activations: Arc<AtomicUsize>,
}

impl RegisteringActivator {
    /// Create an activator that will install `handler` on activation.
    pub fn new<H: RequestHandler>(channel: Arc<Channel>, handler: H) -> Self {
        Self {
            channel,
            pending: Arc::new(Mutex::new(Some(Box::new(handler)))),
            activations: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// How many times `activate` was called.
    pub fn activations(&self) -> usize {
        self.activations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TargetActivator for RegisteringActivator {
    async fn activate(&self, target: &TargetId) -> ChannelResult<()> {
        self.activations.fetch_add(1, Ordering::SeqCst);

        if let Some(handler) = self.pending.lock().unwrap().take() {
            self.channel.register(target.clone(), handler);
        }
        Ok(())
    }
}

/// An activator that always fails, for exercising the error path.
#[derive(Clone, Default)]
pub struct FailingActivator;

#[async_trait]
impl TargetActivator for FailingActivator {
    async fn activate(&self, target: &TargetId) -> ChannelResult<()> {
        Err(ChannelError::Activation {
            target: target.to_string(),
            reason: "activation rejected".to_string(),
        })
    }
}
