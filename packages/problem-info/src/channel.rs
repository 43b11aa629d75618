//! In-process messaging channel with request/response correlation.
//!
//! Each registered target runs a single worker task that drains its
//! request queue serially, so responses for one target come back in the
//! order requests were issued. A send yields exactly one result or a
//! typed failure (`Timeout`, `Unreachable`, `Closed`); a timed-out
//! request is not cancelled in the worker - it settles and its reply is
//! discarded.

use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::error::{ChannelError, ChannelResult};
use crate::traits::activator::TargetActivator;
use crate::types::envelope::{EnvelopeError, Request, RequestEnvelope, Response, ResultEnvelope};

/// Identifier of an execution context requests can be sent to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TargetId(String);

impl TargetId {
    /// Create a target id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TargetId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Handles requests delivered to a target context.
///
/// Handlers run inside the target's single worker task, one request at
/// a time (cooperative, serial processing).
#[async_trait]
pub trait RequestHandler: Send + Sync + 'static {
    /// Handle one request, producing the response or a reported
    /// failure for the result envelope.
    async fn handle(&self, request: Request) -> std::result::Result<Response, EnvelopeError>;
}

#[async_trait]
impl RequestHandler for Box<dyn RequestHandler> {
    async fn handle(&self, request: Request) -> std::result::Result<Response, EnvelopeError> {
        (**self).handle(request).await
    }
}

struct Dispatch {
    envelope: RequestEnvelope,
    reply: oneshot::Sender<ResultEnvelope>,
}

/// Registry of targets plus the send operation.
pub struct Channel {
    targets: RwLock<HashMap<TargetId, mpsc::Sender<Dispatch>>>,
}

impl Default for Channel {
    fn default() -> Self {
        Self::new()
    }
}

impl Channel {
    const QUEUE_DEPTH: usize = 32;

    /// Create an empty channel.
    pub fn new() -> Self {
        Self {
            targets: RwLock::new(HashMap::new()),
        }
    }

    /// Register a target and spawn its serial worker.
    ///
    /// Replaces any existing registration for the same id; the previous
    /// worker drains its queue and stops.
    pub fn register<H: RequestHandler>(&self, target: TargetId, handler: H) {
        let (tx, mut rx) = mpsc::channel::<Dispatch>(Self::QUEUE_DEPTH);

        let worker_target = target.clone();
        tokio::spawn(async move {
            while let Some(Dispatch { envelope, reply }) = rx.recv().await {
                let request_id = envelope.request_id;
                debug!(target = %worker_target, %request_id, "processing request");

                let result = match handler.handle(envelope.request).await {
                    Ok(response) => ResultEnvelope::ok(request_id, response),
                    Err(error) => ResultEnvelope::err(request_id, error),
                };

                if reply.send(result).is_err() {
                    // Caller gave up (timeout); the work settled, the
                    // reply is discarded.
                    debug!(target = %worker_target, %request_id, "reply discarded, caller gone");
                }
            }
            debug!(target = %worker_target, "worker stopped");
        });

        if let Some(_previous) = self.targets.write().unwrap().insert(target.clone(), tx) {
            debug!(target = %target, "replaced existing target registration");
        }
    }

    /// Remove a target. Returns whether it was registered.
    pub fn deregister(&self, target: &TargetId) -> bool {
        self.targets.write().unwrap().remove(target).is_some()
    }

    /// Check whether a target is currently registered.
    pub fn is_registered(&self, target: &TargetId) -> bool {
        self.targets.read().unwrap().contains_key(target)
    }

    /// Send a request and wait for its single response.
    ///
    /// Fails with `Unreachable` when the target is not registered or
    /// its worker has stopped, and with `Timeout` when no response
    /// arrives within the budget.
    pub async fn send(
        &self,
        target: &TargetId,
        request: Request,
        timeout: Duration,
    ) -> ChannelResult<ResultEnvelope> {
        let envelope = RequestEnvelope::new(request);
        let request_id = envelope.request_id;

        let tx = self
            .targets
            .read()
            .unwrap()
            .get(target)
            .cloned()
            .ok_or_else(|| ChannelError::Unreachable {
                target: target.to_string(),
            })?;

        let (reply_tx, reply_rx) = oneshot::channel();

        // The budget covers the enqueue too: a full queue must read as a
        // timeout, not block past it.
        let exchange = async {
            if tx
                .send(Dispatch {
                    envelope,
                    reply: reply_tx,
                })
                .await
                .is_err()
            {
                // Worker stopped since registration; drop the dead entry.
                warn!(target = %target, "target worker stopped, deregistering");
                self.deregister(target);
                return Err(ChannelError::Unreachable {
                    target: target.to_string(),
                });
            }

            reply_rx.await.map_err(|_| ChannelError::Closed {
                target: target.to_string(),
            })
        };

        match tokio::time::timeout(timeout, exchange).await {
            Err(_) => Err(ChannelError::Timeout {
                target: target.to_string(),
                timeout_ms: timeout.as_millis() as u64,
            }),
            Ok(Err(e)) => Err(e),
            Ok(Ok(result)) => {
                if result.request_id != request_id {
                    warn!(
                        target = %target,
                        expected = %request_id,
                        got = %result.request_id,
                        "response correlation id mismatch"
                    );
                }
                Ok(result)
            }
        }
    }

    /// Send with one remediation attempt on an unreachable target.
    ///
    /// When the first send fails with `Unreachable`, the activator is
    /// invoked once and the send is repeated exactly once. All other
    /// failures pass through unchanged.
    pub async fn send_with_remediation<A: TargetActivator + ?Sized>(
        &self,
        target: &TargetId,
        request: Request,
        timeout: Duration,
        activator: &A,
    ) -> ChannelResult<ResultEnvelope> {
        match self.send(target, request.clone(), timeout).await {
            Err(ChannelError::Unreachable { .. }) => {
                debug!(target = %target, "target unreachable, attempting activation");
                activator.activate(target).await?;
                self.send(target, request, timeout).await
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::envelope::Response;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct PongHandler;

    #[async_trait]
    impl RequestHandler for PongHandler {
        async fn handle(&self, request: Request) -> Result<Response, EnvelopeError> {
            match request {
                Request::Ping => Ok(Response::Pong),
                other => Err(EnvelopeError::new(format!("unhandled request: {other:?}"))),
            }
        }
    }

    struct SlowHandler {
        delay: Duration,
    }

    #[async_trait]
    impl RequestHandler for SlowHandler {
        async fn handle(&self, _request: Request) -> Result<Response, EnvelopeError> {
            tokio::time::sleep(self.delay).await;
            Ok(Response::Pong)
        }
    }

    #[tokio::test]
    async fn test_ping_round_trip() {
        let channel = Channel::new();
        let target = TargetId::from("content");
        channel.register(target.clone(), PongHandler);

        let result = channel
            .send(&target, Request::Ping, Duration::from_secs(1))
            .await
            .unwrap();

        assert!(result.success);
        assert_eq!(result.into_outcome().unwrap(), Response::Pong);
    }

    #[tokio::test]
    async fn test_unregistered_target_is_unreachable() {
        let channel = Channel::new();
        let target = TargetId::from("missing");

        let err = channel
            .send(&target, Request::Ping, Duration::from_secs(1))
            .await
            .unwrap_err();

        assert!(matches!(err, ChannelError::Unreachable { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_target_times_out() {
        let channel = Channel::new();
        let target = TargetId::from("slow");
        channel.register(
            target.clone(),
            SlowHandler {
                delay: Duration::from_secs(10),
            },
        );

        let err = channel
            .send(&target, Request::Ping, Duration::from_secs(2))
            .await
            .unwrap_err();

        assert!(matches!(err, ChannelError::Timeout { timeout_ms: 2000, .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_send_times_out_when_queue_is_full() {
        let channel = Arc::new(Channel::new());
        let target = TargetId::from("stuck");
        channel.register(
            target.clone(),
            SlowHandler {
                delay: Duration::from_secs(3600),
            },
        );

        // One request occupies the worker; the rest saturate the queue.
        for _ in 0..=Channel::QUEUE_DEPTH {
            let channel = channel.clone();
            let target = target.clone();
            tokio::spawn(async move {
                let _ = channel
                    .send(&target, Request::Ping, Duration::from_secs(7200))
                    .await;
            });
        }
        // Let the spawned sends enqueue before ours.
        tokio::time::sleep(Duration::from_millis(1)).await;

        let err = channel
            .send(&target, Request::Ping, Duration::from_millis(100))
            .await
            .unwrap_err();

        assert!(matches!(err, ChannelError::Timeout { timeout_ms: 100, .. }));
    }

    #[tokio::test]
    async fn test_remediation_registers_and_resends_once() {
        struct Registering {
            channel: Arc<Channel>,
            activations: AtomicUsize,
        }

        #[async_trait]
        impl TargetActivator for Registering {
            async fn activate(&self, target: &TargetId) -> ChannelResult<()> {
                self.activations.fetch_add(1, Ordering::SeqCst);
                self.channel.register(target.clone(), PongHandler);
                Ok(())
            }
        }

        let channel = Arc::new(Channel::new());
        let target = TargetId::from("content");
        let activator = Registering {
            channel: channel.clone(),
            activations: AtomicUsize::new(0),
        };

        let result = channel
            .send_with_remediation(&target, Request::Ping, Duration::from_secs(1), &activator)
            .await
            .unwrap();

        assert!(result.success);
        assert_eq!(activator.activations.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_remediation_failure_propagates() {
        struct Broken;

        #[async_trait]
        impl TargetActivator for Broken {
            async fn activate(&self, target: &TargetId) -> ChannelResult<()> {
                Err(ChannelError::Activation {
                    target: target.to_string(),
                    reason: "injection refused".to_string(),
                })
            }
        }

        let channel = Channel::new();
        let target = TargetId::from("content");

        let err = channel
            .send_with_remediation(&target, Request::Ping, Duration::from_secs(1), &Broken)
            .await
            .unwrap_err();

        assert!(matches!(err, ChannelError::Activation { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_same_target_processes_serially() {
        struct Ordered {
            seen: Arc<std::sync::Mutex<Vec<usize>>>,
            counter: AtomicUsize,
        }

        #[async_trait]
        impl RequestHandler for Ordered {
            async fn handle(&self, _request: Request) -> Result<Response, EnvelopeError> {
                let n = self.counter.fetch_add(1, Ordering::SeqCst);
                // Yield mid-handling; a concurrent worker would interleave.
                tokio::time::sleep(Duration::from_millis(10)).await;
                self.seen.lock().unwrap().push(n);
                Ok(Response::Pong)
            }
        }

        let channel = Arc::new(Channel::new());
        let target = TargetId::from("serial");
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        channel.register(
            target.clone(),
            Ordered {
                seen: seen.clone(),
                counter: AtomicUsize::new(0),
            },
        );

        let (a, b, c) = tokio::join!(
            channel.send(&target, Request::Ping, Duration::from_secs(5)),
            channel.send(&target, Request::Ping, Duration::from_secs(5)),
            channel.send(&target, Request::Ping, Duration::from_secs(5)),
        );
        assert!(a.is_ok() && b.is_ok() && c.is_ok());

        assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn test_deregistered_target_is_unreachable() {
        let channel = Channel::new();
        let target = TargetId::from("content");
        channel.register(target.clone(), PongHandler);

        assert!(channel.is_registered(&target));
        assert!(channel.deregister(&target));
        assert!(!channel.is_registered(&target));

        let err = channel
            .send(&target, Request::Ping, Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, ChannelError::Unreachable { .. }));
    }
}
