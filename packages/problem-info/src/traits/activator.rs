//! Remediation seam for unreachable targets.

use async_trait::async_trait;

use crate::channel::TargetId;
use crate::error::ChannelResult;

/// Brings a target context up when it is not reachable.
///
/// In a browser-extension setting this is "inject the content script";
/// in-process it usually means registering the target's handler with
/// the channel. A caller invokes it at most once per send, then resends
/// exactly once.
#[async_trait]
pub trait TargetActivator: Send + Sync {
    /// Activate the target. Returns an error when activation itself
    /// fails; reachability is re-checked by the resend.
    async fn activate(&self, target: &TargetId) -> ChannelResult<()>;
}
