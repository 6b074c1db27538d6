//! The forwarding seam.
//!
//! The HTTP surface talks to upstream detectors only through [`Forwarder`],
//! so handlers can be exercised against a fake without network access.

use async_trait::async_trait;

use crate::Result;
use crate::types::{Service, Submission, UpstreamResponse};

/// Sends one submission to one detector.
///
/// Implementations perform at most one outbound call per invocation and
/// never retry. Failures are classified into [`GenrealError`](crate::GenrealError)
/// variants so callers can map them to HTTP statuses.
#[async_trait]
pub trait Forwarder: Send + Sync {
    /// Forwarder name for logging/debugging.
    fn name(&self) -> &str;

    /// Forward `submission` to `service` and return its successful reply.
    async fn forward(&self, service: Service, submission: Submission) -> Result<UpstreamResponse>;
}
