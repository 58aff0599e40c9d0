//! The network seam between probers and the outside world.

use std::time::Duration;

use async_trait::async_trait;

use super::Throughput;
use crate::error::ProbeResult;

/// What a full probe learned about one sample unit.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentSample {
    /// Time until response headers arrived.
    pub latency: Duration,
    /// Frame width advertised or decoded, if any.
    pub width: Option<u32>,
    /// Delivery rate of the timed download.
    pub throughput: Throughput,
}

/// Performs the actual network work of a probe.
///
/// Implementations do not enforce the per-probe timeout; the strategies
/// wrap every call in one.
#[async_trait]
pub trait ProbeTransport: Send + Sync {
    /// Minimal existence check. Returns the round-trip time.
    async fn ping(&self, url: &str) -> ProbeResult<Duration>;

    /// Latency, resolution and throughput of a sample unit.
    async fn measure(&self, url: &str) -> ProbeResult<SegmentSample>;
}
