//! One cheap reachability check per candidate, all fired at once.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{FuturesUnordered, StreamExt};
use tracing::{debug, info};

use super::{duration_to_ms, ProbeMeasurement, ProbeTransport, ProbingStrategy, StrategyOutcome};
use crate::device::DeviceTier;
use crate::error::ProbeError;
use crate::score::ScoredCandidate;
use crate::source::CandidateSource;

/// LightProbe tier: `HEAD` every candidate concurrently, lowest ping wins.
pub struct LightProbeStrategy {
    transport: Arc<dyn ProbeTransport>,
    timeout: Duration,
}

impl LightProbeStrategy {
    pub fn new(transport: Arc<dyn ProbeTransport>, timeout: Duration) -> Self {
        Self { transport, timeout }
    }

    /// Probe one candidate. Never fails: errors become the unreachable
    /// sentinel.
    pub async fn probe(&self, candidate: &CandidateSource) -> ProbeMeasurement {
        match self.check(candidate).await {
            Ok(elapsed) => ProbeMeasurement::reachable(&candidate.source_id, duration_to_ms(elapsed)),
            Err(e) => {
                debug!(source = %candidate.source_id, error = %e, "Light probe failed");
                ProbeMeasurement::unreachable(&candidate.source_id)
            }
        }
    }

    async fn check(&self, candidate: &CandidateSource) -> Result<Duration, ProbeError> {
        let target = candidate.probe_target().ok_or(ProbeError::NoSampleUnit)?;
        tokio::time::timeout(self.timeout, self.transport.ping(target))
            .await
            .map_err(|_| ProbeError::Timeout(self.timeout))?
    }
}

#[async_trait]
impl ProbingStrategy for LightProbeStrategy {
    fn tier(&self) -> DeviceTier {
        DeviceTier::LightProbe
    }

    async fn run(&self, candidates: &[CandidateSource]) -> StrategyOutcome {
        // One slot per candidate; each probe writes only its own index
        let mut slots: Vec<Option<ProbeMeasurement>> = vec![None; candidates.len()];

        let mut pending: FuturesUnordered<_> = candidates
            .iter()
            .enumerate()
            .map(|(i, c)| async move { (i, self.probe(c).await) })
            .collect();
        while let Some((i, measurement)) = pending.next().await {
            slots[i] = Some(measurement);
        }

        let measurements: Vec<ScoredCandidate> = candidates
            .iter()
            .zip(slots)
            .enumerate()
            .map(|(index, (source, slot))| ScoredCandidate {
                index,
                source: source.clone(),
                measurement: Some(
                    slot.unwrap_or_else(|| ProbeMeasurement::unreachable(&source.source_id)),
                ),
                score: None,
            })
            .collect();

        let mut reachable: Vec<(usize, u32)> = measurements
            .iter()
            .filter_map(|m| m.measurement.as_ref().map(|p| (m.index, p)))
            .filter(|(_, p)| p.reachable)
            .map(|(i, p)| (i, p.ping_ms))
            .collect();
        reachable.sort_by_key(|&(_, ping)| ping);

        let chosen = reachable.first().map(|&(i, _)| i);
        info!(
            reachable = reachable.len(),
            total = candidates.len(),
            chosen = ?chosen,
            "Light probe complete"
        );

        StrategyOutcome {
            chosen,
            measurements,
        }
    }
}
