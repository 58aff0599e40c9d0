//! Full probing: resolution, throughput and latency in small batches.
//!
//! Each probe may hold a playlist connection and a segment download open,
//! so at most `batch_size` run at once and the pipeline pauses for
//! `settle_delay` between batches to let the previous batch's resources go.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{FuturesUnordered, StreamExt};
use tracing::{debug, info};

use super::{
    duration_to_ms, ProbeMeasurement, ProbeTransport, ProbingStrategy, Quality, SegmentSample,
    StrategyOutcome,
};
use crate::config::SelectionConfig;
use crate::device::DeviceTier;
use crate::error::ProbeError;
use crate::score::{ScoreBreakdown, ScoredCandidate, Scorer};
use crate::source::CandidateSource;

/// FullProbe tier.
pub struct FullProbeStrategy {
    transport: Arc<dyn ProbeTransport>,
    timeout: Duration,
    batch_size: usize,
    settle_delay: Duration,
    scorer: Scorer,
}

impl FullProbeStrategy {
    pub fn new(transport: Arc<dyn ProbeTransport>, config: &SelectionConfig) -> Self {
        Self {
            transport,
            timeout: config.probe_timeout(),
            batch_size: config.batch_size.max(1),
            settle_delay: config.settle_delay(),
            scorer: Scorer::from_config(config),
        }
    }

    /// Probe one candidate; `None` if the probe failed in any way.
    pub async fn probe(&self, candidate: &CandidateSource) -> Option<ProbeMeasurement> {
        match self.measure(candidate).await {
            Ok(sample) => Some(ProbeMeasurement::full(
                &candidate.source_id,
                duration_to_ms(sample.latency),
                sample.width.map_or(Quality::Unknown, Quality::from_width),
                sample.throughput,
            )),
            Err(e) => {
                debug!(
                    source = %candidate.source_id,
                    kind = e.kind(),
                    error = %e,
                    "Full probe failed"
                );
                None
            }
        }
    }

    async fn measure(&self, candidate: &CandidateSource) -> Result<SegmentSample, ProbeError> {
        let target = candidate.probe_target().ok_or(ProbeError::NoSampleUnit)?;
        tokio::time::timeout(self.timeout, self.transport.measure(target))
            .await
            .map_err(|_| ProbeError::Timeout(self.timeout))?
    }

    /// Run every candidate through the batch pipeline. The returned slots
    /// line up with `candidates` regardless of completion order.
    pub async fn probe_all(&self, candidates: &[CandidateSource]) -> Vec<Option<ProbeMeasurement>> {
        let mut slots: Vec<Option<ProbeMeasurement>> = vec![None; candidates.len()];
        let indices: Vec<usize> = (0..candidates.len()).collect();

        for (batch_no, batch) in indices.chunks(self.batch_size).enumerate() {
            if batch_no > 0 {
                debug!(batch = batch_no, delay = ?self.settle_delay, "Settling before next batch");
                tokio::time::sleep(self.settle_delay).await;
            }

            let mut pending: FuturesUnordered<_> = batch
                .iter()
                .map(|&i| async move { (i, self.probe(&candidates[i]).await) })
                .collect();
            while let Some((i, measurement)) = pending.next().await {
                slots[i] = measurement;
            }
        }

        slots
    }
}

#[async_trait]
impl ProbingStrategy for FullProbeStrategy {
    fn tier(&self) -> DeviceTier {
        DeviceTier::FullProbe
    }

    async fn run(&self, candidates: &[CandidateSource]) -> StrategyOutcome {
        let slots = self.probe_all(candidates).await;

        let ranked = self.scorer.rank(&slots);
        let mut scores: Vec<Option<ScoreBreakdown>> = vec![None; slots.len()];
        for (i, score) in &ranked {
            scores[*i] = Some(*score);
        }

        let chosen = ranked.first().map(|(i, _)| *i);
        info!(
            succeeded = ranked.len(),
            total = candidates.len(),
            chosen = ?chosen,
            "Full probe complete"
        );

        let measurements = candidates
            .iter()
            .zip(slots)
            .zip(scores)
            .enumerate()
            .map(|(index, ((source, measurement), score))| ScoredCandidate {
                index,
                source: source.clone(),
                measurement,
                score,
            })
            .collect();

        StrategyOutcome {
            chosen,
            measurements,
        }
    }
}
