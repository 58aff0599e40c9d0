//! Selection orchestration
//!
//! `Init -> Classified -> Probed -> Scored (full tier only) -> Selected`
//!
//! A one-element input goes straight from `Init` to `Selected`. Any stage
//! that yields nothing usable also jumps to `Selected`, returning candidate
//! #0 with `fallback = true` so playback is never blocked. A fallback pick
//! is not a verified-good source.

use std::fmt;
use std::sync::Arc;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::config::SelectionConfig;
use crate::device::{DeviceClassifier, DeviceTier};
use crate::error::SelectionError;
use crate::http_client::ProbeClient;
use crate::probe::{
    FullProbeStrategy, HeuristicRanker, HeuristicStrategy, LightProbeStrategy, ProbeTransport,
    ProbingStrategy, StrategyOutcome,
};
use crate::score::ScoredCandidate;
use crate::source::CandidateSource;

/// The one artifact a selection call produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionResult {
    pub chosen: CandidateSource,
    /// One entry per probed candidate, in input order. Empty for the
    /// constrained tier and for single-candidate input.
    pub measurements: Vec<ScoredCandidate>,
    /// `None` when classification was skipped.
    pub tier: Option<DeviceTier>,
    /// `true` when `chosen` is candidate #0 for lack of any usable result.
    pub fallback: bool,
}

/// Where a selection call currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionStage {
    Init,
    Classified,
    Probed,
    Scored,
    Selected,
}

impl fmt::Display for SelectionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SelectionStage::Init => "init",
            SelectionStage::Classified => "classified",
            SelectionStage::Probed => "probed",
            SelectionStage::Scored => "scored",
            SelectionStage::Selected => "selected",
        };
        f.write_str(name)
    }
}

/// Picks the best candidate for a client.
pub struct SourceSelector {
    config: SelectionConfig,
    classifier: DeviceClassifier,
    transport: Arc<dyn ProbeTransport>,
}

impl SourceSelector {
    /// Selector probing over HTTP.
    pub fn new(config: SelectionConfig) -> Result<Self> {
        let client = ProbeClient::with_config(&config)?;
        Self::with_transport(config, Arc::new(client))
    }

    /// Selector probing through a caller-supplied transport.
    pub fn with_transport(
        config: SelectionConfig,
        transport: Arc<dyn ProbeTransport>,
    ) -> Result<Self> {
        config.validate()?;
        let classifier = config.classifier()?;
        Ok(Self {
            config,
            classifier,
            transport,
        })
    }

    #[must_use]
    pub fn config(&self) -> &SelectionConfig {
        &self.config
    }

    #[must_use]
    pub fn classify(&self, client_identity: &str) -> DeviceTier {
        self.classifier.classify(client_identity)
    }

    /// The strategy serving `tier`.
    #[must_use]
    pub fn strategy_for(&self, tier: DeviceTier) -> Box<dyn ProbingStrategy> {
        match tier {
            DeviceTier::Constrained => Box::new(HeuristicStrategy::new(HeuristicRanker::new(
                &self.config.preferred_providers,
            ))),
            DeviceTier::LightProbe => Box::new(LightProbeStrategy::new(
                Arc::clone(&self.transport),
                self.config.light_timeout(),
            )),
            DeviceTier::FullProbe => Box::new(FullProbeStrategy::new(
                Arc::clone(&self.transport),
                &self.config,
            )),
        }
    }

    /// Choose one of `candidates` for the client identified by
    /// `client_identity`.
    ///
    /// Network failures never surface here; the only error is empty input.
    #[instrument(skip_all, fields(candidates = candidates.len()))]
    pub async fn select_best_source(
        &self,
        candidates: &[CandidateSource],
        client_identity: &str,
    ) -> Result<SelectionResult, SelectionError> {
        let Some(first) = candidates.first() else {
            return Err(SelectionError::EmptyInput);
        };
        debug!(stage = %SelectionStage::Init, "Selection started");

        if candidates.len() == 1 {
            debug!(stage = %SelectionStage::Selected, "Single candidate, skipping probes");
            return Ok(SelectionResult {
                chosen: first.clone(),
                measurements: Vec::new(),
                tier: None,
                fallback: false,
            });
        }

        let tier = self.classify(client_identity);
        debug!(stage = %SelectionStage::Classified, %tier, "Client classified");

        let strategy = self.strategy_for(tier);
        let outcome = self.run_strategy(strategy.as_ref(), candidates).await;
        debug!(stage = %SelectionStage::Probed, measured = outcome.measurements.len());
        if reached_scoring(tier, &outcome) {
            debug!(stage = %SelectionStage::Scored);
        }

        let result = match outcome.chosen.and_then(|i| candidates.get(i)) {
            Some(chosen) => SelectionResult {
                chosen: chosen.clone(),
                measurements: outcome.measurements,
                tier: Some(tier),
                fallback: false,
            },
            None => {
                warn!(%tier, "All probes failed, falling back to first candidate");
                SelectionResult {
                    chosen: first.clone(),
                    measurements: outcome.measurements,
                    tier: Some(tier),
                    fallback: true,
                }
            }
        };

        info!(
            stage = %SelectionStage::Selected,
            chosen = %result.chosen.source_id,
            fallback = result.fallback,
            "Source selected"
        );
        Ok(result)
    }

    async fn run_strategy(
        &self,
        strategy: &dyn ProbingStrategy,
        candidates: &[CandidateSource],
    ) -> StrategyOutcome {
        let Some(deadline) = self.config.deadline() else {
            return strategy.run(candidates).await;
        };

        if let Ok(outcome) = tokio::time::timeout(deadline, strategy.run(candidates)).await {
            outcome
        } else {
            warn!(?deadline, tier = %strategy.tier(), "Selection deadline exceeded");
            StrategyOutcome::default()
        }
    }
}

/// Only a full probe with at least one measured candidate is scored.
fn reached_scoring(tier: DeviceTier, outcome: &StrategyOutcome) -> bool {
    tier == DeviceTier::FullProbe && outcome.chosen.is_some()
}
