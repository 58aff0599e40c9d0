//! Static provider ranking for devices that must not be probed.

use async_trait::async_trait;
use tracing::debug;

use super::{ProbingStrategy, StrategyOutcome};
use crate::device::DeviceTier;
use crate::source::CandidateSource;

/// Ranks candidates by a fixed list of known-good provider-name fragments.
#[derive(Debug, Clone, Default)]
pub struct HeuristicRanker {
    /// Lowercased fragments, best first.
    preferences: Vec<String>,
}

impl HeuristicRanker {
    pub fn new<I>(preferences: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        Self {
            preferences: preferences
                .into_iter()
                .map(|p| p.as_ref().to_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    /// Position of the first preference contained in `display_name`.
    #[must_use]
    pub fn preference_index(&self, display_name: &str) -> Option<usize> {
        let name = display_name.to_lowercase();
        self.preferences.iter().position(|p| name.contains(p.as_str()))
    }

    /// Candidate indices, best first.
    ///
    /// Matched candidates come before unmatched ones; equal keys keep input
    /// order (`sort_by_key` is stable), so identical input always yields
    /// identical output.
    #[must_use]
    pub fn rank(&self, candidates: &[CandidateSource]) -> Vec<usize> {
        let mut order: Vec<(usize, usize)> = candidates
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let key = self.preference_index(&c.display_name).unwrap_or(usize::MAX);
                (i, key)
            })
            .collect();
        order.sort_by_key(|&(_, key)| key);
        order.into_iter().map(|(i, _)| i).collect()
    }

    /// The candidate list reordered, best first.
    #[must_use]
    pub fn rank_sources<'a>(&self, candidates: &'a [CandidateSource]) -> Vec<&'a CandidateSource> {
        self.rank(candidates).into_iter().map(|i| &candidates[i]).collect()
    }
}

/// Constrained tier: no network, no measurements.
#[derive(Debug, Clone)]
pub struct HeuristicStrategy {
    ranker: HeuristicRanker,
}

impl HeuristicStrategy {
    #[must_use]
    pub fn new(ranker: HeuristicRanker) -> Self {
        Self { ranker }
    }
}

#[async_trait]
impl ProbingStrategy for HeuristicStrategy {
    fn tier(&self) -> DeviceTier {
        DeviceTier::Constrained
    }

    async fn run(&self, candidates: &[CandidateSource]) -> StrategyOutcome {
        let order = self.ranker.rank(candidates);
        debug!(?order, "Heuristic ranking");
        StrategyOutcome {
            chosen: order.first().copied(),
            measurements: Vec::new(),
        }
    }
}
