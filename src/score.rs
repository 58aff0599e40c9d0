//! Normalisation and composite scoring of full-probe measurements.
//!
//! Every sub-score is relative to the current set of successful results,
//! never to a global baseline:
//!
//! - quality: fixed ladder (4K = 100 ... unknown = 0)
//! - speed: throughput / best throughput in the set, 0-100; pending
//!   measurements get a neutral score
//! - latency: inverted position between the set's min and max ping
//!
//! composite = w_q * quality + w_s * speed + w_l * latency, two decimals.

use serde::{Deserialize, Serialize};

use crate::config::{ScoreWeights, SelectionConfig};
use crate::probe::ProbeMeasurement;
use crate::source::CandidateSource;

/// Sub-scores and their weighted combination.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub quality: f64,
    pub speed: f64,
    pub latency: f64,
    /// 0-100, rounded to two decimals.
    pub composite: f64,
}

/// One entry of the measurement cache handed back to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    /// Position in the caller's candidate list.
    pub index: usize,
    pub source: CandidateSource,
    /// `None` when the probe failed outright ("measurement failed").
    pub measurement: Option<ProbeMeasurement>,
    /// Only full-probe successes are scored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<ScoreBreakdown>,
}

/// Turns a set of measurements into composite scores.
#[derive(Debug, Clone, Copy)]
pub struct Scorer {
    weights: ScoreWeights,
    neutral_speed: f64,
    reference_kbps: f64,
}

impl Default for Scorer {
    fn default() -> Self {
        Self::from_config(&SelectionConfig::default())
    }
}

impl Scorer {
    #[must_use]
    pub fn new(weights: ScoreWeights, neutral_speed: f64, reference_kbps: f64) -> Self {
        Self {
            weights,
            neutral_speed,
            reference_kbps,
        }
    }

    #[must_use]
    pub fn from_config(config: &SelectionConfig) -> Self {
        Self::new(
            config.weights,
            config.neutral_speed_score,
            config.reference_throughput_kbps,
        )
    }

    /// Score each measurement against the others, preserving order.
    #[must_use]
    pub fn score_all(&self, measurements: &[&ProbeMeasurement]) -> Vec<ScoreBreakdown> {
        let max_kbps = measurements
            .iter()
            .filter_map(|m| m.throughput.and_then(|t| t.kbps()))
            .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.max(v))))
            .filter(|max| *max > 0.0)
            .unwrap_or(self.reference_kbps);

        let min_ping = measurements.iter().map(|m| m.ping_ms).min().unwrap_or(0);
        let max_ping = measurements.iter().map(|m| m.ping_ms).max().unwrap_or(0);

        measurements
            .iter()
            .map(|m| {
                let quality = m.quality.map_or(0.0, |q| q.score());
                let speed = self.speed_score(m, max_kbps);
                let latency = latency_score(m.ping_ms, min_ping, max_ping);
                ScoreBreakdown {
                    quality,
                    speed,
                    latency,
                    composite: self.composite(quality, speed, latency),
                }
            })
            .collect()
    }

    /// Score the successful slots and return `(slot index, score)` best
    /// first. Ties keep slot order.
    #[must_use]
    pub fn rank(&self, slots: &[Option<ProbeMeasurement>]) -> Vec<(usize, ScoreBreakdown)> {
        let (indices, measurements): (Vec<usize>, Vec<&ProbeMeasurement>) = slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|m| (i, m)))
            .unzip();

        let mut ranked: Vec<(usize, ScoreBreakdown)> = indices
            .into_iter()
            .zip(self.score_all(&measurements))
            .collect();
        ranked.sort_by(|a, b| b.1.composite.total_cmp(&a.1.composite));
        ranked
    }

    fn speed_score(&self, m: &ProbeMeasurement, max_kbps: f64) -> f64 {
        match m.throughput.and_then(|t| t.kbps()) {
            Some(kbps) => (kbps / max_kbps * 100.0).clamp(0.0, 100.0),
            None => self.neutral_speed,
        }
    }

    fn composite(&self, quality: f64, speed: f64, latency: f64) -> f64 {
        let w = &self.weights;
        round2(w.quality * quality + w.speed * speed + w.latency * latency)
    }
}

/// Lower ping scores higher; a uniform set scores 100 across the board.
fn latency_score(ping_ms: u32, min_ping: u32, max_ping: u32) -> f64 {
    if max_ping == min_ping {
        return 100.0;
    }
    let span = f64::from(max_ping - min_ping);
    (f64::from(max_ping.saturating_sub(ping_ms)) / span * 100.0).clamp(0.0, 100.0)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::{Quality, Throughput};

    fn full(id: &str, quality: Quality, kbps: f64, ping: u32) -> ProbeMeasurement {
        ProbeMeasurement::full(id, ping, quality, Throughput::Measured(kbps))
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 0.01
    }

    #[test]
    fn test_golden_three_candidates() {
        let slots = vec![
            Some(full("A", Quality::Hd1080, 500.0, 80)),
            Some(full("B", Quality::Hd720, 900.0, 80)),
            Some(full("C", Quality::Uhd4k, 500.0, 400)),
        ];
        let ranked = Scorer::default().rank(&slots);

        let order: Vec<usize> = ranked.iter().map(|(i, _)| *i).collect();
        assert_eq!(order, vec![1, 0, 2]);

        let by_index = |i: usize| ranked.iter().find(|(j, _)| *j == i).unwrap().1;
        assert!(close(by_index(0).composite, 72.22));
        assert!(close(by_index(1).composite, 84.00));
        assert!(close(by_index(2).composite, 62.22));
        assert!(close(by_index(0).speed, 55.56));
        assert!(close(by_index(2).latency, 0.0));
    }

    #[test]
    fn test_latency_tie_scores_100() {
        let a = full("a", Quality::Hd720, 100.0, 150);
        let b = full("b", Quality::Sd, 900.0, 150);
        let c = full("c", Quality::Unknown, 10.0, 150);
        for score in Scorer::default().score_all(&[&a, &b, &c]) {
            assert!((score.latency - 100.0).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn test_pending_throughput_scores_neutral() {
        let a = ProbeMeasurement::full("a", 50, Quality::Hd1080, Throughput::Pending);
        let b = full("b", Quality::Hd1080, 400.0, 50);
        let scores = Scorer::default().score_all(&[&a, &b]);
        assert!((scores[0].speed - 30.0).abs() < f64::EPSILON);
        assert!((scores[1].speed - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_reference_max_when_nothing_measured() {
        let a = ProbeMeasurement::full("a", 50, Quality::Hd720, Throughput::Pending);
        let scorer = Scorer::new(ScoreWeights::default(), 30.0, 1024.0);
        let scores = scorer.score_all(&[&a]);
        assert!((scores[0].speed - 30.0).abs() < f64::EPSILON);

        // A lone zero reading is "valid" but cannot be a ceiling.
        let z = full("z", Quality::Hd720, 0.0, 50);
        let scores = scorer.score_all(&[&z]);
        assert!(scores[0].speed.abs() < f64::EPSILON);
    }

    #[test]
    fn test_speed_monotonic_in_throughput() {
        let scorer = Scorer::default();
        for (low, high) in [(100.0, 200.0), (1.0, 1.5), (450.0, 900.0), (899.0, 900.0)] {
            let slow = full("slow", Quality::Hd1080, low, 120);
            let fast = full("fast", Quality::Hd1080, high, 120);
            let other = full("other", Quality::Sd, 900.0, 60);
            let scores = scorer.score_all(&[&slow, &fast, &other]);
            assert!(scores[1].composite >= scores[0].composite);
        }
    }

    #[test]
    fn test_ties_keep_input_order() {
        let slots = vec![
            Some(full("a", Quality::Hd720, 300.0, 90)),
            None,
            Some(full("b", Quality::Hd720, 300.0, 90)),
        ];
        let ranked = Scorer::default().rank(&slots);
        let order: Vec<usize> = ranked.iter().map(|(i, _)| *i).collect();
        assert_eq!(order, vec![0, 2]);
    }

    #[test]
    fn test_failed_slots_are_not_scored() {
        let slots = vec![None, Some(full("b", Quality::Sd, 10.0, 10)), None];
        let ranked = Scorer::default().rank(&slots);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].0, 1);
        assert!(Scorer::default().rank(&[None, None]).is_empty());
    }

    #[test]
    fn test_composite_rounded_to_two_decimals() {
        let a = full("a", Quality::Hd1080, 1.0, 10);
        let b = full("b", Quality::Hd1080, 3.0, 20);
        for score in Scorer::default().score_all(&[&a, &b]) {
            assert!(close(score.composite, round2(score.composite)));
            assert!((score.composite * 100.0 - (score.composite * 100.0).round()).abs() < 1e-6);
        }
    }

    #[test]
    fn test_latency_score_range() {
        assert!((latency_score(80, 80, 400) - 100.0).abs() < f64::EPSILON);
        assert!(latency_score(400, 80, 400).abs() < f64::EPSILON);
        assert!((latency_score(240, 80, 400) - 50.0).abs() < f64::EPSILON);
    }
}
