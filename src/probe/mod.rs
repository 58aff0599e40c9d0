//! Probing strategies and the measurements they produce.
//!
//! A [`ProbingStrategy`] is picked once per call from the client's
//! [`DeviceTier`](crate::DeviceTier):
//!
//! - [`HeuristicStrategy`] - static provider preference, no network
//! - [`LightProbeStrategy`] - one `HEAD` per candidate, all at once
//! - [`FullProbeStrategy`] - resolution + throughput + latency, in batches

pub mod full;
pub mod heuristic;
pub mod light;
pub mod transport;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::device::DeviceTier;
use crate::score::ScoredCandidate;
use crate::source::CandidateSource;

pub use full::FullProbeStrategy;
pub use heuristic::{HeuristicRanker, HeuristicStrategy};
pub use light::LightProbeStrategy;
pub use transport::{ProbeTransport, SegmentSample};

/// Ping reported for unreachable or unmeasured candidates.
pub const PING_UNREACHABLE_MS: u32 = 9999;

/// Approximate delivered resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quality {
    #[serde(rename = "4K")]
    Uhd4k,
    #[serde(rename = "2K")]
    Qhd2k,
    #[serde(rename = "1080p")]
    Hd1080,
    #[serde(rename = "720p")]
    Hd720,
    #[serde(rename = "480p")]
    Sd480,
    #[serde(rename = "SD")]
    Sd,
    #[serde(rename = "unknown")]
    Unknown,
}

impl Quality {
    /// Classify from the decoded frame width in pixels.
    #[must_use]
    pub fn from_width(width: u32) -> Self {
        match width {
            w if w >= 3840 => Quality::Uhd4k,
            w if w >= 2560 => Quality::Qhd2k,
            w if w >= 1920 => Quality::Hd1080,
            w if w >= 1280 => Quality::Hd720,
            w if w >= 854 => Quality::Sd480,
            0 => Quality::Unknown,
            _ => Quality::Sd,
        }
    }

    /// Ladder score (0-100).
    #[must_use]
    pub fn score(self) -> f64 {
        match self {
            Quality::Uhd4k => 100.0,
            Quality::Qhd2k => 85.0,
            Quality::Hd1080 => 75.0,
            Quality::Hd720 => 60.0,
            Quality::Sd480 => 40.0,
            Quality::Sd => 20.0,
            Quality::Unknown => 0.0,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Quality::Uhd4k => "4K",
            Quality::Qhd2k => "2K",
            Quality::Hd1080 => "1080p",
            Quality::Hd720 => "720p",
            Quality::Sd480 => "480p",
            Quality::Sd => "SD",
            Quality::Unknown => "unknown",
        }
    }

    /// Parse a ladder label; anything unrecognised is [`Quality::Unknown`].
    #[must_use]
    pub fn parse(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "4k" => Quality::Uhd4k,
            "2k" => Quality::Qhd2k,
            "1080p" => Quality::Hd1080,
            "720p" => Quality::Hd720,
            "480p" => Quality::Sd480,
            "sd" => Quality::Sd,
            _ => Quality::Unknown,
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sustained download rate.
///
/// Serialized as a human string (`"512 KB/s"`, `"1.5 MB/s"`, `"measuring"`)
/// so a picker UI can show it verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum Throughput {
    /// Measured rate in KB/s.
    Measured(f64),
    /// Unknown, or the transfer was too short to time.
    Pending,
}

impl Throughput {
    /// Wrap a KB/s figure; non-finite or negative values become `Pending`.
    #[must_use]
    pub fn from_kbps(kbps: f64) -> Self {
        if kbps.is_finite() && kbps >= 0.0 {
            Throughput::Measured(kbps)
        } else {
            Throughput::Pending
        }
    }

    #[must_use]
    pub fn kbps(self) -> Option<f64> {
        match self {
            Throughput::Measured(kbps) => Some(kbps),
            Throughput::Pending => None,
        }
    }

    /// Parse `"<number> <unit>/s"` into KB/s (1 MB = 1024 KB).
    ///
    /// A bare number is taken as KB/s. Anything else, including
    /// "measuring" placeholders, parses to `Pending`.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        let split = text
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(text.len());
        let (number, unit) = text.split_at(split);
        let Ok(value) = number.parse::<f64>() else {
            return Throughput::Pending;
        };

        let factor = match unit.trim().to_ascii_lowercase().as_str() {
            "b/s" => 1.0 / 1024.0,
            "" | "kb/s" => 1.0,
            "mb/s" => 1024.0,
            "gb/s" => 1024.0 * 1024.0,
            _ => return Throughput::Pending,
        };
        Throughput::from_kbps(value * factor)
    }
}

impl fmt::Display for Throughput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Throughput::Measured(kbps) if *kbps >= 1024.0 => {
                write!(f, "{:.1} MB/s", kbps / 1024.0)
            }
            Throughput::Measured(kbps) => write!(f, "{kbps:.0} KB/s"),
            Throughput::Pending => f.write_str("measuring"),
        }
    }
}

impl From<Throughput> for String {
    fn from(value: Throughput) -> Self {
        value.to_string()
    }
}

impl From<String> for Throughput {
    fn from(value: String) -> Self {
        Throughput::parse(&value)
    }
}

/// Result of probing one candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeMeasurement {
    pub source_id: String,
    pub reachable: bool,
    /// Round-trip latency, or [`PING_UNREACHABLE_MS`].
    pub ping_ms: u32,
    /// Full probe only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<Quality>,
    /// Full probe only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub throughput: Option<Throughput>,
}

impl ProbeMeasurement {
    #[must_use]
    pub fn unreachable(source_id: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            reachable: false,
            ping_ms: PING_UNREACHABLE_MS,
            quality: None,
            throughput: None,
        }
    }

    #[must_use]
    pub fn reachable(source_id: impl Into<String>, ping_ms: u32) -> Self {
        Self {
            source_id: source_id.into(),
            reachable: true,
            ping_ms,
            quality: None,
            throughput: None,
        }
    }

    #[must_use]
    pub fn full(
        source_id: impl Into<String>,
        ping_ms: u32,
        quality: Quality,
        throughput: Throughput,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            reachable: true,
            ping_ms,
            quality: Some(quality),
            throughput: Some(throughput),
        }
    }
}

/// What a strategy hands back to the selector.
#[derive(Debug, Clone, Default)]
pub struct StrategyOutcome {
    /// Index of the winning candidate; `None` means nothing usable came
    /// back and the selector falls back to candidate #0.
    pub chosen: Option<usize>,
    /// One entry per probed candidate, in input order.
    pub measurements: Vec<ScoredCandidate>,
}

/// A tier-specific way of turning candidates into a pick.
#[async_trait]
pub trait ProbingStrategy: Send + Sync {
    /// The tier this strategy serves.
    fn tier(&self) -> DeviceTier;

    /// Rank `candidates` (never empty) and return the pick.
    async fn run(&self, candidates: &[CandidateSource]) -> StrategyOutcome;
}

/// Elapsed time as whole milliseconds, saturating below the sentinel.
pub(crate) fn duration_to_ms(elapsed: std::time::Duration) -> u32 {
    u32::try_from(elapsed.as_millis())
        .unwrap_or(u32::MAX)
        .min(PING_UNREACHABLE_MS - 1)
}
