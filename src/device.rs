//! Device Capability Detection
//!
//! Maps a client identity (User-Agent) string to the probing tier the
//! device can tolerate. Classification is a pure function of the string.

use std::fmt;
use std::sync::LazyLock;

use regex::{RegexSet, RegexSetBuilder};
use serde::{Deserialize, Serialize};

/// Tablets known to stall or crash when several media probes run at once.
pub const DEFAULT_CONSTRAINED_SIGNATURES: &[&str] = &[
    r"ipad",
    r"\btablet\b",
    r"kindle|silk/",
    r"playbook",
    r"\bsm-[tx]\d{3}",
    r"matepad|mediapad",
    r"lenovo tb-",
];

/// Phones, small tablets and embedded mobile browsers.
pub const DEFAULT_HANDHELD_SIGNATURES: &[&str] = &[
    r"\bmobile\b",
    r"iphone|ipod",
    r"android",
    r"blackberry|bb10",
    r"iemobile|windows phone",
    r"opera mini|opera mobi",
    r"webos|hpwos",
    r"; wv\)",
];

static DEFAULT_CLASSIFIER: LazyLock<DeviceClassifier> = LazyLock::new(|| {
    DeviceClassifier::new(DEFAULT_CONSTRAINED_SIGNATURES, DEFAULT_HANDHELD_SIGNATURES)
        .unwrap_or_else(|e| unreachable!("built-in device signatures must compile: {e}"))
});

/// Probing tier a client can tolerate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceTier {
    /// No network probing at all; static provider ranking only.
    Constrained,
    /// One cheap reachability check per candidate.
    LightProbe,
    /// Resolution, throughput and latency, in small batches.
    FullProbe,
}

impl DeviceTier {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceTier::Constrained => "constrained",
            DeviceTier::LightProbe => "light_probe",
            DeviceTier::FullProbe => "full_probe",
        }
    }
}

impl fmt::Display for DeviceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Signature-based tier classifier.
#[derive(Debug, Clone)]
pub struct DeviceClassifier {
    constrained: RegexSet,
    handheld: RegexSet,
}

impl DeviceClassifier {
    /// Build from case-insensitive signature patterns.
    pub fn new<C, H>(constrained: C, handheld: H) -> Result<Self, regex::Error>
    where
        C: IntoIterator,
        C::Item: AsRef<str>,
        H: IntoIterator,
        H::Item: AsRef<str>,
    {
        Ok(Self {
            constrained: RegexSetBuilder::new(constrained)
                .case_insensitive(true)
                .build()?,
            handheld: RegexSetBuilder::new(handheld)
                .case_insensitive(true)
                .build()?,
        })
    }

    /// First match wins: constrained tablet, then handheld, then full.
    #[must_use]
    pub fn classify(&self, client_identity: &str) -> DeviceTier {
        if self.constrained.is_match(client_identity) {
            DeviceTier::Constrained
        } else if self.handheld.is_match(client_identity) {
            DeviceTier::LightProbe
        } else {
            DeviceTier::FullProbe
        }
    }
}

impl Default for DeviceClassifier {
    fn default() -> Self {
        DEFAULT_CLASSIFIER.clone()
    }
}

/// Classify with the built-in signatures.
#[must_use]
pub fn classify_device(client_identity: &str) -> DeviceTier {
    DEFAULT_CLASSIFIER.classify(client_identity)
}
