//! Selection configuration loaded from `~/.config/streampick/config.toml`.
//!
//! Every field is optional; a missing file means built-in defaults.
//!
//! ```toml
//! batch_size = 2
//! probe_timeout_ms = 5000
//! preferred_providers = ["primary", "mirror"]
//!
//! [weights]
//! quality = 0.4
//! speed = 0.4
//! latency = 0.2
//!
//! [devices]
//! constrained = ["ipad", "tablet"]
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::device::{
    DeviceClassifier, DEFAULT_CONSTRAINED_SIGNATURES, DEFAULT_HANDHELD_SIGNATURES,
};

/// Relative weights of the three sub-scores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub quality: f64,
    pub speed: f64,
    pub latency: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            quality: 0.4,
            speed: 0.4,
            latency: 0.2,
        }
    }
}

/// User-Agent signature lists for the device classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceSignatures {
    pub constrained: Vec<String>,
    pub handheld: Vec<String>,
}

impl Default for DeviceSignatures {
    fn default() -> Self {
        Self {
            constrained: DEFAULT_CONSTRAINED_SIGNATURES
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            handheld: DEFAULT_HANDHELD_SIGNATURES
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        }
    }
}

/// Tuning knobs for one deployment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Concurrent full probes per batch.
    pub batch_size: usize,
    /// Timeout of a single light (`HEAD`) probe.
    pub light_timeout_ms: u64,
    /// Timeout of a single full probe.
    pub probe_timeout_ms: u64,
    /// Pause between full-probe batches.
    pub settle_delay_ms: u64,
    /// Optional ceiling on the whole probing stage. `None` = no deadline.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline_ms: Option<u64>,
    pub weights: ScoreWeights,
    /// Speed sub-score for pending or unparsable throughput.
    pub neutral_speed_score: f64,
    /// Normalisation ceiling when no candidate reported a throughput.
    pub reference_throughput_kbps: f64,
    /// Most bytes a full probe downloads from one segment.
    pub max_probe_bytes: u64,
    /// Longest a full probe spends reading one body. Throughput is taken
    /// from whatever arrived by then, so slow providers are still scored.
    pub max_download_ms: u64,
    /// Provider-name fragments for the constrained tier, best first.
    pub preferred_providers: Vec<String>,
    pub devices: DeviceSignatures,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            batch_size: 2,
            light_timeout_ms: 3000,
            probe_timeout_ms: 5000,
            settle_delay_ms: 500,
            deadline_ms: None,
            weights: ScoreWeights::default(),
            neutral_speed_score: 30.0,
            reference_throughput_kbps: 1024.0,
            max_probe_bytes: 2 * 1024 * 1024,
            max_download_ms: 2000,
            preferred_providers: vec![
                "official".to_string(),
                "premium".to_string(),
                "cdn".to_string(),
                "hd".to_string(),
                "mirror".to_string(),
            ],
            devices: DeviceSignatures::default(),
        }
    }
}

impl SelectionConfig {
    #[must_use]
    pub fn light_timeout(&self) -> Duration {
        Duration::from_millis(self.light_timeout_ms)
    }

    #[must_use]
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    #[must_use]
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// Per-body read budget, never more than half the probe timeout so the
    /// playlist hops still fit.
    #[must_use]
    pub fn max_download(&self) -> Duration {
        Duration::from_millis(self.max_download_ms).min(self.probe_timeout() / 2)
    }

    #[must_use]
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_ms.map(Duration::from_millis)
    }

    /// Compile the configured device signatures.
    pub fn classifier(&self) -> Result<DeviceClassifier> {
        DeviceClassifier::new(&self.devices.constrained, &self.devices.handheld)
            .context("invalid device signature pattern")
    }

    /// Reject settings the selector cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            bail!("batch_size must be at least 1");
        }
        let w = &self.weights;
        if [w.quality, w.speed, w.latency]
            .iter()
            .any(|v| !v.is_finite() || *v < 0.0)
        {
            bail!("score weights must be finite and non-negative");
        }
        if w.quality + w.speed + w.latency <= 0.0 {
            bail!("at least one score weight must be positive");
        }
        if !self.reference_throughput_kbps.is_finite() || self.reference_throughput_kbps <= 0.0 {
            bail!("reference_throughput_kbps must be positive");
        }
        self.classifier()?;
        Ok(())
    }

    /// Parse and validate a TOML document.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("invalid selection config")?;
        config.validate()?;
        Ok(config)
    }

    /// Load from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("in {}", path.display()))
    }

    /// Load from the default location, falling back to built-in defaults
    /// when the file does not exist.
    pub fn load() -> Result<Self> {
        let path = config_path();
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }
}

/// Return the path to the default config file.
#[must_use]
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("streampick")
        .join("config.toml")
}
