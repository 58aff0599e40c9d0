//! Candidate sources handed in by the discovery layer.

use serde::{Deserialize, Serialize};

/// One provider's offering of a title.
///
/// Read-only input: the engine clones candidates into its result but never
/// mutates them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateSource {
    /// Opaque identifier, unique within a single selection call.
    #[serde(alias = "id")]
    pub source_id: String,
    /// Provider name as shown to the user.
    #[serde(alias = "name")]
    pub display_name: String,
    /// Retrievable media units (playlist or segment URLs) in playback order.
    #[serde(default, alias = "units")]
    pub sample_units: Vec<String>,
}

impl CandidateSource {
    pub fn new(
        source_id: impl Into<String>,
        display_name: impl Into<String>,
        sample_units: Vec<String>,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            display_name: display_name.into(),
            sample_units,
        }
    }

    /// The unit a probe should hit.
    ///
    /// Prefers the second unit: the first is often an initialization
    /// segment whose latency says little about steady-state delivery.
    #[must_use]
    pub fn probe_target(&self) -> Option<&str> {
        self.sample_units
            .get(1)
            .or_else(|| self.sample_units.first())
            .map(String::as_str)
    }
}
