//! `streampick` - Adaptive stream source selection
//!
//! Given several providers that all claim to serve the same title, pick
//! the one to hand to the player.
//!
//! # Features
//!
//! - **Device tiers**: fragile tablets are never probed, phones get one
//!   cheap `HEAD` per provider, desktops get a full measurement
//! - **Bounded probing**: full probes run two at a time with a settle delay
//! - **Relative scoring**: resolution ladder, throughput and latency,
//!   normalised against the providers actually measured
//! - **Never blocks playback**: when nothing can be measured the first
//!   candidate is returned
//!
//! # Example
//!
//! ```rust,no_run
//! use streampick::{CandidateSource, SelectionConfig, SourceSelector};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let selector = SourceSelector::new(SelectionConfig::default())?;
//!     let candidates = vec![
//!         CandidateSource::new("a", "Mirror A", vec!["https://a.example/v/index.m3u8".into()]),
//!         CandidateSource::new("b", "Mirror B", vec!["https://b.example/v/index.m3u8".into()]),
//!     ];
//!     let result = selector
//!         .select_best_source(&candidates, "Mozilla/5.0 (X11; Linux x86_64)")
//!         .await?;
//!     println!("Playing {}", result.chosen.display_name);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod device;
pub mod error;
pub mod http_client;
pub mod playlist;
pub mod probe;
pub mod score;
pub mod selector;
pub mod source;

pub use config::{ScoreWeights, SelectionConfig};
pub use device::{classify_device, DeviceClassifier, DeviceTier};
pub use error::{ProbeError, SelectionError};
pub use http_client::ProbeClient;
pub use probe::{
    ProbeMeasurement, ProbeTransport, ProbingStrategy, Quality, SegmentSample, Throughput,
    PING_UNREACHABLE_MS,
};
pub use score::{ScoreBreakdown, ScoredCandidate, Scorer};
pub use selector::{SelectionResult, SelectionStage, SourceSelector};
pub use source::CandidateSource;

/// Version of streampick
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
