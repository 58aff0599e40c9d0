//! Error taxonomy for source selection.
//!
//! Only [`SelectionError`] ever reaches a caller. [`ProbeError`] describes
//! why a single probe produced nothing usable; probers convert it into
//! measurement sentinels before returning.

use std::time::Duration;

use thiserror::Error;

/// Errors surfaced by [`SourceSelector`](crate::SourceSelector).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    /// Zero candidates were supplied. This is a caller contract violation,
    /// never a network condition.
    #[error("no candidate sources supplied")]
    EmptyInput,
}

/// Why a single probe failed.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("probe timed out after {0:?}")]
    Timeout(Duration),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected HTTP status {0}")]
    Status(reqwest::StatusCode),

    #[error("invalid sample unit URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("unclassifiable response: {0}")]
    Unclassifiable(String),

    #[error("candidate has no sample units")]
    NoSampleUnit,
}

impl ProbeError {
    /// Short label used in logs and the CLI measurement table.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            ProbeError::Timeout(_) | ProbeError::Transport(_) | ProbeError::Status(_) => {
                "unreachable"
            }
            ProbeError::InvalidUrl(_) | ProbeError::NoSampleUnit => "invalid",
            ProbeError::Unclassifiable(_) => "unclassifiable",
        }
    }
}

pub type ProbeResult<T> = std::result::Result<T, ProbeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_message() {
        assert_eq!(
            SelectionError::EmptyInput.to_string(),
            "no candidate sources supplied"
        );
    }

    #[test]
    fn test_probe_error_kind() {
        assert_eq!(
            ProbeError::Timeout(Duration::from_millis(3000)).kind(),
            "unreachable"
        );
        assert_eq!(
            ProbeError::Unclassifiable("empty playlist".into()).kind(),
            "unclassifiable"
        );
        assert_eq!(ProbeError::NoSampleUnit.kind(), "invalid");
    }
}
