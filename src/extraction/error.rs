//! Error taxonomy for the extraction pipeline.
//!
//! Layout mismatches are expected and recoverable; they are reported with
//! the selectors that were tried so a broken provider configuration can be
//! diagnosed from logs alone. Transient sub-fetch failures are carried as
//! [`StageOutcome::Transient`] values rather than errors so the
//! partial-failure policy is enforced by the type system.

use thiserror::Error;

pub type ExtractResult<T> = Result<T, ExtractError>;

#[derive(Error, Debug, Clone)]
pub enum ExtractError {
    #[error("no container selector matched the document at {url}")]
    LayoutMismatch {
        url: String,
        tried_selectors: Vec<String>,
    },

    #[error("nothing could be extracted from any of the {sections_tried} attempted sections")]
    NothingExtracted { sections_tried: usize },

    #[error("fetch failed for {url}: {reason}")]
    FetchFailed {
        url: String,
        status: Option<u16>,
        reason: String,
    },

    #[error("invalid provider configuration: {message}")]
    InvalidConfig { message: String },
}

impl ExtractError {
    pub fn layout_mismatch(url: &str, tried_selectors: Vec<String>) -> Self {
        Self::LayoutMismatch {
            url: url.to_string(),
            tried_selectors,
        }
    }

    pub fn fetch_failed(url: &str, status: Option<u16>, reason: impl Into<String>) -> Self {
        Self::FetchFailed {
            url: url.to_string(),
            status,
            reason: reason.into(),
        }
    }

    /// True for failures that may succeed on retry (network-level causes).
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::FetchFailed { .. })
    }
}

/// Outcome of one independent pipeline stage.
///
/// A stage that found nothing is a normal result, not an error; a stage
/// that failed for a network-level reason is isolated from its siblings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome<T> {
    Found(T),
    NotFound,
    Transient(String),
}

impl<T> StageOutcome<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    pub fn found(self) -> Option<T> {
        match self {
            Self::Found(value) => Some(value),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_failures_are_transient() {
        assert!(ExtractError::fetch_failed("https://x.test", Some(503), "upstream").is_transient());
        assert!(!ExtractError::layout_mismatch("https://x.test", vec![]).is_transient());
    }

    #[test]
    fn stage_outcome_accessors() {
        let found: StageOutcome<u32> = StageOutcome::Found(7);
        assert!(found.is_found());
        assert_eq!(found.found(), Some(7));
        assert_eq!(StageOutcome::<u32>::NotFound.found(), None);
    }
}
