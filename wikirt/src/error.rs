//! Error types for round-trip operations
//!
//! Each layer owns one enum. Only [`ServiceError`] (wrapped in
//! [`RoundTripError`]) ever reaches a user as a hard failure: metadata problems
//! degrade to "no span" and classification never fails.

use thiserror::Error;

/// Malformed per-node metadata found while building an annotated document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataFormatError {
    /// `data-parsoid` is not valid JSON or has the wrong shape
    #[error("invalid data-parsoid JSON: {0}")]
    InvalidJson(String),
    /// A `dsr` entry was present but describes an impossible range
    #[error("invalid source range [{start}, {end})")]
    InvertedRange { start: usize, end: usize },
}

/// Failures talking to the parse/serialize service or the source wiki.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request never produced a response
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// The service answered with a non-success status
    #[error("{url} returned HTTP {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },
    /// The response decoded but did not carry what we asked for
    #[error("no content for '{title}': {reason}")]
    MissingContent { title: String, reason: String },
    /// An endpoint could not be built from configuration
    #[error("invalid service URL '{0}'")]
    InvalidUrl(String),
    /// All retry attempts were used up; wraps the last failure
    #[error("gave up after {attempts} attempts")]
    Exhausted {
        attempts: u32,
        #[source]
        last: Box<ServiceError>,
    },
}

impl ServiceError {
    /// Whether another attempt could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ServiceError::Transport { .. } => true,
            ServiceError::Status { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

/// Pipeline stages of a round-trip check, used to label failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetch,
    Parse,
    Serialize,
    ReparseSerialized,
    SelectiveSerialize,
    ReparseSelective,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Fetch => "fetch",
            Stage::Parse => "parse",
            Stage::Serialize => "serialize",
            Stage::ReparseSerialized => "reparse",
            Stage::SelectiveSerialize => "selser",
            Stage::ReparseSelective => "selser-reparse",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Title-level failure of a round-trip check. No partial results accompany it.
#[derive(Debug, Error)]
pub enum RoundTripError {
    #[error("{stage} stage failed for '{title}'")]
    Stage {
        stage: Stage,
        title: String,
        #[source]
        source: ServiceError,
    },
    /// The edit marker could not be injected before selective serialization
    #[error("could not insert edit marker: {0}")]
    Marker(#[from] std::io::Error),
}

impl RoundTripError {
    pub fn stage(&self) -> Stage {
        match self {
            RoundTripError::Stage { stage, .. } => *stage,
            RoundTripError::Marker(_) => Stage::SelectiveSerialize,
        }
    }

    /// Render the error together with its whole `source()` chain, one cause per line.
    pub fn diagnostic(&self) -> String {
        let mut out = self.to_string();
        let mut cause = std::error::Error::source(self);
        while let Some(err) = cause {
            out.push_str("\ncaused by: ");
            out.push_str(&err.to_string());
            cause = err.source();
        }
        out
    }
}

/// Errors from the report layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReportError {
    /// Reporter not found in registry
    #[error("Report format '{0}' not found")]
    FormatNotFound(String),
}
