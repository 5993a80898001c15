use thiserror::Error;

/// Errors that reach the caller of the engine. Downstream source failures never do.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DiscoveryError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("discovery cancelled before any source was tried")]
    Cancelled,
}

/// Why a single source could not answer. Recovered by advancing the chain.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("source unavailable: {0}")]
    Unavailable(String),
    #[error("blocked: {reason}")]
    Blocked { reason: String },
    #[error("deadline exceeded")]
    Timeout,
    #[error("browser unavailable: {0}")]
    ResourceInit(String),
    #[error("expected markup missing: {0}")]
    MissingMarkup(String),
    #[error("browser session already closed")]
    Closed,
}

impl From<reqwest::Error> for SourceError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SourceError::Timeout
        } else {
            SourceError::Unavailable(e.to_string())
        }
    }
}

/// One candidate element could not be turned into a record.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("skipped candidate: {0}")]
pub struct ParseSkip(pub String);
