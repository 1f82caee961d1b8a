use std::{path::PathBuf, time::Duration};

use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type StatsResult<T> = Result<T, StatsError>;

#[derive(Debug, Error)]
pub enum StatsError {
    /// The snapshot row or the response log does not exist yet.
    #[error("{0} not found")]
    NotFound(String),
    /// A single log line or token could not be parsed. Only used for
    /// diagnostics; callers count and skip these.
    #[error("malformed input: {0}")]
    MalformedInput(String),
    #[error("{step} aggregation failed: {source:#}")]
    AggregationFailure {
        step: &'static str,
        #[source]
        source: BoxError,
    },
    /// The live word table is left untouched when this is returned.
    #[error("word index rebuild failed: {source:#}")]
    RebuildFailure {
        #[source]
        source: BoxError,
    },
    #[error("stats run timed out after {0:?}")]
    Timeout(Duration),
    #[error("invalid record: {0}")]
    Invalid(String),
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("store unavailable: {source:#}")]
    Store {
        #[source]
        source: BoxError,
    },
    #[error("snapshot serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StatsError {
    pub fn aggregation(step: &'static str, err: anyhow::Error) -> Self {
        Self::AggregationFailure {
            step,
            source: err.into(),
        }
    }

    pub fn rebuild(err: anyhow::Error) -> Self {
        Self::RebuildFailure { source: err.into() }
    }

    pub fn store(err: anyhow::Error) -> Self {
        Self::Store { source: err.into() }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedInput(message.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
