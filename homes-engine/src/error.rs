//! Error types surfaced by the engine.
use thiserror::Error;

/// Failure decoding a stored composite marker reference.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MarkerRefError {
    #[error("marker reference is empty")]
    Empty,
    #[error("marker reference `{0}` must have three `|` separated parts")]
    Shape(String),
    #[error("unknown marker source key `{0}`")]
    UnknownSource(String),
    #[error("marker id `{0}` is not a non-negative integer")]
    InvalidId(String),
}

/// Failure reading or writing the external marker store.
#[derive(Debug, Error)]
pub enum MarkerStoreError {
    #[error("marker store payload for `{key}` is not valid JSON: {source}")]
    Decode {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("marker store payload for `{key}` could not be encoded: {source}")]
    Encode {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("marker store payload for `{key}` has an unexpected shape")]
    Shape { key: &'static str },
    #[error("marker store backend failed for `{key}`: {source}")]
    Backend {
        key: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Raised when helper configuration invariants are violated.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{field} must be at least 0 (got {value})")]
    NegativeThreshold { field: &'static str, value: i32 },
    #[error("{role} marker reference is invalid: {source}")]
    MarkerRef {
        role: &'static str,
        #[source]
        source: MarkerRefError,
    },
}

/// The helper task is gone and can no longer accept commands.
#[cfg(feature = "async")]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ActorError {
    #[error("helper task has stopped")]
    Closed,
    #[error("helper task dropped the reply")]
    NoReply,
}
