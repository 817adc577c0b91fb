// Engine error taxonomy.
//
// Three failure classes with different propagation rules:
// - ValidationError: one bad record. Collected per batch alongside the
//   successful output; never aborts the whole batch.
// - ConfigError: bad thresholds/windows. Fatal to the call, no partial output.
// - ClusterError::Cancelled: cooperative cancellation. The call returns no
//   partial result, only the cancellation signal.
//
// Empty results ("no anomalies found", "no clusters") are valid output,
// never errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single raw mention record failed validation.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum ValidationError {
    #[error("missing or empty mention id")]
    MissingId,

    #[error("missing timestamp")]
    MissingTimestamp,

    #[error("unparsable timestamp: {0}")]
    UnparsableTimestamp(String),

    #[error("unrecognized platform: {0}")]
    UnknownPlatform(String),

    #[error("negative engagement count: {field} = {value}")]
    NegativeEngagement { field: String, value: i64 },

    #[error("sentiment confidence {0} outside [0, 1]")]
    ConfidenceOutOfRange(f64),

    #[error("unrecognized sentiment label: {0}")]
    UnknownSentiment(String),

    #[error("unrecognized emotion: {0}")]
    UnknownEmotion(String),

    #[error("emotion share {0} outside [0, 1]")]
    EmotionShareOutOfRange(f64),
}

/// Invalid engine configuration. Checked before any processing begins.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("bucket window must be positive, got {0} hours")]
    NonPositiveWindow(i64),

    #[error("similarity threshold {0} outside [0, 1]")]
    ThresholdOutOfRange(f64),

    #[error("baseline window must be at least 2 buckets, got {0}")]
    BaselineTooSmall(usize),

    #[error("severity thresholds must satisfy 0 < moderate <= severe, got {moderate} / {severe}")]
    BadSeverityThresholds { moderate: f64, severe: f64 },

    #[error("minimum insight delta must be non-negative, got {0}")]
    NegativeMinDelta(f64),

    #[error("platform concentration share {0} outside [0, 1]")]
    ConcentrationOutOfRange(f64),
}

/// Why a clustering call produced no output.
#[derive(Debug, Error)]
pub enum ClusterError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The cancel token fired. Not a failure — the caller asked us to stop.
    #[error("clustering cancelled before completion")]
    Cancelled,
}
