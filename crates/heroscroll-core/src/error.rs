#![forbid(unsafe_code)]

//! Error types for configuration and session replay.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Invalid controller configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "config-toml")]
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("media source must not be empty")]
    EmptyMediaSource,

    #[error("{field} must be finite and non-negative (got {value})")]
    InvalidScale { field: &'static str, value: f64 },

    #[error("{field} must be within (0, 1] (got {value})")]
    ThresholdOutOfRange { field: &'static str, value: f64 },

    #[error("{field} must be within (0, 1) (got {value})")]
    FractionOutOfRange { field: &'static str, value: f64 },

    #[error("compact breakpoint must be finite and positive (got {value})")]
    InvalidBreakpoint { value: f64 },

    #[error("text falloff must be greater than 1 (got {value})")]
    FalloffTooSmall { value: f64 },

    #[error("{field}: max size {max} is smaller than base size {base}")]
    InvertedSizeCurve {
        field: &'static str,
        base: f64,
        max: f64,
    },
}

/// A replayed session diverged from its recording.
#[derive(Debug, Error, PartialEq)]
pub enum ReplayError {
    #[error("unsupported trace schema: {found}")]
    UnsupportedSchema { found: String },

    #[error("trace has no header record")]
    MissingHeader,

    #[error("record {seq}: expected checksum {expected:016x}, replay produced {actual:016x}")]
    ChecksumMismatch { seq: u64, expected: u64, actual: u64 },

    #[error("summary expected {expected} records, trace contains {actual}")]
    RecordCountMismatch { expected: u64, actual: u64 },

    #[error("invalid configuration in trace header: {message}")]
    InvalidConfig { message: String },

    #[error("malformed trace line {line}: {message}")]
    Malformed { line: usize, message: String },
}
