//! Error types for control-limit and capability computations.
//!
//! Every failure is a validation failure: the computations are
//! deterministic, so a rejected input is rejected on every retry.

use thiserror::Error;

/// Result type for fallible SPC operations.
pub type Result<T> = std::result::Result<T, SpcError>;

/// Broad class of an [`SpcError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Input shape is wrong (empty input, inconsistent sizes, NaN).
    Structural,
    /// A size, span or parameter lies outside its supported bounds.
    Range,
    /// Not enough data for the requested estimate.
    Statistical,
}

/// Errors raised by the SPC calculators.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpcError {
    #[error("subgroup set cannot be empty")]
    EmptySubgroups,

    #[error("subgroup cannot be empty")]
    EmptySubgroup,

    #[error("value series cannot be empty")]
    EmptyValues,

    #[error("all subgroups must have the same size: expected {expected}, subgroup {index} has {actual}")]
    InconsistentSubgroupSize {
        expected: usize,
        actual: usize,
        index: usize,
    },

    #[error("non-finite value {value} at position {index}")]
    NonFiniteValue { index: usize, value: f64 },

    #[error("subgroup size must be between 2 and 25, got {0}")]
    InvalidSubgroupSize(usize),

    #[error("no control chart constants for sample size {0} (supported: 2..=25)")]
    UnsupportedSampleSize(usize),

    #[error("moving range span must be between 2 and {max}, got {span}")]
    InvalidSpan { span: usize, max: usize },

    #[error("sigma multiplier must be finite and non-negative, got {0}")]
    InvalidSigmaMultiplier(f64),

    #[error("need at least {required} values, got {actual}")]
    InsufficientValues { required: usize, actual: usize },

    #[error("pooled standard deviation needs at least one subgroup with two or more values")]
    InsufficientDegreesOfFreedom,

    #[error("need at least {required} values for capability analysis, got {actual}")]
    InsufficientCapabilityData { required: usize, actual: usize },

    #[error("USL must be greater than LSL (usl={usl}, lsl={lsl})")]
    InvalidSpecLimits { usl: f64, lsl: f64 },

    #[error("pooled standard deviation must be finite and positive, got {0}")]
    InvalidPooledStdDev(f64),

    #[error("confidence level must be 0.90, 0.95 or 0.99, got {0}")]
    UnsupportedConfidenceLevel(f64),

    #[error("standard deviation is zero, capability indices are undefined")]
    ZeroVariation,

    #[error("computation overflowed: input magnitudes are too large for f64")]
    Overflow,

    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
}

impl SpcError {
    /// Classifies this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SpcError::EmptySubgroups
            | SpcError::EmptySubgroup
            | SpcError::EmptyValues
            | SpcError::InconsistentSubgroupSize { .. }
            | SpcError::NonFiniteValue { .. } => ErrorKind::Structural,
            SpcError::InvalidSubgroupSize(_)
            | SpcError::UnsupportedSampleSize(_)
            | SpcError::InvalidSpan { .. }
            | SpcError::InvalidSigmaMultiplier(_)
            | SpcError::InvalidSpecLimits { .. }
            | SpcError::InvalidPooledStdDev(_)
            | SpcError::UnsupportedConfidenceLevel(_)
            | SpcError::InvalidConfig(_) => ErrorKind::Range,
            SpcError::InsufficientValues { .. }
            | SpcError::InsufficientDegreesOfFreedom
            | SpcError::InsufficientCapabilityData { .. }
            | SpcError::ZeroVariation
            | SpcError::Overflow => ErrorKind::Statistical,
        }
    }
}
