//! Error types for pd-gamma.
//!
//! Failure classes:
//! - Input: unreadable files, malformed sample lines, bad configuration
//! - Arithmetic: samples that cannot support a method-of-moments estimate
//! - Output: report or diagnostic encoding and writing

use super::Dimension;
use thiserror::Error;

/// Top-level error type for pd-gamma.
#[derive(Debug, Error)]
pub enum EstimationError {
    // ═══════════════════════════════════════════════════════════════════
    // INPUT — the data or settings handed to us are unusable
    // ═══════════════════════════════════════════════════════════════════
    #[error("Configuration error: {0}")]
    Config(#[from] super::ConfigError),

    #[error("Line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // ═══════════════════════════════════════════════════════════════════
    // ARITHMETIC — moments or standard errors are undefined
    // ═══════════════════════════════════════════════════════════════════
    #[error("No samples to estimate {}", dimension_label(.dimension))]
    EmptySample { dimension: Option<Dimension> },

    #[error("Degenerate sample variance {variance} (mean {mean}): need at least two distinct finite values")]
    DegenerateVariance { mean: f64, variance: f64 },

    #[error("Need at least {required} samples for prior standard errors, got {actual}")]
    InsufficientSamples { required: usize, actual: usize },

    // ═══════════════════════════════════════════════════════════════════
    // OUTPUT
    // ═══════════════════════════════════════════════════════════════════
    #[error("Serialization error: {0}")]
    Serialization(String),
}

fn dimension_label(dimension: &Option<Dimension>) -> String {
    match dimension {
        Some(d) => format!("{d} values"),
        None => "parameters".to_string(),
    }
}

impl EstimationError {
    /// Create an IO error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Attach the dimension to an `EmptySample` error raised by a
    /// dimension-agnostic estimator.
    pub fn for_dimension(self, dimension: Dimension) -> Self {
        match self {
            Self::EmptySample { dimension: None } => Self::EmptySample {
                dimension: Some(dimension),
            },
            other => other,
        }
    }
}

impl From<serde_json::Error> for EstimationError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// Result type alias for pd-gamma.
pub type Result<T> = std::result::Result<T, EstimationError>;
