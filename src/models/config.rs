//! Configuration models for pd-gamma.
//!
//! Every tunable of the estimation run lives here. All sections are optional
//! in the TOML file; omitted values fall back to the reference defaults.

use crate::stats::{DEFAULT_GRID_SIZE, DEFAULT_MAX_OBSERVATIONS, DEFAULT_SPREAD};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration for pd-gamma.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Prior grid construction
    #[serde(default)]
    pub prior: PriorConfig,

    /// Posterior accumulation
    #[serde(default)]
    pub posterior: PosteriorConfig,

    /// Histogram/fit diagnostics export
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,

    /// Report output
    #[serde(default)]
    pub output: OutputConfig,
}

/// Prior grid configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriorConfig {
    /// Number of candidate means/variances per axis (N)
    #[serde(default = "default_grid_size")]
    pub grid_size: usize,

    /// Half-width of the candidate range in standard errors (k)
    #[serde(default = "default_spread")]
    pub spread: f64,
}

fn default_grid_size() -> usize {
    DEFAULT_GRID_SIZE
}

fn default_spread() -> f64 {
    DEFAULT_SPREAD
}

impl Default for PriorConfig {
    fn default() -> Self {
        Self {
            grid_size: default_grid_size(),
            spread: default_spread(),
        }
    }
}

/// Posterior accumulation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PosteriorConfig {
    /// Only the first `max_observations` pairs contribute likelihood mass
    #[serde(default = "default_max_observations")]
    pub max_observations: usize,

    /// Accumulate grid cells on the rayon thread pool
    #[serde(default)]
    pub parallel: bool,

    /// Draw a progress bar over grid cells
    #[serde(default = "default_true")]
    pub show_progress: bool,
}

fn default_max_observations() -> usize {
    DEFAULT_MAX_OBSERVATIONS
}

fn default_true() -> bool {
    true
}

impl Default for PosteriorConfig {
    fn default() -> Self {
        Self {
            max_observations: default_max_observations(),
            parallel: false,
            show_progress: default_true(),
        }
    }
}

/// Diagnostics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticsConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Histogram bin count
    #[serde(default = "default_bins")]
    pub bins: usize,

    /// Number of points on the fitted density curve
    #[serde(default = "default_curve_points")]
    pub curve_points: usize,

    /// JSON lines destination
    #[serde(default)]
    pub path: Option<PathBuf>,
}

fn default_bins() -> usize {
    20
}

fn default_curve_points() -> usize {
    100
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            bins: default_bins(),
            curve_points: default_curve_points(),
            path: None,
        }
    }
}

/// Output configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// JSON report path; no report file is written when unset
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_owned(),
            source: e,
        })?;

        Self::from_toml_str(&content).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_owned(),
                source,
            },
            other => other,
        })
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: PathBuf::new(),
            source: e,
        })
    }

    /// Check that every setting describes a computable run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.prior.grid_size == 0 {
            return Err(ConfigError::invalid("prior.grid_size", "must be at least 1"));
        }
        if !self.prior.spread.is_finite() || self.prior.spread < 0.0 {
            return Err(ConfigError::invalid(
                "prior.spread",
                "must be a finite, non-negative number",
            ));
        }
        if self.posterior.max_observations == 0 {
            return Err(ConfigError::invalid(
                "posterior.max_observations",
                "must be at least 1",
            ));
        }
        if self.diagnostics.bins == 0 {
            return Err(ConfigError::invalid("diagnostics.bins", "must be at least 1"));
        }
        if self.diagnostics.curve_points == 0 {
            return Err(ConfigError::invalid(
                "diagnostics.curve_points",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Example configuration printed by `pd-gamma --example-config`.
pub const EXAMPLE_CONFIG: &str = r#"# pd-gamma configuration file

[prior]
# Candidate means/variances per axis; the posterior grid has grid_size^2 cells
grid_size = 10
# Candidate range is the point estimate +/- spread standard errors
spread = 3.0

[posterior]
# Only the first max_observations pairs contribute likelihood mass
max_observations = 100
parallel = false
show_progress = true

[diagnostics]
enabled = false
bins = 20
curve_points = 100
# path = "diagnostics.jsonl"

[output]
# path = "report.json"
"#;

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid value for '{key}': {reason}")]
    Invalid { key: String, reason: String },
}

impl ConfigError {
    fn invalid(key: &str, reason: &str) -> Self {
        Self::Invalid {
            key: key.to_string(),
            reason: reason.to_string(),
        }
    }
}
