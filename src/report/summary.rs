//! Result types for an estimation run.

use crate::models::Dimension;
use crate::stats::{GammaParams, PosteriorCell, PosteriorMap, PriorGrid};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Everything computed for one dimension.
#[derive(Debug, Clone, Serialize)]
pub struct DimensionEstimate {
    pub dimension: Dimension,

    /// Method-of-moments estimate over every retained sample
    pub point_estimate: GammaParams,

    /// Candidate axes around the point estimate
    pub prior: PriorGrid,

    /// Unnormalized mass per (shape, rate) cell
    pub posterior: PosteriorMap,

    /// Observations that contributed to the posterior
    pub observations_used: usize,
}

impl DimensionEstimate {
    /// Highest-mass posterior cell.
    pub fn peak(&self) -> Option<&PosteriorCell> {
        self.posterior.peak()
    }

    pub fn degenerate_candidates(&self) -> usize {
        self.prior.degenerate_count()
    }
}

/// Settings the run actually used, after config and CLI overrides.
#[derive(Debug, Clone, Serialize)]
pub struct RunSettings {
    pub grid_size: usize,
    pub spread: f64,
    pub max_observations: usize,
    pub parallel: bool,
}

/// Output of a full two-dimension estimation run.
#[derive(Debug, Clone, Serialize)]
pub struct EstimationReport {
    /// Unique identifier for this run
    pub id: String,

    pub generated_at: DateTime<Utc>,

    /// Samples file, when the run was driven from one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<PathBuf>,

    /// Pairs retained after dropping infinite values
    pub sample_count: usize,

    /// Pairs dropped for containing an infinite component
    pub dropped_pairs: usize,

    pub settings: RunSettings,

    pub creation: DimensionEstimate,

    pub destruction: DimensionEstimate,

    pub runtime_secs: f64,
}

impl EstimationReport {
    pub fn dimension(&self, dimension: Dimension) -> &DimensionEstimate {
        match dimension {
            Dimension::Creation => &self.creation,
            Dimension::Destruction => &self.destruction,
        }
    }
}

impl fmt::Display for EstimationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Gamma Estimation Complete ===")?;
        writeln!(f, "Samples:     {}", self.sample_count)?;
        writeln!(f, "Dropped:     {}", self.dropped_pairs)?;
        writeln!(
            f,
            "Grid:        {}x{} (spread {}, first {} pairs)",
            self.settings.grid_size,
            self.settings.grid_size,
            self.settings.spread,
            self.settings.max_observations
        )?;

        for estimate in [&self.creation, &self.destruction] {
            let p = estimate.point_estimate;
            writeln!(f)?;
            writeln!(f, "[{}]", estimate.dimension)?;
            writeln!(f, "Estimate:    shape={:.4} rate={:.4}", p.shape, p.rate)?;
            writeln!(f, "Mean/Var:    {:.4} / {:.4}", p.mean(), p.variance())?;
            match estimate.peak() {
                Some(peak) => writeln!(
                    f,
                    "Peak:        shape={:.4} rate={:.4} mass={:.6e}",
                    peak.shape, peak.rate, peak.mass
                )?,
                None => writeln!(f, "Peak:        none")?,
            }
            writeln!(f, "Cells:       {}", estimate.posterior.len())?;
            if estimate.degenerate_candidates() > 0 {
                writeln!(f, "Degenerate:  {}", estimate.degenerate_candidates())?;
            }
        }

        write!(f, "\nRuntime:     {:.3}s", self.runtime_secs)
    }
}
