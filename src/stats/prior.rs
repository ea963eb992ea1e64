//! Prior grids around a point estimate.
//!
//! Candidate means and variances are spread symmetrically around the
//! estimate's moments, `spread` standard errors to either side:
//!
//! ```text
//! se_mean = mean / √n
//! se_var  = √(2·variance² / (n − 1))
//! ```
//!
//! The two axes are generated independently and paired only by index before
//! being converted back to shape/rate.

use super::GammaParams;
use crate::models::{EstimationError, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Candidates per axis in the reference run.
pub const DEFAULT_GRID_SIZE: usize = 10;

/// Candidate range half-width, in standard errors.
pub const DEFAULT_SPREAD: f64 = 3.0;

/// Index-aligned candidate axes for one dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorGrid {
    /// Candidate shapes, `means[i]² / variances[i]`
    pub shapes: Vec<f64>,
    /// Candidate rates, `means[i] / variances[i]`
    pub rates: Vec<f64>,
    /// Evenly spaced candidate means
    pub means: Vec<f64>,
    /// Evenly spaced candidate variances
    pub variances: Vec<f64>,
}

impl PriorGrid {
    /// Number of candidates per axis (N).
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Candidates whose variance is not positive, giving negative or
    /// undefined shape/rate values.
    pub fn degenerate_count(&self) -> usize {
        self.variances
            .iter()
            .filter(|&&v| v.is_nan() || v <= 0.0)
            .count()
    }

    /// Every shape paired with every rate, shape-major.
    pub fn cells(&self) -> impl Iterator<Item = GammaParams> + '_ {
        self.shapes.iter().flat_map(move |&shape| {
            self.rates
                .iter()
                .map(move |&rate| GammaParams::new(shape, rate))
        })
    }

    /// Number of cells in the cross product (N²).
    pub fn cell_count(&self) -> usize {
        self.shapes.len() * self.rates.len()
    }
}

/// `n` evenly spaced values over `[start, stop]`, both ends included.
///
/// Empty for `n == 0`, `[start]` for `n == 1`.
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            let mut values: Vec<f64> = (0..n).map(|i| start + step * i as f64).collect();
            values[n - 1] = stop;
            values
        }
    }
}

/// Build the candidate grid around `point` for a sample of size `n`.
///
/// Requires `n > 1` for the variance standard error. Degenerate candidates
/// (non-positive variance) are kept and reported through
/// [`PriorGrid::degenerate_count`].
pub fn make_prior_ranges(
    point: GammaParams,
    n: usize,
    grid_size: usize,
    spread: f64,
) -> Result<PriorGrid> {
    if n < 2 {
        return Err(EstimationError::InsufficientSamples {
            required: 2,
            actual: n,
        });
    }

    let mean = point.mean();
    let variance = point.variance();
    let se_mean = mean / (n as f64).sqrt();
    let se_var = (2.0 * variance * variance / (n - 1) as f64).sqrt();

    let means = linspace(mean - spread * se_mean, mean + spread * se_mean, grid_size);
    let variances = linspace(
        variance - spread * se_var,
        variance + spread * se_var,
        grid_size,
    );

    let (shapes, rates) = means
        .iter()
        .zip(&variances)
        .map(|(&m, &v)| {
            let candidate = GammaParams::from_moments(m, v);
            (candidate.shape, candidate.rate)
        })
        .unzip();

    let grid = PriorGrid {
        shapes,
        rates,
        means,
        variances,
    };

    debug!(mean, variance, se_mean, se_var, grid_size, "Built prior grid");
    let degenerate = grid.degenerate_count();
    if degenerate > 0 {
        warn!(
            degenerate,
            grid_size, "Prior grid has non-positive variance candidates; they carry no mass"
        );
    }

    Ok(grid)
}
