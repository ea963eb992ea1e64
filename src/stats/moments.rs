//! Method-of-moments point estimates.
//!
//! Equates the sample mean `m` and population variance `v` to the Gamma
//! moments α/β and α/β², giving α = m²/v and β = m/v.

use super::GammaParams;
use crate::models::{EstimationError, Result};

/// Arithmetic mean. NaN for an empty slice.
pub fn sample_mean(samples: &[f64]) -> f64 {
    samples.iter().sum::<f64>() / samples.len() as f64
}

/// Population variance (divides by n, not n − 1). NaN for an empty slice.
pub fn population_variance(samples: &[f64]) -> f64 {
    let mean = sample_mean(samples);
    samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / samples.len() as f64
}

/// Gamma shape/rate from the first two sample moments.
///
/// Fails on an empty slice and on zero (or non-finite) variance, which
/// leaves the moment equations without a solution.
pub fn point_estimate(samples: &[f64]) -> Result<GammaParams> {
    if samples.is_empty() {
        return Err(EstimationError::EmptySample { dimension: None });
    }

    let mean = sample_mean(samples);
    let variance = population_variance(samples);
    if !mean.is_finite() || !variance.is_finite() || variance <= 0.0 {
        return Err(EstimationError::DegenerateVariance { mean, variance });
    }

    Ok(GammaParams::from_moments(mean, variance))
}
