//! Likelihood of observations under hypothesized Gamma parameters.

use super::GammaParams;
use crate::models::SamplePair;
use serde::{Deserialize, Serialize};

/// Independent Gamma hypotheses for both coordinates of a pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JointHypothesis {
    pub creation: GammaParams,
    pub destruction: GammaParams,
}

impl JointHypothesis {
    pub fn new(creation: GammaParams, destruction: GammaParams) -> Self {
        Self {
            creation,
            destruction,
        }
    }
}

/// `(c_α, c_β, d_α, d_β)`
impl From<(f64, f64, f64, f64)> for JointHypothesis {
    fn from((c_shape, c_rate, d_shape, d_rate): (f64, f64, f64, f64)) -> Self {
        Self::new(
            GammaParams::new(c_shape, c_rate),
            GammaParams::new(d_shape, d_rate),
        )
    }
}

/// Joint likelihood of a pair, treating creation and destruction as
/// independent: the product of the two marginal densities.
pub fn likelihood(observation: SamplePair, hypothesis: JointHypothesis) -> f64 {
    likelihood_single(observation.creation, hypothesis.creation)
        * likelihood_single(observation.destruction, hypothesis.destruction)
}

/// Likelihood of one scalar observation: the marginal Gamma density.
pub fn likelihood_single(observation: f64, hypothesis: GammaParams) -> f64 {
    hypothesis.pdf(observation)
}
