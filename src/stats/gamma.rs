//! Gamma distribution in shape/rate form.
//!
//! `X ~ Gamma(α, β)` with density
//!
//! ```text
//! f(x; α, β) = β^α · x^(α−1) · e^(−βx) / Γ(α),   x ≥ 0
//! ```
//!
//! - Mean: α/β
//! - Variance: α/β²
//! - Scale: 1/β

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Shape/rate parameters of a Gamma distribution.
///
/// Grid candidates built from a degenerate variance range can carry
/// non-positive or non-finite values; see [`GammaParams::is_valid`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GammaParams {
    /// Shape parameter (α > 0).
    pub shape: f64,
    /// Rate parameter (β > 0).
    pub rate: f64,
}

impl GammaParams {
    pub fn new(shape: f64, rate: f64) -> Self {
        Self { shape, rate }
    }

    /// Invert the moment equations: α = mean²/variance, β = mean/variance.
    pub fn from_moments(mean: f64, variance: f64) -> Self {
        Self {
            shape: mean * mean / variance,
            rate: mean / variance,
        }
    }

    /// E\[X\] = α/β.
    pub fn mean(&self) -> f64 {
        self.shape / self.rate
    }

    /// Var\[X\] = α/β².
    pub fn variance(&self) -> f64 {
        self.shape / (self.rate * self.rate)
    }

    /// Scale parameter θ = 1/β.
    pub fn scale(&self) -> f64 {
        1.0 / self.rate
    }

    /// Both parameters finite and strictly positive.
    pub fn is_valid(&self) -> bool {
        self.shape.is_finite() && self.shape > 0.0 && self.rate.is_finite() && self.rate > 0.0
    }

    /// Density at `x`.
    pub fn pdf(&self, x: f64) -> f64 {
        gamma_pdf(x, self.shape, self.rate)
    }

    /// Density at each of `xs`.
    pub fn pdf_many(&self, xs: &[f64]) -> Vec<f64> {
        xs.iter().map(|&x| self.pdf(x)).collect()
    }

    /// Log density at `x` (`-inf` where the density is zero).
    pub fn ln_pdf(&self, x: f64) -> f64 {
        self.pdf(x).ln()
    }
}

impl From<(f64, f64)> for GammaParams {
    fn from((shape, rate): (f64, f64)) -> Self {
        Self::new(shape, rate)
    }
}

/// Gamma density at `x` for shape `shape` and rate `rate`.
///
/// Zero for `x < 0` and for invalid parameters. At `x == 0` the density is
/// `inf` for α < 1, β for α == 1 and zero for α > 1.
pub fn gamma_pdf(x: f64, shape: f64, rate: f64) -> f64 {
    if !GammaParams::new(shape, rate).is_valid() {
        return 0.0;
    }
    if x.is_nan() {
        return f64::NAN;
    }
    if x < 0.0 || x.is_infinite() {
        return 0.0;
    }
    if x == 0.0 {
        return if shape < 1.0 {
            f64::INFINITY
        } else if shape == 1.0 {
            rate
        } else {
            0.0
        };
    }

    let log_density = shape * rate.ln() + (shape - 1.0) * x.ln() - rate * x - ln_gamma(shape);
    log_density.exp()
}

const LANCZOS_G: f64 = 7.0;

const LANCZOS_COEFFICIENTS: [f64; 9] = [
    0.999_999_999_999_809_9,
    676.520_368_121_885_1,
    -1_259.139_216_722_402_8,
    771.323_428_777_653_1,
    -176.615_029_162_140_6,
    12.507_343_278_686_905,
    -0.138_571_095_265_720_12,
    9.984_369_578_019_572e-6,
    1.505_632_735_149_311_6e-7,
];

/// Natural log of the Gamma function for `x > 0` (Lanczos, g = 7).
pub fn ln_gamma(x: f64) -> f64 {
    if x <= 0.0 {
        return f64::INFINITY;
    }
    if x < 0.5 {
        // Reflection: Γ(x)·Γ(1−x) = π / sin(πx)
        return PI.ln() - (PI * x).sin().ln() - ln_gamma(1.0 - x);
    }

    let x = x - 1.0;
    let t = x + LANCZOS_G + 0.5;
    let series = LANCZOS_COEFFICIENTS
        .iter()
        .enumerate()
        .skip(1)
        .fold(LANCZOS_COEFFICIENTS[0], |acc, (i, &c)| acc + c / (x + i as f64));

    0.5 * (2.0 * PI).ln() + (x + 0.5) * t.ln() - t + series.ln()
}
