//! pd-gamma - Gamma parameter estimation for persistence diagrams.
//!
//! ## Architecture
//!
//! Each persistence pair `(creation, destruction)` is split into two
//! independent dimensions. Both go through the same chain:
//!
//! - **Point estimate**: method-of-moments shape/rate
//! - **Prior grid**: N candidate means and variances, ±k standard errors
//!   around the estimate
//! - **Posterior**: summed likelihood of the first M pairs over the full
//!   N × N shape/rate cross product (unnormalized)
//!
//! ## Modules
//!
//! - [`models`]: samples, configuration, errors
//! - [`stats`]: density, moments, likelihood, prior grid, posterior
//! - [`pipeline`]: runs both dimensions and assembles a report
//! - [`report`]: summaries, fit diagnostics, JSON output

pub mod models;
pub mod pipeline;
pub mod report;
pub mod stats;

// Re-exports for convenience
pub use models::{Config, ConfigError, Dimension, EstimationError, Result, SamplePair, SampleSet};
pub use pipeline::EstimationPipeline;
pub use report::{
    write_report, DiagnosticSink, DimensionEstimate, EstimationReport, FitDiagnostic,
    JsonLinesSink,
};
pub use stats::{
    accumulate_posterior, gamma_pdf, likelihood, likelihood_single, make_prior_ranges,
    point_estimate, GammaParams, JointHypothesis, PosteriorMap, PriorGrid,
};
