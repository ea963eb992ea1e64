//! Statistical core: Gamma density, moment estimates, likelihoods, prior
//! grids and grid posteriors.
//!
//! Data flows one way per dimension:
//!
//! ```text
//! samples → point_estimate → make_prior_ranges → accumulate_posterior
//! ```

mod gamma;
mod likelihoods;
mod moments;
mod posterior;
mod prior;

pub use gamma::*;
pub use likelihoods::*;
pub use moments::*;
pub use posterior::*;
pub use prior::*;
