//! Pipeline module - two-dimension Gamma estimation.

mod estimate;

pub use estimate::*;
