//! Core data models for pd-gamma: samples, configuration, errors.

mod config;
mod error;
mod sample;

pub use config::*;
pub use error::*;
pub use sample::*;
