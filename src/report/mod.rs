//! Reporting: run summaries, fit diagnostics, JSON report output.

mod diagnostics;
mod summary;
mod writer;

pub use diagnostics::*;
pub use summary::*;
pub use writer::*;
