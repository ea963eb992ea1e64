//! Fit diagnostics: a density histogram of one dimension's samples next to
//! the fitted Gamma curve, exported as data for external plotting.

use crate::models::{Dimension, EstimationError, Result};
use crate::stats::{linspace, GammaParams};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Equal-width histogram normalized so its area is one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    /// `bins + 1` bin edges
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
    /// `count / (total · width)` per bin
    pub densities: Vec<f64>,
}

/// Histogram over the finite values' `[min, max]`.
///
/// The last bin includes its right edge. A zero-width range is widened to
/// `[min − 0.5, max + 0.5]`; no finite values gives the unit range.
pub fn histogram(values: &[f64], bins: usize) -> Histogram {
    let finite: Vec<f64> = values.iter().copied().filter(|x| x.is_finite()).collect();
    let (lo, hi) = match value_range(&finite) {
        Some((lo, hi)) if lo == hi => (lo - 0.5, hi + 0.5),
        Some(range) => range,
        None => (0.0, 1.0),
    };

    let edges = linspace(lo, hi, bins + 1);
    let mut counts = vec![0usize; bins];
    if bins > 0 {
        for &x in &finite {
            let bin = (((x - lo) / (hi - lo)) * bins as f64) as usize;
            counts[bin.min(bins - 1)] += 1;
        }
    }

    let total = finite.len() as f64;
    let densities = counts
        .iter()
        .zip(edges.windows(2))
        .map(|(&count, edge)| {
            if total == 0.0 {
                0.0
            } else {
                count as f64 / (total * (edge[1] - edge[0]))
            }
        })
        .collect();

    Histogram {
        edges,
        counts,
        densities,
    }
}

fn value_range(values: &[f64]) -> Option<(f64, f64)> {
    values.iter().fold(None, |range, &x| match range {
        None => Some((x, x)),
        Some((lo, hi)) => Some((lo.min(x), hi.max(x))),
    })
}

/// Histogram and fitted density for one dimension.
#[derive(Debug, Clone, Serialize)]
pub struct FitDiagnostic {
    pub dimension: Dimension,
    pub params: GammaParams,
    pub sample_count: usize,
    pub histogram: Histogram,
    /// Evenly spaced x over the sample range
    pub curve_x: Vec<f64>,
    /// Fitted density at each `curve_x`
    pub curve_y: Vec<f64>,
}

impl FitDiagnostic {
    /// Build the diagnostic for `values` fitted by `params`.
    pub fn new(
        dimension: Dimension,
        values: &[f64],
        params: GammaParams,
        bins: usize,
        points: usize,
    ) -> Self {
        let finite: Vec<f64> = values.iter().copied().filter(|x| x.is_finite()).collect();
        let curve_x = match value_range(&finite) {
            Some((lo, hi)) => linspace(lo, hi, points),
            None => Vec::new(),
        };
        let curve_y = params.pdf_many(&curve_x);

        Self {
            dimension,
            params,
            sample_count: values.len(),
            histogram: histogram(values, bins),
            curve_x,
            curve_y,
        }
    }
}

/// Destination for fit diagnostics.
pub trait DiagnosticSink {
    fn emit(&mut self, diagnostic: &FitDiagnostic) -> Result<()>;
}

/// Collects diagnostics in memory.
impl DiagnosticSink for Vec<FitDiagnostic> {
    fn emit(&mut self, diagnostic: &FitDiagnostic) -> Result<()> {
        self.push(diagnostic.clone());
        Ok(())
    }
}

/// Writes one JSON object per diagnostic, one per line.
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl JsonLinesSink<BufWriter<File>> {
    /// Create (or truncate) a JSON lines file.
    pub fn create(path: &Path) -> Result<Self> {
        let file =
            File::create(path).map_err(|e| EstimationError::io("creating diagnostics file", e))?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> DiagnosticSink for JsonLinesSink<W> {
    fn emit(&mut self, diagnostic: &FitDiagnostic) -> Result<()> {
        let json = serde_json::to_string(diagnostic)?;
        writeln!(self.writer, "{}", json)
            .map_err(|e| EstimationError::io("writing diagnostics", e))?;
        self.writer
            .flush()
            .map_err(|e| EstimationError::io("flushing diagnostics", e))
    }
}
