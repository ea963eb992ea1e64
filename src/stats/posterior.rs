//! Unnormalized grid posterior.
//!
//! Every candidate shape is paired with every candidate rate (N² cells, not
//! the N index-aligned pairs the prior grid was built from). A cell's mass is
//! the sum of single-dimension likelihoods of the observation subset under
//! that cell's parameters. Masses are never normalized.

use super::{likelihood_single, GammaParams, PriorGrid};
use crate::models::{Dimension, SampleSet};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashMap;

/// Pairs contributing likelihood mass in the reference run.
pub const DEFAULT_MAX_OBSERVATIONS: usize = 100;

/// One grid cell and its accumulated mass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PosteriorCell {
    pub shape: f64,
    pub rate: f64,
    pub mass: f64,
}

impl PosteriorCell {
    pub fn params(&self) -> GammaParams {
        GammaParams::new(self.shape, self.rate)
    }
}

/// Exact-match key. `-0.0` and `0.0` are the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CellKey(u64, u64);

impl CellKey {
    fn new(shape: f64, rate: f64) -> Self {
        Self(canonical_bits(shape), canonical_bits(rate))
    }
}

fn canonical_bits(x: f64) -> u64 {
    if x == 0.0 {
        0.0_f64.to_bits()
    } else {
        x.to_bits()
    }
}

/// Mapping from `(shape, rate)` to unnormalized mass, in first-insertion
/// order. Cells with identical keys share one entry.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct PosteriorMap {
    cells: Vec<PosteriorCell>,
    #[serde(skip)]
    index: HashMap<CellKey, usize>,
}

impl PosteriorMap {
    fn from_masses<I>(masses: I) -> Self
    where
        I: IntoIterator<Item = (GammaParams, f64)>,
    {
        masses
            .into_iter()
            .fold(Self::default(), |mut map, (params, mass)| {
                let key = CellKey::new(params.shape, params.rate);
                match map.index.get(&key) {
                    Some(&i) => map.cells[i].mass += mass,
                    None => {
                        map.index.insert(key, map.cells.len());
                        map.cells.push(PosteriorCell {
                            shape: params.shape,
                            rate: params.rate,
                            mass,
                        });
                    }
                }
                map
            })
    }

    /// Mass of the cell with exactly this shape and rate.
    pub fn get(&self, shape: f64, rate: f64) -> Option<f64> {
        self.index
            .get(&CellKey::new(shape, rate))
            .map(|&i| self.cells[i].mass)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PosteriorCell> {
        self.cells.iter()
    }

    /// Cell with the largest mass; the first one wins ties.
    pub fn peak(&self) -> Option<&PosteriorCell> {
        self.cells
            .iter()
            .filter(|c| !c.mass.is_nan())
            .fold(None, |best: Option<&PosteriorCell>, c| match best {
                Some(b) if b.mass >= c.mass => Some(b),
                _ => Some(c),
            })
    }

    /// Sum of all cell masses.
    pub fn total_mass(&self) -> f64 {
        self.cells.iter().map(|c| c.mass).sum()
    }
}

/// The first `max_observations` pairs of the full sample set, projected onto
/// one dimension.
pub fn observation_subset(
    samples: &SampleSet,
    dimension: Dimension,
    max_observations: usize,
) -> Vec<f64> {
    samples
        .head(max_observations)
        .iter()
        .map(|p| p.get(dimension))
        .collect()
}

fn cell_mass(params: GammaParams, observations: &[f64]) -> f64 {
    observations
        .iter()
        .fold(0.0, |mass, &x| mass + likelihood_single(x, params))
}

/// Accumulate the posterior over the full shape × rate cross product.
pub fn accumulate_posterior(grid: &PriorGrid, observations: &[f64]) -> PosteriorMap {
    accumulate_posterior_with(grid, observations, false, || {})
}

/// Same cells and masses as [`accumulate_posterior`], computed on the rayon
/// pool.
pub fn accumulate_posterior_parallel(grid: &PriorGrid, observations: &[f64]) -> PosteriorMap {
    accumulate_posterior_with(grid, observations, true, || {})
}

/// Accumulate the posterior, calling `on_cell` once per finished cell.
///
/// Each cell sums its observations in order on a single thread, so the
/// parallel path produces bit-identical masses.
pub fn accumulate_posterior_with<F>(
    grid: &PriorGrid,
    observations: &[f64],
    parallel: bool,
    on_cell: F,
) -> PosteriorMap
where
    F: Fn() + Sync,
{
    let cells: Vec<GammaParams> = grid.cells().collect();
    let mass_of = |&params: &GammaParams| {
        let mass = cell_mass(params, observations);
        on_cell();
        mass
    };

    let masses: Vec<f64> = if parallel {
        cells.par_iter().map(mass_of).collect()
    } else {
        cells.iter().map(mass_of).collect()
    };

    PosteriorMap::from_masses(cells.into_iter().zip(masses))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::make_prior_ranges;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn sample_grid() -> PriorGrid {
        make_prior_ranges(GammaParams::new(2.0, 1.0), 100, 10, 3.0).unwrap()
    }

    const OBSERVATIONS: [f64; 8] = [0.4, 1.1, 1.7, 2.0, 2.3, 3.1, 4.8, 0.9];

    #[test]
    fn test_full_cross_product() {
        let grid = sample_grid();
        let posterior = accumulate_posterior(&grid, &OBSERVATIONS);

        assert_eq!(posterior.len(), 100);
        for &shape in &grid.shapes {
            for &rate in &grid.rates {
                assert!(posterior.get(shape, rate).is_some());
            }
        }
    }

    #[test]
    fn test_mass_is_sum_of_likelihoods() {
        let grid = sample_grid();
        let posterior = accumulate_posterior(&grid, &OBSERVATIONS);

        let (shape, rate) = (grid.shapes[3], grid.rates[7]);
        let expected: f64 = OBSERVATIONS
            .iter()
            .map(|&x| likelihood_single(x, GammaParams::new(shape, rate)))
            .sum();
        assert!((posterior.get(shape, rate).unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_no_observations_gives_zero_cells() {
        let posterior = accumulate_posterior(&sample_grid(), &[]);
        assert_eq!(posterior.len(), 100);
        assert!(posterior.iter().all(|c| c.mass == 0.0));
    }

    #[test]
    fn test_mass_grows_with_each_observation() {
        let grid = sample_grid();
        let mut previous = accumulate_posterior(&grid, &[]);

        for k in 1..=OBSERVATIONS.len() {
            let current = accumulate_posterior(&grid, &OBSERVATIONS[..k]);
            for cell in current.iter() {
                let before = previous.get(cell.shape, cell.rate).unwrap();
                assert!(cell.mass >= 0.0);
                assert!(cell.mass > before, "cell {cell:?} did not grow past {before}");
            }
            previous = current;
        }
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let grid = sample_grid();
        let sequential = accumulate_posterior(&grid, &OBSERVATIONS);
        let parallel = accumulate_posterior_parallel(&grid, &OBSERVATIONS);

        let a: Vec<_> = sequential.iter().copied().collect();
        let b: Vec<_> = parallel.iter().copied().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_on_cell_called_per_cell() {
        let grid = sample_grid();
        let calls = AtomicUsize::new(0);
        accumulate_posterior_with(&grid, &OBSERVATIONS, true, || {
            calls.fetch_add(1, Ordering::Relaxed);
        });
        assert_eq!(calls.load(Ordering::Relaxed), grid.cell_count());
    }

    #[test]
    fn test_duplicate_keys_merge() {
        let grid = PriorGrid {
            shapes: vec![2.0, 2.0],
            rates: vec![1.0, 0.5],
            means: vec![2.0, 2.0],
            variances: vec![2.0, 2.0],
        };
        let posterior = accumulate_posterior(&grid, &[1.0]);

        assert_eq!(posterior.len(), 2);
        let single = likelihood_single(1.0, GammaParams::new(2.0, 1.0));
        assert!((posterior.get(2.0, 1.0).unwrap() - 2.0 * single).abs() < 1e-15);
    }

    #[test]
    fn test_negative_zero_matches_zero_key() {
        let grid = PriorGrid {
            shapes: vec![-0.0],
            rates: vec![1.0],
            means: vec![0.0],
            variances: vec![1.0],
        };
        let posterior = accumulate_posterior(&grid, &[1.0]);
        assert_eq!(posterior.get(0.0, 1.0), Some(0.0));
    }

    #[test]
    fn test_degenerate_cells_carry_no_mass() {
        let grid = make_prior_ranges(GammaParams::new(2.0, 1.0), 3, 10, 3.0).unwrap();
        let posterior = accumulate_posterior(&grid, &OBSERVATIONS);

        assert!(posterior.len() <= 100);
        assert!(posterior.iter().all(|c| c.mass >= 0.0));
        assert!(posterior
            .iter()
            .filter(|c| !c.params().is_valid())
            .all(|c| c.mass == 0.0));
    }

    #[test]
    fn test_peak_prefers_largest_mass() {
        let grid = PriorGrid {
            shapes: vec![2.0, 20.0],
            rates: vec![1.0],
            means: vec![2.0, 1.0],
            variances: vec![2.0, 1.0],
        };
        let posterior = accumulate_posterior(&grid, &[1.5, 2.0, 2.5]);
        let peak = posterior.peak().unwrap();
        assert_eq!(peak.shape, 2.0);
        assert_eq!(peak.rate, 1.0);
        assert!(posterior.total_mass() >= peak.mass);
    }

    #[test]
    fn test_observation_subset_caps_at_limit() {
        let samples = SampleSet::from_pairs((0..150).map(|i| (i as f64, 2.0 * i as f64)));

        let creation = observation_subset(&samples, Dimension::Creation, DEFAULT_MAX_OBSERVATIONS);
        assert_eq!(creation.len(), 100);
        assert_eq!(creation[99], 99.0);

        let destruction = observation_subset(&samples, Dimension::Destruction, 10);
        assert_eq!(destruction, (0..10).map(|i| 2.0 * i as f64).collect::<Vec<_>>());
    }

    #[test]
    fn test_serializes_as_cell_list() {
        let posterior = accumulate_posterior(&sample_grid(), &OBSERVATIONS);
        let json = serde_json::to_value(&posterior).unwrap();
        let cells = json.as_array().unwrap();
        assert_eq!(cells.len(), 100);
        assert!(cells[0].get("mass").is_some());
    }
}
