//! Two-dimension Gamma estimation pipeline.
//!
//! Pipeline flow, once per dimension:
//! Samples → Point Estimate → Prior Grid → Posterior (first M pairs)

use crate::models::{Config, Dimension, Result, SampleSet};
use crate::report::{DiagnosticSink, DimensionEstimate, EstimationReport, FitDiagnostic, RunSettings};
use crate::stats::{accumulate_posterior_with, make_prior_ranges, observation_subset, point_estimate};
use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Pipeline estimating creation and destruction Gamma parameters.
pub struct EstimationPipeline {
    config: Config,
}

impl EstimationPipeline {
    /// Create a new pipeline from a validated configuration.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Load samples from a persistence diagram file.
    pub fn load_samples(path: &Path) -> Result<SampleSet> {
        SampleSet::load(path)
    }

    fn settings(&self) -> RunSettings {
        RunSettings {
            grid_size: self.config.prior.grid_size,
            spread: self.config.prior.spread,
            max_observations: self.config.posterior.max_observations,
            parallel: self.config.posterior.parallel,
        }
    }

    fn progress_bar(&self, dimension: Dimension, cells: usize) -> ProgressBar {
        if !self.config.posterior.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(cells as u64);
        let style = ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} ({percent}%) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-");
        pb.set_style(style);
        pb.set_message(dimension.to_string());
        pb
    }

    /// Run the estimate → prior → posterior chain for one dimension.
    pub fn estimate_dimension(
        &self,
        samples: &SampleSet,
        dimension: Dimension,
    ) -> Result<DimensionEstimate> {
        let values = samples.values(dimension);
        let point = point_estimate(&values).map_err(|e| e.for_dimension(dimension))?;

        debug!(
            %dimension,
            shape = point.shape,
            rate = point.rate,
            mean = point.mean(),
            variance = point.variance(),
            "Point estimate"
        );

        let prior = make_prior_ranges(
            point,
            samples.len(),
            self.config.prior.grid_size,
            self.config.prior.spread,
        )?;

        let observations =
            observation_subset(samples, dimension, self.config.posterior.max_observations);

        let pb = self.progress_bar(dimension, prior.cell_count());
        let posterior = accumulate_posterior_with(
            &prior,
            &observations,
            self.config.posterior.parallel,
            || pb.inc(1),
        );
        pb.finish_with_message(format!("{dimension} done"));

        if let Some(peak) = posterior.peak() {
            debug!(
                %dimension,
                cells = posterior.len(),
                peak_shape = peak.shape,
                peak_rate = peak.rate,
                peak_mass = peak.mass,
                "Posterior accumulated"
            );
        }

        Ok(DimensionEstimate {
            dimension,
            point_estimate: point,
            prior,
            posterior,
            observations_used: observations.len(),
        })
    }

    /// Run both dimensions, creation first.
    pub fn run(&self, samples: &SampleSet) -> Result<EstimationReport> {
        self.run_inner(samples, None, None)
    }

    /// Run both dimensions and emit one fit diagnostic per dimension.
    pub fn run_with_diagnostics(
        &self,
        samples: &SampleSet,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<EstimationReport> {
        self.run_inner(samples, None, Some(sink))
    }

    /// Load `path` and run, recording the input path in the report.
    pub fn run_file(
        &self,
        path: &Path,
        sink: Option<&mut dyn DiagnosticSink>,
    ) -> Result<EstimationReport> {
        let samples = Self::load_samples(path)?;
        self.run_inner(&samples, Some(path), sink)
    }

    fn run_inner(
        &self,
        samples: &SampleSet,
        input: Option<&Path>,
        mut sink: Option<&mut dyn DiagnosticSink>,
    ) -> Result<EstimationReport> {
        let start = Instant::now();
        let settings = self.settings();

        info!(
            samples = samples.len(),
            dropped = samples.dropped(),
            grid_size = settings.grid_size,
            spread = settings.spread,
            max_observations = settings.max_observations,
            parallel = settings.parallel,
            "Starting Gamma estimation"
        );

        let creation = self.estimate_dimension(samples, Dimension::Creation)?;
        let destruction = self.estimate_dimension(samples, Dimension::Destruction)?;

        if let Some(sink) = sink.as_deref_mut() {
            let diagnostics = &self.config.diagnostics;
            for estimate in [&creation, &destruction] {
                let diagnostic = FitDiagnostic::new(
                    estimate.dimension,
                    &samples.values(estimate.dimension),
                    estimate.point_estimate,
                    diagnostics.bins,
                    diagnostics.curve_points,
                );
                sink.emit(&diagnostic)?;
            }
            debug!("Fit diagnostics emitted");
        }

        let report = EstimationReport {
            id: uuid::Uuid::new_v4().to_string(),
            generated_at: Utc::now(),
            input: input.map(Path::to_path_buf),
            sample_count: samples.len(),
            dropped_pairs: samples.dropped(),
            settings,
            creation,
            destruction,
            runtime_secs: start.elapsed().as_secs_f64(),
        };

        info!(
            creation_shape = report.creation.point_estimate.shape,
            creation_rate = report.creation.point_estimate.rate,
            destruction_shape = report.destruction.point_estimate.shape,
            destruction_rate = report.destruction.point_estimate.rate,
            runtime = format!("{:.3}s", report.runtime_secs),
            "Gamma estimation complete"
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EstimationError;
    use std::fs;
    use tempfile::TempDir;

    fn quiet_pipeline(configure: impl FnOnce(&mut Config)) -> EstimationPipeline {
        let mut config = Config::default();
        config.posterior.show_progress = false;
        configure(&mut config);
        EstimationPipeline::new(config).unwrap()
    }

    fn ramp_samples(n: usize) -> SampleSet {
        SampleSet::from_pairs((0..n).map(|i| {
            let x = 0.5 + (i % 17) as f64 * 0.1;
            (x, x + 1.0 + (i % 5) as f64 * 0.3)
        }))
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut config = Config::default();
        config.prior.grid_size = 0;
        assert!(matches!(
            EstimationPipeline::new(config),
            Err(EstimationError::Config(_))
        ));
    }

    #[test]
    fn test_run_fills_both_dimensions() {
        let samples = ramp_samples(150);
        let report = quiet_pipeline(|_| {}).run(&samples).unwrap();

        assert_eq!(report.sample_count, 150);
        for dimension in Dimension::ALL {
            let estimate = report.dimension(dimension);
            assert_eq!(estimate.dimension, dimension);
            assert_eq!(estimate.observations_used, 100);
            assert_eq!(estimate.prior.len(), 10);
            assert!(estimate.posterior.len() <= 100);
            assert!(estimate.posterior.iter().all(|c| c.mass >= 0.0));
            assert!(estimate.peak().is_some());
        }
    }

    #[test]
    fn test_point_estimates_use_all_samples() {
        let samples = ramp_samples(150);
        let report = quiet_pipeline(|_| {}).run(&samples).unwrap();

        let expected = point_estimate(&samples.creation()).unwrap();
        assert_eq!(report.creation.point_estimate, expected);
    }

    #[test]
    fn test_max_observations_override() {
        let samples = ramp_samples(40);
        let report = quiet_pipeline(|c| c.posterior.max_observations = 7)
            .run(&samples)
            .unwrap();
        assert_eq!(report.creation.observations_used, 7);
        assert_eq!(report.settings.max_observations, 7);
    }

    #[test]
    fn test_parallel_run_matches_sequential() {
        let samples = ramp_samples(60);
        let sequential = quiet_pipeline(|_| {}).run(&samples).unwrap();
        let parallel = quiet_pipeline(|c| c.posterior.parallel = true)
            .run(&samples)
            .unwrap();

        let a: Vec<_> = sequential.destruction.posterior.iter().copied().collect();
        let b: Vec<_> = parallel.destruction.posterior.iter().copied().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_constant_dimension_fails() {
        let samples = SampleSet::from_pairs([(1.0, 2.0), (1.0, 3.0), (1.0, 4.0)]);
        let err = quiet_pipeline(|_| {}).run(&samples).unwrap_err();
        assert!(matches!(err, EstimationError::DegenerateVariance { .. }));
    }

    #[test]
    fn test_empty_samples_name_dimension() {
        let err = quiet_pipeline(|_| {}).run(&SampleSet::default()).unwrap_err();
        assert!(matches!(
            err,
            EstimationError::EmptySample {
                dimension: Some(Dimension::Creation)
            }
        ));
        assert!(err.to_string().contains("creation"));
    }

    #[test]
    fn test_diagnostics_emitted_per_dimension() {
        let samples = ramp_samples(50);
        let mut sink: Vec<FitDiagnostic> = Vec::new();
        let report = quiet_pipeline(|c| c.diagnostics.bins = 8)
            .run_with_diagnostics(&samples, &mut sink)
            .unwrap();

        assert_eq!(sink.len(), 2);
        assert_eq!(sink[0].dimension, Dimension::Creation);
        assert_eq!(sink[0].params, report.creation.point_estimate);
        assert_eq!(sink[1].dimension, Dimension::Destruction);
        assert_eq!(sink[1].params, report.destruction.point_estimate);
        assert_eq!(sink[1].histogram.counts.len(), 8);
        assert_eq!(sink[1].histogram.counts.iter().sum::<usize>(), 50);
    }

    #[test]
    fn test_run_file_records_input() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("diagram.txt");
        let body: String = (0..30)
            .map(|i| format!("{} {}\n", 0.1 * (i % 7 + 1) as f64, 0.2 * (i % 9 + 3) as f64))
            .collect();
        fs::write(&path, format!("# persistence diagram\n{body}0.0 inf\n")).unwrap();

        let report = quiet_pipeline(|_| {}).run_file(&path, None).unwrap();
        assert_eq!(report.input.as_deref(), Some(path.as_path()));
        assert_eq!(report.sample_count, 30);
        assert_eq!(report.dropped_pairs, 1);
    }

    #[test]
    fn test_summary_mentions_both_dimensions() {
        let report = quiet_pipeline(|_| {}).run(&ramp_samples(20)).unwrap();
        let summary = report.to_string();
        assert!(summary.contains("[creation]"));
        assert!(summary.contains("[destruction]"));
        assert!(summary.contains("Samples:     20"));
    }
}
