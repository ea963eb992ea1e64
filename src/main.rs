//! pd-gamma CLI - Gamma estimates and grid posteriors for persistence diagrams.

use anyhow::{Context, Result};
use clap::Parser;
use pd_gamma::models::EXAMPLE_CONFIG;
use pd_gamma::{write_report, Config, DiagnosticSink, EstimationPipeline, JsonLinesSink};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "pd-gamma")]
#[command(version)]
#[command(about = "Estimate Gamma distributions of persistence diagram creation/destruction values")]
struct Cli {
    /// Persistence diagram file: one `<creation> <destruction>` pair per line
    #[arg(required_unless_present = "example_config")]
    input: Option<PathBuf>,

    /// Path to configuration file (defaults apply when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the full JSON report to this path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write histogram/fit diagnostics as JSON lines to this path
    #[arg(long)]
    diagnostics: Option<PathBuf>,

    /// Candidate means/variances per grid axis
    #[arg(short = 'n', long)]
    grid_size: Option<usize>,

    /// Candidate range half-width in standard errors
    #[arg(short = 'k', long)]
    spread: Option<f64>,

    /// Number of leading pairs that contribute posterior mass
    #[arg(long)]
    max_observations: Option<usize>,

    /// Accumulate grid cells in parallel
    #[arg(long)]
    parallel: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Show example configuration
    #[arg(long)]
    example_config: bool,
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set subscriber");
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load config from {path:?}"))?,
        None => Config::default(),
    };

    // CLI flags override the config file
    if let Some(grid_size) = cli.grid_size {
        config.prior.grid_size = grid_size;
    }
    if let Some(spread) = cli.spread {
        config.prior.spread = spread;
    }
    if let Some(max_observations) = cli.max_observations {
        config.posterior.max_observations = max_observations;
    }
    if cli.parallel {
        config.posterior.parallel = true;
    }
    if let Some(path) = &cli.diagnostics {
        config.diagnostics.enabled = true;
        config.diagnostics.path = Some(path.clone());
    }
    if let Some(path) = &cli.output {
        config.output.path = Some(path.clone());
    }

    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    if cli.example_config {
        println!("{EXAMPLE_CONFIG}");
        return Ok(());
    }

    let input = cli
        .input
        .clone()
        .context("Missing input file argument")?;
    let config = load_config(&cli)?;

    let diagnostics_path = if config.diagnostics.enabled {
        Some(
            config
                .diagnostics
                .path
                .clone()
                .context("Diagnostics enabled but no diagnostics path configured")?,
        )
    } else {
        None
    };
    let output_path = config.output.path.clone();

    let pipeline = EstimationPipeline::new(config).context("Invalid configuration")?;

    let mut sink = diagnostics_path
        .as_deref()
        .map(JsonLinesSink::create)
        .transpose()
        .context("Failed to open diagnostics output")?;

    let report = pipeline
        .run_file(&input, sink.as_mut().map(|s| s as &mut dyn DiagnosticSink))
        .with_context(|| format!("Estimation failed for {input:?}"))?;

    if let Some(path) = &output_path {
        write_report(&report, path)
            .with_context(|| format!("Failed to write report to {path:?}"))?;
        info!(path = %path.display(), "Report written");
    }

    println!("\n{report}");
    if let Some(path) = &output_path {
        println!("Report:      {path:?}");
    }
    if let Some(path) = &diagnostics_path {
        println!("Diagnostics: {path:?}");
    }

    Ok(())
}
