//! Stream clustering benchmark binary.
//!
//! Runs the selected summary structures over a dataset file (or a synthetic
//! stream when no file is given), prints timings, center counts and purity,
//! and optionally writes `.centers` files and a JSON report.
//!
//! # Usage
//!
//! ```bash
//! # Synthetic uniform stream, all algorithms
//! cargo run -p streamclust-bench --bin stream-bench
//!
//! # Dataset file, two algorithms, centers written to ./out
//! cargo run -p streamclust-bench --bin stream-bench -- data/toy.txt \
//!   --algorithms birch,clustream --output-dir out --report out/report.json
//!
//! # Synthetic Gaussian blobs
//! cargo run -p streamclust-bench --bin stream-bench -- \
//!   --num-points 20000 --dim 2 --clusters 5 --seed 7
//! ```

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use streamclust_bench::datasets::{load_dataset, SyntheticDatasetConfig, SyntheticDatasetGenerator};
use streamclust_bench::runners::{StreamBenchmarkConfig, StreamBenchmarkRunner};
use streamclust_core::{AlgorithmKind, LogFormat, LoggingConfig, StreamClusterConfig};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// CLI arguments for the benchmark.
#[derive(Parser, Debug)]
#[command(name = "stream-bench")]
#[command(about = "Benchmark incremental clustering summary structures on a point stream")]
struct Args {
    /// Dataset file; a synthetic stream is generated when omitted.
    dataset: Option<PathBuf>,

    /// Algorithms to run, comma-separated (default: all).
    #[arg(long, value_delimiter = ',')]
    algorithms: Vec<AlgorithmKind>,

    /// Points per batch.
    #[arg(long)]
    batch_size: Option<usize>,

    /// Only use the first N points.
    #[arg(long)]
    limit: Option<usize>,

    /// TOML config file (default: layered config/ + STREAMCLUST_* env).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory for <algorithm>.centers files.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Write the JSON report here.
    #[arg(long)]
    report: Option<PathBuf>,

    /// Synthetic stream length.
    #[arg(long)]
    num_points: Option<usize>,

    /// Synthetic dimensionality.
    #[arg(long)]
    dim: Option<usize>,

    /// Synthetic Gaussian blobs; 0 for uniform noise.
    #[arg(long, default_value = "0")]
    clusters: usize,

    /// Sliding-window k (default: the dataset's true cluster count).
    #[arg(long)]
    k: Option<usize>,

    /// Seed for synthetic data and sliding-window initialization
    /// (default: sliding_window.seed from the config).
    #[arg(long)]
    seed: Option<u64>,

    /// Debug-level logging.
    #[arg(long, short)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => StreamClusterConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => StreamClusterConfig::load().context("loading layered config")?,
    };

    init_logging(&config.logging, args.verbose)?;
    apply_overrides(&mut config, &args);

    info!("Starting benchmarks...");

    let mut dataset = match &args.dataset {
        Some(path) => load_dataset(path)?,
        None => {
            info!("No dataset given, using a generated stream; results vary with --seed");
            SyntheticDatasetGenerator::new(SyntheticDatasetConfig {
                num_points: config.harness.num_points,
                dim: config.harness.dimensions,
                num_clusters: args.clusters,
                seed: config.sliding_window.seed,
                ..Default::default()
            })
            .generate()?
        }
    };
    if let Some(limit) = args.limit {
        dataset.limit(limit);
    }
    info!("{}", dataset.summary());

    if let Some(k) = args.k {
        config.sliding_window.k = k;
    } else if dataset.num_true_clusters > 0 {
        config.sliding_window.k = dataset.num_true_clusters;
    }
    config.validate()?;

    let kinds = if args.algorithms.is_empty() {
        AlgorithmKind::all().to_vec()
    } else {
        args.algorithms.clone()
    };

    let mut bench_config = StreamBenchmarkConfig::from(&config.harness);
    bench_config.output_dir = args.output_dir.clone();
    let runner = StreamBenchmarkRunner::new(bench_config, config);
    let report = runner.run_all(&dataset, &kinds)?;

    info!("==============================");
    for result in &report.results {
        let purity = result
            .purity
            .as_ref()
            .map(|p| format!("{:.4}", p.purity))
            .unwrap_or_else(|| "N/A".to_string());
        info!(
            "{:<24} {:>10.1} ms  {:>6} centers  purity {}",
            result.algorithm.slug(),
            result.elapsed_ms,
            result.num_centers,
            purity
        );
    }

    if let Some(path) = &args.report {
        report
            .save(path)
            .with_context(|| format!("writing report {}", path.display()))?;
        info!("Results saved to: {}", path.display());
    }

    Ok(())
}

/// Install the fmt subscriber. RUST_LOG takes precedence over
/// `logging.level`; `--verbose` forces debug.
fn init_logging(logging: &LoggingConfig, verbose: bool) -> anyhow::Result<()> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&logging.level))
            .unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let builder = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_file(logging.include_location)
        .with_line_number(logging.include_location);

    let installed = match logging.format {
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Full => builder.try_init(),
    };
    installed.map_err(|e| anyhow::anyhow!("installing tracing subscriber: {}", e))
}

/// Apply CLI overrides on top of the loaded config. Only flags that were
/// given replace config values.
fn apply_overrides(config: &mut StreamClusterConfig, args: &Args) {
    if let Some(batch_size) = args.batch_size {
        config.harness.batch_size = batch_size;
    }
    if let Some(num_points) = args.num_points {
        config.harness.num_points = num_points;
    }
    if let Some(dim) = args.dim {
        config.harness.dimensions = dim;
    }
    if let Some(seed) = args.seed {
        config.sliding_window.seed = seed;
    }
}
