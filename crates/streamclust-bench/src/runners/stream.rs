//! Batched stream benchmark runner.
//!
//! Feeds a dataset through one algorithm at a time in fixed-size batches,
//! preserving stream order, and records:
//! - wall-clock time of the clustering phase
//! - number of centers and retained summary units
//! - purity against ground-truth labels, when the center count allows it
//!
//! Centers can be persisted to `<output_dir>/<slug>.centers`, one center per
//! line with whitespace-separated coordinates.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use streamclust_core::{Algorithm, AlgorithmKind, HarnessConfig, Point, StreamClusterConfig, StreamClusterer};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::datasets::{Dataset, DatasetSummary};
use crate::error::BenchResult;
use crate::metrics::purity::{evaluate_purity, group_by_centers, PurityReport};
use crate::util::{format_center, throughput};

/// Configuration for stream benchmark runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamBenchmarkConfig {
    /// Points per `cluster()` call.
    pub batch_size: usize,

    /// Purity is evaluated only for 0 < centers <= this.
    pub max_centers_for_purity: usize,

    /// Directory for `.centers` files; None disables persistence.
    pub output_dir: Option<PathBuf>,
}

impl Default for StreamBenchmarkConfig {
    fn default() -> Self {
        Self::from(&HarnessConfig::default())
    }
}

impl From<&HarnessConfig> for StreamBenchmarkConfig {
    fn from(harness: &HarnessConfig) -> Self {
        Self {
            batch_size: harness.batch_size,
            max_centers_for_purity: harness.max_centers_for_purity,
            output_dir: None,
        }
    }
}

/// Outcome of running one algorithm over one dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    pub algorithm: AlgorithmKind,
    pub num_points: usize,
    pub num_batches: usize,
    /// Clustering time only; excludes center extraction and evaluation.
    pub elapsed_ms: f64,
    pub throughput_pts_per_sec: f64,
    pub num_centers: usize,
    pub summary_len: usize,
    /// None when the center count is 0 or above the purity limit.
    pub purity: Option<PurityReport>,
    pub centers_path: Option<PathBuf>,
}

/// Aggregate report over all algorithms run on a dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub dataset: DatasetSummary,
    pub results: Vec<RunResult>,
}

impl BenchmarkReport {
    /// Write the report as pretty JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> BenchResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

/// Runner for batched stream benchmarks.
pub struct StreamBenchmarkRunner {
    config: StreamBenchmarkConfig,
    algorithms: StreamClusterConfig,
}

impl StreamBenchmarkRunner {
    /// Create a new runner.
    pub fn new(config: StreamBenchmarkConfig, algorithms: StreamClusterConfig) -> Self {
        Self { config, algorithms }
    }

    /// Run one algorithm over the dataset.
    pub fn run(&self, dataset: &Dataset, kind: AlgorithmKind) -> BenchResult<RunResult> {
        let mut algo = Algorithm::build(kind, dataset.dim, &self.algorithms)?;
        let batch_size = self.config.batch_size.max(1);
        info!(algorithm = %kind, points = dataset.points.len(), batch_size, "Running");

        let start = Instant::now();
        let mut num_batches = 0;
        for batch in dataset.points.chunks(batch_size) {
            algo.cluster(batch);
            num_batches += 1;
            debug!(
                algorithm = %kind,
                progress = num_batches * batch_size,
                total = dataset.points.len(),
                "Batch done"
            );
        }
        let elapsed = start.elapsed();

        let centers = algo.output_centers();
        info!(
            algorithm = %kind,
            elapsed_ms = elapsed.as_secs_f64() * 1000.0,
            centers = centers.len(),
            summary_len = algo.summary_len(),
            "Execution finished"
        );

        let centers_path = match &self.config.output_dir {
            Some(dir) => Some(write_centers(dir, kind, &centers)?),
            None => None,
        };

        let purity = if !centers.is_empty() && centers.len() <= self.config.max_centers_for_purity {
            let predicts = group_by_centers(&dataset.points, &centers);
            let report = evaluate_purity(
                &dataset.points,
                &predicts,
                dataset.num_true_clusters,
                centers.len(),
            );
            info!(algorithm = %kind, purity = report.purity, "Purity");
            Some(report)
        } else {
            warn!(
                algorithm = %kind,
                centers = centers.len(),
                limit = self.config.max_centers_for_purity,
                "Purity not evaluated: center count out of range"
            );
            None
        };

        Ok(RunResult {
            algorithm: kind,
            num_points: dataset.points.len(),
            num_batches,
            elapsed_ms: elapsed.as_secs_f64() * 1000.0,
            throughput_pts_per_sec: throughput(dataset.points.len(), elapsed),
            num_centers: centers.len(),
            summary_len: algo.summary_len(),
            purity,
            centers_path,
        })
    }

    /// Run each algorithm in turn and aggregate a report.
    pub fn run_all(&self, dataset: &Dataset, kinds: &[AlgorithmKind]) -> BenchResult<BenchmarkReport> {
        let results = kinds
            .iter()
            .map(|&kind| self.run(dataset, kind))
            .collect::<BenchResult<Vec<_>>>()?;

        Ok(BenchmarkReport {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            dataset: dataset.summary(),
            results,
        })
    }
}

/// Write centers to `<dir>/<slug>.centers`.
pub fn write_centers(dir: &Path, kind: AlgorithmKind, centers: &[Point]) -> BenchResult<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("{}.centers", kind.slug()));
    let mut out = BufWriter::new(fs::File::create(&path)?);
    for center in centers {
        writeln!(out, "{}", format_center(center))?;
    }
    out.flush()?;
    debug!(path = %path.display(), centers = centers.len(), "Saved centers");
    Ok(path)
}
