//! Configuration for streaming clustering runs.

use serde::{Deserialize, Serialize};

use crate::clustering::{
    CfTreeParams, DecayTreeParams, DensityGridParams, MicroClusterWindowParams,
    SlidingWindowParams, TemporalMicroClusterParams,
};
use crate::error::{ClusterError, ClusterResult};

/// Main configuration structure.
///
/// Every section is optional in files; missing sections take their defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct StreamClusterConfig {
    pub harness: HarnessConfig,
    pub logging: LoggingConfig,
    pub cf_tree: CfTreeParams,
    pub micro_cluster_window: MicroClusterWindowParams,
    pub temporal_micro_cluster: TemporalMicroClusterParams,
    pub density_grid: DensityGridParams,
    pub decay_tree: DecayTreeParams,
    pub sliding_window: SlidingWindowParams,
}

impl StreamClusterConfig {
    /// Load configuration from files and environment.
    ///
    /// Configuration is loaded in order:
    /// 1. config/default.toml (base settings)
    /// 2. config/{STREAMCLUST_ENV}.toml (environment-specific)
    /// 3. Environment variables with the STREAMCLUST prefix and `__` between
    ///    prefix, section and key (e.g. `STREAMCLUST__HARNESS__BATCH_SIZE=500`)
    pub fn load() -> ClusterResult<Self> {
        let env = std::env::var("STREAMCLUST_ENV").unwrap_or_else(|_| "development".to_string());

        let builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{}", env)).required(false))
            .add_source(config::Environment::with_prefix("STREAMCLUST").separator("__"));

        let config: StreamClusterConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: &std::path::Path) -> ClusterResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ClusterError::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        let config: StreamClusterConfig = toml::from_str(&content)
            .map_err(|e| ClusterError::Config(format!("Failed to parse config file: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate every section.
    pub fn validate(&self) -> ClusterResult<()> {
        self.harness.validate()?;
        self.cf_tree.validate()?;
        self.micro_cluster_window.validate()?;
        self.temporal_micro_cluster.validate()?;
        self.density_grid.validate()?;
        self.decay_tree.validate()?;
        self.sliding_window.validate()?;
        Ok(())
    }
}

/// Settings of the batch driver.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Points handed to `cluster()` per call.
    pub batch_size: usize,
    /// Stream length when generating synthetic data.
    pub num_points: usize,
    /// Dimensionality of synthetic data.
    pub dimensions: usize,
    /// Purity is skipped when an algorithm reports more centers than this.
    pub max_centers_for_purity: usize,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            num_points: 100_000,
            dimensions: 3,
            max_centers_for_purity: 1000,
        }
    }
}

impl HarnessConfig {
    fn validate(&self) -> ClusterResult<()> {
        if self.batch_size == 0 {
            return Err(ClusterError::Config(
                "harness.batch_size must be greater than 0".into(),
            ));
        }
        if self.dimensions == 0 {
            return Err(ClusterError::Config(
                "harness.dimensions must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive, used when RUST_LOG is unset.
    pub level: String,
    pub format: LogFormat,
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            include_location: false,
        }
    }
}

/// Output layout of the fmt subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Multi-line, human-oriented.
    #[default]
    Pretty,
    /// One line per event.
    Compact,
    /// Default single-line layout.
    Full,
}
