//! Benchmark runners.

pub mod stream;

pub use stream::{BenchmarkReport, RunResult, StreamBenchmarkConfig, StreamBenchmarkRunner};
