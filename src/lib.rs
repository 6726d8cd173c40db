//! Object detector inference benchmark.
//!
//! Loads a detection model, runs it repeatedly on one fixed image, and
//! reports per-iteration latency.
//!
//! # Module Structure
//!
//! - `runner`: the benchmark task (build detector, load image, time `detect`)
//! - `timing`: generic "repeat N times and record durations" loop
//! - `driver`: shared CLI driver that runs a task per delegate and summarizes
//! - `detect`: `ObjectDetector`, backend trait, backend registry and backends
//! - `stats`, `testdata`, `config`, `options`, `frame`, `ui`: support

pub mod config;
pub mod delegate;
pub mod detect;
pub mod driver;
pub mod error;
pub mod frame;
pub mod options;
pub mod runner;
pub mod stats;
pub mod testdata;
pub mod timing;
pub mod ui;

pub use config::BenchConfig;
pub use delegate::Delegate;
pub use detect::{
    BackendProvider, BackendRegistry, BoundingBox, Category, Detection, DetectionResult,
    DetectorBackend, LabelMap, ObjectDetector,
};
pub use driver::{benchmarker, BenchmarkArgs, BenchmarkReport};
pub use error::{BenchError, Result};
pub use frame::Image;
pub use options::{BaseOptions, DetectorOptions, DetectorSettings, InputSpec, TensorLayout};
pub use runner::{run, ObjectDetectorBenchmark};
pub use stats::{LatencyStats, Mode};
pub use testdata::{IMAGE_FILE, MODEL_FILE, VISION_TEST_DATA_DIR};
pub use timing::benchmark_task;
