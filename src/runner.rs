//! Object detector benchmark task.
//!
//! One run builds a detector for the requested model and delegate, decodes
//! the fixed test image once, and times `detect` on that image. The detector
//! lives only inside `run`; it is released before `run` returns, whether the
//! run succeeded or not.

use std::num::NonZeroUsize;
use std::path::Path;
use std::time::Duration;

use crate::config::BenchConfig;
use crate::delegate::Delegate;
use crate::detect::{BackendRegistry, ObjectDetector};
use crate::error::Result;
use crate::frame::Image;
use crate::options::{BaseOptions, DetectorOptions};
use crate::testdata::{get_test_data_path, IMAGE_FILE};
use crate::timing::benchmark_task;

/// Object detector benchmark bound to a configuration and backend set.
pub struct ObjectDetectorBenchmark {
    config: BenchConfig,
    registry: BackendRegistry,
}

impl ObjectDetectorBenchmark {
    pub fn new(config: BenchConfig, registry: BackendRegistry) -> Self {
        Self { config, registry }
    }

    /// Configuration from the environment and every compiled-in backend.
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(BenchConfig::load()?, BackendRegistry::with_defaults()))
    }

    pub fn config(&self) -> &BenchConfig {
        &self.config
    }

    /// Time `n_iterations` detections of the fixed test image.
    pub fn run(
        &self,
        model_path: &Path,
        n_iterations: NonZeroUsize,
        delegate: Delegate,
    ) -> Result<Vec<Duration>> {
        let options = DetectorOptions::new(BaseOptions::new(model_path, delegate))
            .with_settings(self.config.detector.clone());

        let mut detector = ObjectDetector::create_with_registry(&self.registry, options)?;
        let image_path = get_test_data_path(&self.config.test_data_dir, IMAGE_FILE)?;
        let image = Image::create_from_file(&image_path)?;
        log::debug!(
            "benchmarking {} on {} ({} iterations, input {})",
            detector.backend_name(),
            delegate,
            n_iterations,
            hex::encode(&image.fingerprint()[..8])
        );

        benchmark_task(|img| detector.detect(img), &image, n_iterations)
    }
}

/// Run the object detector benchmark with configuration from the
/// environment.
pub fn run(model_path: &Path, n_iterations: NonZeroUsize, delegate: Delegate) -> Result<Vec<Duration>> {
    ObjectDetectorBenchmark::from_env()?.run(model_path, n_iterations, delegate)
}
