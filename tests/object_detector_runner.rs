use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use image::{Rgb, RgbImage};
use tempfile::TempDir;

use detector_bench::{
    BackendProvider, BackendRegistry, BenchConfig, BenchError, Delegate, Detection,
    DetectorBackend, DetectorOptions, Image, ObjectDetectorBenchmark, IMAGE_FILE,
};

const STUB_MODEL: &str = "stub://efficientdet_lite0";

fn iterations(n: usize) -> NonZeroUsize {
    NonZeroUsize::new(n).unwrap()
}

fn test_data_dir() -> TempDir {
    let dir = tempfile::tempdir().expect("temp dir");
    let vision = dir.path().join("vision");
    std::fs::create_dir_all(&vision).unwrap();
    RgbImage::from_fn(64, 48, |x, y| Rgb([x as u8 * 4, y as u8 * 5, 128]))
        .save(vision.join(IMAGE_FILE))
        .expect("write test image");
    dir
}

fn config(dir: &Path) -> BenchConfig {
    BenchConfig {
        test_data_dir: dir.to_path_buf(),
        ..BenchConfig::default()
    }
}

/// Provider whose backends count themselves and can fail on a chosen call.
struct Tracked {
    live: Arc<AtomicUsize>,
    fingerprints: Arc<Mutex<Vec<[u8; 32]>>>,
    fail_on_call: Option<usize>,
}

struct TrackedBackend {
    live: Arc<AtomicUsize>,
    fingerprints: Arc<Mutex<Vec<[u8; 32]>>>,
    fail_on_call: Option<usize>,
    calls: usize,
}

impl BackendProvider for Tracked {
    fn name(&self) -> &'static str {
        "tracked"
    }

    fn accepts(&self, model_path: &Path) -> bool {
        model_path.to_str().is_some_and(|p| p.starts_with("tracked://"))
    }

    fn supports(&self, _delegate: Delegate) -> bool {
        true
    }

    fn create(&self, _options: &DetectorOptions) -> detector_bench::Result<Box<dyn DetectorBackend>> {
        self.live.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(TrackedBackend {
            live: self.live.clone(),
            fingerprints: self.fingerprints.clone(),
            fail_on_call: self.fail_on_call,
            calls: 0,
        }))
    }
}

impl DetectorBackend for TrackedBackend {
    fn name(&self) -> &'static str {
        "tracked"
    }

    fn delegate(&self) -> Delegate {
        Delegate::Cpu
    }

    fn detect(&mut self, image: &Image) -> detector_bench::Result<Vec<Detection>> {
        self.calls += 1;
        self.fingerprints.lock().unwrap().push(image.fingerprint());
        if self.fail_on_call == Some(self.calls) {
            return Err(BenchError::Inference(format!("call {} failed", self.calls)));
        }
        Ok(Vec::new())
    }
}

impl Drop for TrackedBackend {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

fn tracked(fail_on_call: Option<usize>) -> (Tracked, Arc<AtomicUsize>, Arc<Mutex<Vec<[u8; 32]>>>) {
    let live = Arc::new(AtomicUsize::new(0));
    let fingerprints = Arc::new(Mutex::new(Vec::new()));
    let provider = Tracked {
        live: live.clone(),
        fingerprints: fingerprints.clone(),
        fail_on_call,
    };
    (provider, live, fingerprints)
}

fn bench_with(dir: &Path, provider: Tracked) -> ObjectDetectorBenchmark {
    let mut registry = BackendRegistry::new();
    registry.register(provider);
    ObjectDetectorBenchmark::new(config(dir), registry)
}

#[test]
fn cpu_run_returns_one_duration_per_iteration() {
    let dir = test_data_dir();
    let bench = ObjectDetectorBenchmark::new(config(dir.path()), BackendRegistry::with_defaults());

    let times = bench
        .run(Path::new(STUB_MODEL), iterations(5), Delegate::Cpu)
        .expect("cpu run");
    assert_eq!(times.len(), 5);
    assert!(times.iter().all(|t| *t >= Duration::ZERO));
}

#[test]
fn repeated_runs_are_independent_and_equal_length() {
    let dir = test_data_dir();
    let bench = ObjectDetectorBenchmark::new(config(dir.path()), BackendRegistry::with_defaults());
    let model = Path::new(STUB_MODEL);

    let first = bench.run(model, iterations(3), Delegate::Gpu).unwrap();
    let second = bench.run(model, iterations(3), Delegate::Gpu).unwrap();
    assert_eq!(first.len(), 3);
    assert_eq!(first.len(), second.len());
}

#[test]
fn same_image_is_used_for_every_iteration() {
    let dir = test_data_dir();
    let (provider, _live, fingerprints) = tracked(None);
    let bench = bench_with(dir.path(), provider);

    bench
        .run(Path::new("tracked://model"), iterations(8), Delegate::Cpu)
        .unwrap();

    let expected = Image::create_from_file(dir.path().join("vision").join(IMAGE_FILE))
        .unwrap()
        .fingerprint();
    let seen = fingerprints.lock().unwrap();
    assert_eq!(seen.len(), 8);
    assert!(seen.iter().all(|f| *f == expected));
}

#[test]
fn detector_is_released_after_success_and_failure() {
    let dir = test_data_dir();

    let (provider, live, _) = tracked(None);
    bench_with(dir.path(), provider)
        .run(Path::new("tracked://model"), iterations(4), Delegate::Cpu)
        .unwrap();
    assert_eq!(live.load(Ordering::SeqCst), 0);

    let (provider, live, fingerprints) = tracked(Some(3));
    let err = bench_with(dir.path(), provider)
        .run(Path::new("tracked://model"), iterations(10), Delegate::Cpu)
        .unwrap_err();
    assert!(matches!(err, BenchError::Inference(_)));
    assert_eq!(fingerprints.lock().unwrap().len(), 3);
    assert_eq!(live.load(Ordering::SeqCst), 0);
}

#[test]
fn detector_is_released_when_image_is_missing() {
    let empty = tempfile::tempdir().unwrap();
    let (provider, live, fingerprints) = tracked(None);

    let err = bench_with(empty.path(), provider)
        .run(Path::new("tracked://model"), iterations(2), Delegate::Cpu)
        .unwrap_err();
    assert!(matches!(err, BenchError::TestDataNotFound { .. }));
    assert!(fingerprints.lock().unwrap().is_empty());
    assert_eq!(live.load(Ordering::SeqCst), 0);
}

#[test]
fn invalid_model_fails_before_any_timing() {
    // No test image either: the model error must surface first.
    let empty = tempfile::tempdir().unwrap();
    let bench = ObjectDetectorBenchmark::new(config(empty.path()), BackendRegistry::with_defaults());

    let err = bench
        .run(
            Path::new("/nonexistent/models/efficientdet_lite0.onnx"),
            iterations(5),
            Delegate::Cpu,
        )
        .unwrap_err();
    assert!(err.is_configuration(), "unexpected error: {err}");
}

#[cfg(feature = "backend-tract")]
#[test]
fn gpu_delegate_is_rejected_by_tract() {
    let dir = test_data_dir();
    let bench = ObjectDetectorBenchmark::new(config(dir.path()), BackendRegistry::with_defaults());

    let err = bench
        .run(Path::new("models/efficientdet_lite0.onnx"), iterations(1), Delegate::Gpu)
        .unwrap_err();
    assert!(matches!(
        err,
        BenchError::UnsupportedDelegate {
            backend: "tract",
            delegate: Delegate::Gpu
        }
    ));
}

#[test]
fn unknown_model_scheme_without_catch_all_is_config_error() {
    let dir = test_data_dir();
    let (provider, live, _) = tracked(None);
    let err = bench_with(dir.path(), provider)
        .run(Path::new("other://model"), iterations(1), Delegate::Cpu)
        .unwrap_err();
    assert!(matches!(err, BenchError::Config(_)));
    assert_eq!(live.load(Ordering::SeqCst), 0);
}
