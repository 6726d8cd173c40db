//! object_detector_benchmark - time object detection on the bundled test image
//!
//! Runs the detector once per delegate (CPU, then GPU unless `--delegate`
//! narrows it) and prints one summary line per delegate that succeeded.

use anyhow::Result;
use clap::Parser;

use detector_bench::ui::Ui;
use detector_bench::{benchmarker, BenchmarkArgs, ObjectDetectorBenchmark, MODEL_FILE};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = BenchmarkArgs::parse();
    let ui = Ui::for_terminal(args.ui);

    let bench = ui.run_stage("Load configuration", ObjectDetectorBenchmark::from_env)?;
    let test_data_dir = bench.config().test_data_dir.clone();

    let report = benchmarker(&args, &test_data_dir, MODEL_FILE, &ui, |model, n, delegate| {
        bench.run(model, n, delegate)
    })?;

    print!("{report}");
    if let Some(path) = &args.output {
        report.save(path)?;
        log::info!("report written to {}", path.display());
    }
    report.ensure_any_succeeded()
}
