//! Shared command-line driver for vision task benchmarks.
//!
//! A benchmark binary hands `benchmarker` its run function and default model
//! name. The driver resolves the model, runs the function once per delegate,
//! and reduces each run to one figure with the selected `Mode`. A delegate
//! that fails is logged and recorded; the remaining delegates still run.

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use serde::Serialize;

use crate::delegate::Delegate;
use crate::error::BenchError;
use crate::stats::{check_percentile, LatencyStats, Mode};
use crate::testdata::{get_model_path, get_test_data_path, has_scheme};
use crate::ui::{Ui, UiMode};

#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct BenchmarkArgs {
    /// Benchmarking mode.
    #[arg(long, value_enum, default_value_t = Mode::NthPercentile)]
    pub mode: Mode,
    /// Path to the model. Falls back to the default model when missing.
    #[arg(long)]
    pub model: Option<PathBuf>,
    /// Number of iterations for benchmarking.
    #[arg(long, default_value = "100")]
    pub iterations: NonZeroUsize,
    /// Percentile for benchmarking statistics, within [0, 100].
    #[arg(long, default_value_t = 95.0, value_parser = parse_percentile)]
    pub percentile: f64,
    /// Delegate to benchmark; repeat for several. Defaults to all.
    #[arg(long = "delegate", value_enum)]
    pub delegates: Vec<Delegate>,
    /// Write a JSON report to this path.
    #[arg(long)]
    pub output: Option<PathBuf>,
    /// Progress display on stderr.
    #[arg(long, value_enum, default_value_t = UiMode::Auto, value_name = "MODE")]
    pub ui: UiMode,
}

fn parse_percentile(value: &str) -> Result<f64, String> {
    let percentile: f64 = value.parse().map_err(|e| format!("{e}"))?;
    check_percentile(percentile).map_err(|e| e.to_string())
}

impl BenchmarkArgs {
    /// Reject arguments that would only fail after the benchmarks ran.
    pub fn validate(&self) -> Result<(), BenchError> {
        check_percentile(self.percentile)?;
        Ok(())
    }

    /// Delegates to run, in order, without duplicates.
    pub fn selected_delegates(&self) -> Vec<Delegate> {
        if self.delegates.is_empty() {
            return Delegate::ALL.to_vec();
        }
        let mut selected = Vec::new();
        for delegate in &self.delegates {
            if !selected.contains(delegate) {
                selected.push(*delegate);
            }
        }
        selected
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Ok { value_ms: f64, latency: LatencyStats },
    Failed { error: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct DelegateResult {
    pub delegate: Delegate,
    #[serde(flatten)]
    pub outcome: Outcome,
}

#[derive(Debug, Clone, Serialize)]
pub struct BenchmarkReport {
    pub model: PathBuf,
    pub mode: Mode,
    pub percentile: Option<f64>,
    pub iterations: usize,
    pub results: Vec<DelegateResult>,
}

impl BenchmarkReport {
    pub fn succeeded(&self) -> impl Iterator<Item = (Delegate, f64)> + '_ {
        self.results.iter().filter_map(|r| match r.outcome {
            Outcome::Ok { value_ms, .. } => Some((r.delegate, value_ms)),
            Outcome::Failed { .. } => None,
        })
    }

    /// Error unless at least one delegate produced a result.
    pub fn ensure_any_succeeded(&self) -> Result<()> {
        if self.succeeded().next().is_none() {
            return Err(anyhow!(
                "benchmark failed on every delegate for {}",
                self.model.display()
            ));
        }
        Ok(())
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
    }
}

impl std::fmt::Display for BenchmarkReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (delegate, value_ms) in self.succeeded() {
            writeln!(
                f,
                "Inference time {} {}: {:.6} milliseconds",
                delegate, self.mode, value_ms
            )?;
        }
        Ok(())
    }
}

/// Resolve the model to benchmark: an existing `--model`, otherwise the
/// default model found under `test_data_dir`.
pub fn resolve_model_path(
    custom_model: Option<&Path>,
    test_data_dir: &Path,
    default_model_name: &str,
) -> Result<PathBuf> {
    if let Some(path) = custom_model.filter(|p| p.exists() || has_scheme(p)) {
        return Ok(path.to_path_buf());
    }
    let default_model_path = get_test_data_path(test_data_dir, default_model_name)
        .with_context(|| format!("default model {default_model_name} is unavailable"))?;
    Ok(get_model_path(custom_model, &default_model_path))
}

/// Run `benchmark` for every selected delegate and collect the results.
pub fn benchmarker<F>(
    args: &BenchmarkArgs,
    test_data_dir: &Path,
    default_model_name: &str,
    ui: &Ui,
    mut benchmark: F,
) -> Result<BenchmarkReport>
where
    F: FnMut(&Path, NonZeroUsize, Delegate) -> Result<Vec<Duration>, BenchError>,
{
    args.validate()?;
    let model_path = resolve_model_path(args.model.as_deref(), test_data_dir, default_model_name)?;
    log::info!(
        "benchmarking {} for {} iterations ({})",
        model_path.display(),
        args.iterations,
        args.mode
    );

    let mut results = Vec::new();
    for delegate in args.selected_delegates() {
        let outcome = ui.run_stage(&format!("Benchmark {delegate}"), || {
            benchmark(&model_path, args.iterations, delegate)
                .and_then(|times| summarize(&times, args))
        });
        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(e) => {
                log::error!("failed to run benchmark on {}: {}", delegate, e);
                Outcome::Failed {
                    error: e.to_string(),
                }
            }
        };
        results.push(DelegateResult { delegate, outcome });
    }

    Ok(BenchmarkReport {
        model: model_path,
        mode: args.mode,
        percentile: matches!(args.mode, Mode::NthPercentile).then_some(args.percentile),
        iterations: args.iterations.get(),
        results,
    })
}

fn summarize(times: &[Duration], args: &BenchmarkArgs) -> Result<Outcome, BenchError> {
    Ok(Outcome::Ok {
        value_ms: args.mode.reduce(times, args.percentile)?,
        latency: LatencyStats::from_durations(times)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> BenchmarkArgs {
        let mut argv = vec!["bench"];
        argv.extend_from_slice(extra);
        BenchmarkArgs::try_parse_from(argv).unwrap()
    }

    fn quiet() -> Ui {
        Ui::new(UiMode::Plain, false, false)
    }

    #[test]
    fn parses_defaults() {
        let a = args(&[]);
        assert_eq!(a.mode, Mode::NthPercentile);
        assert_eq!(a.iterations.get(), 100);
        assert_eq!(a.percentile, 95.0);
        assert_eq!(a.selected_delegates(), Delegate::ALL.to_vec());
    }

    #[test]
    fn parses_overrides() {
        let a = args(&[
            "--mode",
            "average",
            "--iterations",
            "7",
            "--delegate",
            "gpu",
            "--delegate",
            "gpu",
            "--model",
            "stub://cats",
        ]);
        assert_eq!(a.mode, Mode::Average);
        assert_eq!(a.iterations.get(), 7);
        assert_eq!(a.selected_delegates(), vec![Delegate::Gpu]);
        assert_eq!(a.model.as_deref(), Some(Path::new("stub://cats")));
    }

    #[test]
    fn rejects_zero_iterations() {
        assert!(BenchmarkArgs::try_parse_from(["bench", "--iterations", "0"]).is_err());
    }

    #[test]
    fn rejects_out_of_range_percentile_at_parse_time() {
        assert!(BenchmarkArgs::try_parse_from(["bench", "--percentile", "150"]).is_err());
        assert!(BenchmarkArgs::try_parse_from(["bench", "--percentile", "NaN"]).is_err());
        assert_eq!(args(&["--percentile", "99.9"]).percentile, 99.9);
    }

    #[test]
    fn bad_percentile_fails_before_any_benchmark_runs() {
        let mut a = args(&["--model", "stub://cats", "--iterations", "50"]);
        a.percentile = 150.0;
        let mut calls = 0;
        let err = benchmarker(&a, Path::new("unused"), "unused.onnx", &quiet(), |_, n, _| {
            calls += 1;
            Ok(vec![Duration::from_millis(1); n.get()])
        })
        .unwrap_err();

        assert_eq!(calls, 0);
        assert!(err.to_string().contains("percentile"));
    }

    #[test]
    fn parses_ui_mode() {
        assert_eq!(args(&[]).ui, UiMode::Auto);
        assert_eq!(args(&["--ui", "pretty"]).ui, UiMode::Pretty);
        assert!(BenchmarkArgs::try_parse_from(["bench", "--ui", "fancy"]).is_err());
    }

    #[test]
    fn failed_delegate_does_not_stop_the_others() {
        let a = args(&["--model", "stub://cats", "--iterations", "3"]);
        let report = benchmarker(&a, Path::new("unused"), "unused.onnx", &quiet(), |_, n, d| {
            match d {
                Delegate::Cpu => Ok(vec![Duration::from_millis(2); n.get()]),
                Delegate::Gpu => Err(BenchError::UnsupportedDelegate {
                    backend: "tract",
                    delegate: d,
                }),
            }
        })
        .unwrap();

        assert_eq!(report.results.len(), 2);
        let ok: Vec<_> = report.succeeded().collect();
        assert_eq!(ok.len(), 1);
        assert_eq!(ok[0].0, Delegate::Cpu);
        assert!((ok[0].1 - 2.0).abs() < 1e-9);
        assert!(matches!(report.results[1].outcome, Outcome::Failed { .. }));
        report.ensure_any_succeeded().unwrap();

        let printed = report.to_string();
        assert!(printed.starts_with("Inference time CPU nth_percentile: 2.000000 milliseconds"));
        assert!(!printed.contains("GPU"));
    }

    #[test]
    fn all_failed_is_an_error() {
        let a = args(&["--model", "stub://cats", "--delegate", "cpu"]);
        let report = benchmarker(&a, Path::new("unused"), "unused.onnx", &quiet(), |_, _, _| {
            Err(BenchError::Inference("boom".into()))
        })
        .unwrap();
        assert!(report.ensure_any_succeeded().is_err());
    }

    #[test]
    fn missing_default_model_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let a = args(&[]);
        let err = benchmarker(&a, dir.path(), "efficientdet_lite0.onnx", &quiet(), |_, _, _| {
            Ok(Vec::new())
        })
        .unwrap_err();
        assert!(format!("{err:#}").contains("efficientdet_lite0.onnx"));
    }

    #[test]
    fn report_saves_as_json() {
        let dir = tempfile::tempdir().unwrap();
        let a = args(&["--model", "stub://cats", "--delegate", "cpu", "--iterations", "2"]);
        let report = benchmarker(&a, dir.path(), "unused.onnx", &quiet(), |_, n, _| {
            Ok(vec![Duration::from_millis(1); n.get()])
        })
        .unwrap();

        let path = dir.path().join("out").join("report.json");
        report.save(&path).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["iterations"], 2);
        assert_eq!(json["mode"], "nth_percentile");
        assert_eq!(json["results"][0]["delegate"], "cpu");
        assert_eq!(json["results"][0]["status"], "ok");
    }
}
