//! Reduction of per-iteration durations to summary figures.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{BenchError, Result};
use crate::timing::as_millis;

/// How the driver reduces a run to one number.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[value(name = "nth_percentile")]
    NthPercentile,
    Average,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::NthPercentile => "nth_percentile",
            Mode::Average => "average",
        }
    }

    /// Reduce durations to milliseconds. `percentile` is ignored for
    /// `Average`.
    pub fn reduce(&self, times: &[Duration], percentile: f64) -> Result<f64> {
        match self {
            Mode::NthPercentile => nth_percentile(times, percentile),
            Mode::Average => average(times),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `percentile`-th percentile in milliseconds, linearly interpolated
/// between the two closest ranks.
pub fn nth_percentile(times: &[Duration], percentile: f64) -> Result<f64> {
    check_percentile(percentile)?;
    let sorted = sorted_millis(times)?;
    Ok(interpolate(&sorted, percentile))
}

/// Reject percentiles outside `[0, 100]`, NaN included.
pub fn check_percentile(percentile: f64) -> Result<f64> {
    if !(0.0..=100.0).contains(&percentile) {
        return Err(BenchError::InvalidArgument(format!(
            "percentile must be within [0, 100], got {percentile}"
        )));
    }
    Ok(percentile)
}

/// Arithmetic mean in milliseconds.
pub fn average(times: &[Duration]) -> Result<f64> {
    let ms = sorted_millis(times)?;
    Ok(ms.iter().sum::<f64>() / ms.len() as f64)
}

fn sorted_millis(times: &[Duration]) -> Result<Vec<f64>> {
    if times.is_empty() {
        return Err(BenchError::InvalidArgument(
            "no timing measurements to summarize".into(),
        ));
    }
    let mut ms = as_millis(times);
    ms.sort_by(f64::total_cmp);
    Ok(ms)
}

fn interpolate(sorted: &[f64], percentile: f64) -> f64 {
    let rank = percentile / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64)
}

/// Full latency profile of a run, in milliseconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LatencyStats {
    pub mean_ms: f64,
    /// Population standard deviation.
    pub std_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
    pub p50_ms: f64,
    pub p95_ms: f64,
    pub p99_ms: f64,
}

impl LatencyStats {
    pub fn from_durations(times: &[Duration]) -> Result<Self> {
        let sorted = sorted_millis(times)?;
        let n = sorted.len() as f64;
        let mean = sorted.iter().sum::<f64>() / n;
        let variance = sorted.iter().map(|t| (t - mean).powi(2)).sum::<f64>() / n;
        Ok(Self {
            mean_ms: mean,
            std_ms: variance.sqrt(),
            min_ms: sorted[0],
            max_ms: sorted[sorted.len() - 1],
            p50_ms: interpolate(&sorted, 50.0),
            p95_ms: interpolate(&sorted, 95.0),
            p99_ms: interpolate(&sorted, 99.0),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(values: &[u64]) -> Vec<Duration> {
        values.iter().map(|v| Duration::from_millis(*v)).collect()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn percentile_interpolates_between_ranks() {
        let times = ms(&[40, 10, 30, 20]);
        assert!(close(nth_percentile(&times, 0.0).unwrap(), 10.0));
        assert!(close(nth_percentile(&times, 50.0).unwrap(), 25.0));
        assert!(close(nth_percentile(&times, 95.0).unwrap(), 38.5));
        assert!(close(nth_percentile(&times, 100.0).unwrap(), 40.0));
    }

    #[test]
    fn single_sample_is_every_percentile() {
        let times = ms(&[7]);
        assert!(close(nth_percentile(&times, 95.0).unwrap(), 7.0));
        assert!(close(average(&times).unwrap(), 7.0));
    }

    #[test]
    fn rejects_bad_input() {
        assert!(nth_percentile(&[], 95.0).is_err());
        assert!(average(&[]).is_err());
        assert!(nth_percentile(&ms(&[1]), 101.0).is_err());
        assert!(check_percentile(f64::NAN).is_err());
        assert!(check_percentile(-0.5).is_err());
        assert_eq!(check_percentile(100.0).unwrap(), 100.0);
    }

    #[test]
    fn mode_dispatch() {
        let times = ms(&[10, 20, 30]);
        assert!(close(Mode::Average.reduce(&times, 95.0).unwrap(), 20.0));
        assert!(close(Mode::NthPercentile.reduce(&times, 50.0).unwrap(), 20.0));
        assert_eq!(Mode::NthPercentile.to_string(), "nth_percentile");
    }

    #[test]
    fn latency_stats_profile() {
        let stats = LatencyStats::from_durations(&ms(&[2, 4, 4, 4, 5, 5, 7, 9])).unwrap();
        assert!(close(stats.mean_ms, 5.0));
        assert!(close(stats.std_ms, 2.0));
        assert!(close(stats.min_ms, 2.0));
        assert!(close(stats.max_ms, 9.0));
        assert!(close(stats.p50_ms, 4.5));
    }
}
