//! Generic timing loop.
//!
//! `benchmark_task` knows nothing about detection: it repeats any
//! `FnMut(&I) -> Result<O, E>` against one shared input and records the
//! wall-clock duration of every call. Reducing the durations to a summary is
//! left to `stats`.

use std::hint::black_box;
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

/// Call `task` exactly `n_iterations` times and return one duration per
/// call, in call order.
///
/// The same `input` reference is passed to every call. The first failing
/// call aborts the loop and its error is returned.
pub fn benchmark_task<I, O, E, F>(
    mut task: F,
    input: &I,
    n_iterations: NonZeroUsize,
) -> Result<Vec<Duration>, E>
where
    I: ?Sized,
    F: FnMut(&I) -> Result<O, E>,
{
    let mut inference_times = Vec::with_capacity(n_iterations.get());
    for iteration in 0..n_iterations.get() {
        let start = Instant::now();
        let output = task(input)?;
        let elapsed = start.elapsed();
        black_box(output);
        log::trace!("iteration {} took {:?}", iteration, elapsed);
        inference_times.push(elapsed);
    }
    Ok(inference_times)
}

/// Durations as fractional milliseconds.
pub fn as_millis(times: &[Duration]) -> Vec<f64> {
    times.iter().map(|d| d.as_secs_f64() * 1000.0).collect()
}
