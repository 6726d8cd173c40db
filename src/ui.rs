//! Stage progress on stderr.
//!
//! A stage is opened with `Ui::stage` and closed by dropping the returned
//! guard, or by `StageGuard::fail` when the work behind it failed. Spinners
//! are drawn only when the resolved mode allows them; otherwise each stage is
//! a `==>` line followed by a result line.

use std::fmt::Display;
use std::io::IsTerminal;
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

const TICK: Duration = Duration::from_millis(120);

/// Requested progress style.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum UiMode {
    /// Spinners when both stderr and stdout are terminals. Redirecting the
    /// report keeps stderr to plain lines.
    #[default]
    Auto,
    /// Never draw spinners.
    Plain,
    /// Spinners whenever stderr is a terminal, even with stdout redirected.
    Pretty,
}

impl UiMode {
    fn spinners(self, stderr_is_tty: bool, stdout_is_tty: bool) -> bool {
        match self {
            UiMode::Plain => false,
            UiMode::Pretty => stderr_is_tty,
            UiMode::Auto => stderr_is_tty && stdout_is_tty,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Ui {
    spinners: bool,
}

impl Ui {
    pub fn new(mode: UiMode, stderr_is_tty: bool, stdout_is_tty: bool) -> Self {
        Self {
            spinners: mode.spinners(stderr_is_tty, stdout_is_tty),
        }
    }

    /// Resolve `mode` against the process's own stdout and stderr.
    pub fn for_terminal(mode: UiMode) -> Self {
        Self::new(
            mode,
            std::io::stderr().is_terminal(),
            std::io::stdout().is_terminal(),
        )
    }

    pub fn stage(&self, name: &str) -> StageGuard {
        let spinner = self.spinners.then(|| {
            let spinner = ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr());
            spinner.set_style(
                ProgressStyle::with_template("{spinner} {msg} [{elapsed}]")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            spinner.set_message(name.to_string());
            spinner.enable_steady_tick(TICK);
            spinner
        });
        if spinner.is_none() {
            eprintln!("==> {name}");
        }
        StageGuard {
            name: name.to_string(),
            started: Instant::now(),
            spinner,
            failure: None,
        }
    }

    /// Run `work` inside a stage, marking the stage failed when it errors.
    pub fn run_stage<T, E: Display>(
        &self,
        name: &str,
        work: impl FnOnce() -> Result<T, E>,
    ) -> Result<T, E> {
        let stage = self.stage(name);
        let result = work();
        if let Err(e) = &result {
            stage.fail(e);
        }
        result
    }
}

/// Open stage. Reports success when dropped unless `fail` was called.
pub struct StageGuard {
    name: String,
    started: Instant,
    spinner: Option<ProgressBar>,
    failure: Option<String>,
}

impl StageGuard {
    /// Close the stage as failed.
    pub fn fail(mut self, reason: impl Display) {
        self.failure = Some(reason.to_string());
    }
}

impl Drop for StageGuard {
    fn drop(&mut self) {
        let line = outcome_line(&self.name, self.started.elapsed(), self.failure.as_deref());
        match (&self.spinner, &self.failure) {
            (Some(spinner), None) => spinner.finish_with_message(line),
            (Some(spinner), Some(_)) => spinner.abandon_with_message(line),
            (None, _) => eprintln!("{line}"),
        }
    }
}

fn outcome_line(name: &str, elapsed: Duration, failure: Option<&str>) -> String {
    match failure {
        None => format!("✔ {name} ({})", human_duration(elapsed)),
        Some(reason) => format!("✘ {name} ({}): {reason}", human_duration(elapsed)),
    }
}

fn human_duration(d: Duration) -> String {
    let secs = d.as_secs();
    if secs >= 60 {
        format!("{}m{:02}s", secs / 60, secs % 60)
    } else if secs >= 1 {
        format!("{:.2}s", d.as_secs_f64())
    } else {
        format!("{}ms", d.as_millis())
    }
}
