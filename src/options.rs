//! Detector configuration.
//!
//! `DetectorOptions` binds a model file and a delegate together with the
//! post-processing knobs applied to every `detect` call. Options are checked
//! by `validate` before a backend is created, so a bad option never costs a
//! model load.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::delegate::Delegate;
use crate::detect::labels::LabelMap;
use crate::error::{BenchError, Result};

pub const DEFAULT_INPUT_WIDTH: u32 = 320;
pub const DEFAULT_INPUT_HEIGHT: u32 = 320;
pub const DEFAULT_DISPLAY_NAMES_LOCALE: &str = "en";

/// Model and compute backend shared by every task type.
#[derive(Clone, Debug, PartialEq)]
pub struct BaseOptions {
    pub model_asset_path: PathBuf,
    pub delegate: Delegate,
}

impl BaseOptions {
    pub fn new(model_asset_path: impl Into<PathBuf>, delegate: Delegate) -> Self {
        Self {
            model_asset_path: model_asset_path.into(),
            delegate,
        }
    }
}

/// Memory order of the model's input tensor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TensorLayout {
    /// `[1, 3, H, W]`
    Nchw,
    /// `[1, H, W, 3]`
    #[default]
    Nhwc,
}

impl std::str::FromStr for TensorLayout {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nchw" => Ok(TensorLayout::Nchw),
            "nhwc" => Ok(TensorLayout::Nhwc),
            other => Err(BenchError::Config(format!(
                "unknown tensor layout '{other}' (expected nchw or nhwc)"
            ))),
        }
    }
}

/// Shape of the tensor the model consumes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSpec {
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub layout: TensorLayout,
}

impl Default for InputSpec {
    fn default() -> Self {
        Self {
            width: DEFAULT_INPUT_WIDTH,
            height: DEFAULT_INPUT_HEIGHT,
            layout: TensorLayout::default(),
        }
    }
}

/// Detector tuning that does not depend on the model or delegate.
///
/// The same settings are applied to every run in a process; see
/// `BenchConfig`.
#[derive(Clone, Debug, PartialEq)]
pub struct DetectorSettings {
    /// Locale of `Category::display_name`.
    pub display_names_locale: String,
    /// Keep at most this many detections, highest score first.
    pub max_results: Option<usize>,
    /// Drop categories scoring below this value.
    pub score_threshold: Option<f32>,
    pub category_allowlist: Vec<String>,
    pub category_denylist: Vec<String>,
    pub input: InputSpec,
    pub label_map: LabelMap,
}

impl Default for DetectorSettings {
    fn default() -> Self {
        Self {
            display_names_locale: DEFAULT_DISPLAY_NAMES_LOCALE.to_string(),
            max_results: None,
            score_threshold: None,
            category_allowlist: Vec::new(),
            category_denylist: Vec::new(),
            input: InputSpec::default(),
            label_map: LabelMap::default(),
        }
    }
}

impl DetectorSettings {
    pub fn validate(&self) -> Result<()> {
        if self.display_names_locale.trim().is_empty() {
            return Err(BenchError::Config(
                "display_names_locale must not be empty".into(),
            ));
        }
        if self.max_results == Some(0) {
            return Err(BenchError::Config(
                "max_results must be greater than zero".into(),
            ));
        }
        if let Some(threshold) = self.score_threshold {
            if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
                return Err(BenchError::Config(format!(
                    "score_threshold must be within [0, 1], got {threshold}"
                )));
            }
        }
        if !self.category_allowlist.is_empty() && !self.category_denylist.is_empty() {
            return Err(BenchError::Config(
                "category_allowlist and category_denylist are mutually exclusive".into(),
            ));
        }
        if self.input.width == 0 || self.input.height == 0 {
            return Err(BenchError::Config(format!(
                "input size must be non-zero, got {}x{}",
                self.input.width, self.input.height
            )));
        }
        Ok(())
    }
}

/// Everything needed to create one `ObjectDetector`.
#[derive(Clone, Debug, PartialEq)]
pub struct DetectorOptions {
    pub base_options: BaseOptions,
    pub settings: DetectorSettings,
}

impl DetectorOptions {
    pub fn new(base_options: BaseOptions) -> Self {
        Self {
            base_options,
            settings: DetectorSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: DetectorSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.settings.max_results = Some(max_results);
        self
    }

    pub fn with_score_threshold(mut self, threshold: f32) -> Self {
        self.settings.score_threshold = Some(threshold);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.base_options.model_asset_path.as_os_str().is_empty() {
            return Err(BenchError::Config("model_asset_path must be set".into()));
        }
        self.settings.validate()
    }
}
