use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::detect::labels::LabelMap;
use crate::error::{BenchError, Result};
use crate::options::{DetectorSettings, InputSpec, TensorLayout};
use crate::testdata::VISION_TEST_DATA_DIR;

pub const CONFIG_ENV: &str = "VISION_BENCH_CONFIG";

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct BenchConfigFile {
    test_data_dir: Option<PathBuf>,
    detector: Option<DetectorConfigFile>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct DetectorConfigFile {
    display_names_locale: Option<String>,
    score_threshold: Option<f32>,
    max_results: Option<usize>,
    category_allowlist: Option<Vec<String>>,
    category_denylist: Option<Vec<String>>,
    input: Option<InputSpec>,
    label_map: Option<LabelMap>,
}

/// Settings shared by every benchmark run in a process.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchConfig {
    pub test_data_dir: PathBuf,
    pub detector: DetectorSettings,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            test_data_dir: PathBuf::from(VISION_TEST_DATA_DIR),
            detector: DetectorSettings::default(),
        }
    }
}

impl BenchConfig {
    /// Load the optional config file named by `VISION_BENCH_CONFIG`, apply
    /// environment overrides, then validate.
    pub fn load() -> Result<Self> {
        let file_cfg = match std::env::var_os(CONFIG_ENV) {
            Some(path) => Some(read_config_file(Path::new(&path))?),
            None => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default());
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: BenchConfigFile) -> Self {
        let test_data_dir = file
            .test_data_dir
            .unwrap_or_else(|| PathBuf::from(VISION_TEST_DATA_DIR));
        let detector = file.detector.unwrap_or_default();
        let defaults = DetectorSettings::default();
        Self {
            test_data_dir,
            detector: DetectorSettings {
                display_names_locale: detector
                    .display_names_locale
                    .unwrap_or(defaults.display_names_locale),
                score_threshold: detector.score_threshold,
                max_results: detector.max_results,
                category_allowlist: detector.category_allowlist.unwrap_or_default(),
                category_denylist: detector.category_denylist.unwrap_or_default(),
                input: detector.input.unwrap_or_default(),
                label_map: detector.label_map.unwrap_or_default(),
            },
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(dir) = std::env::var("VISION_BENCH_TEST_DATA_DIR") {
            if !dir.trim().is_empty() {
                self.test_data_dir = PathBuf::from(dir);
            }
        }
        if let Ok(threshold) = std::env::var("VISION_BENCH_SCORE_THRESHOLD") {
            let value: f32 = threshold.trim().parse().map_err(|_| {
                BenchError::Config("VISION_BENCH_SCORE_THRESHOLD must be a number".into())
            })?;
            self.detector.score_threshold = Some(value);
        }
        if let Ok(max) = std::env::var("VISION_BENCH_MAX_RESULTS") {
            let value: usize = max.trim().parse().map_err(|_| {
                BenchError::Config("VISION_BENCH_MAX_RESULTS must be a positive integer".into())
            })?;
            self.detector.max_results = Some(value);
        }
        if let Ok(size) = std::env::var("VISION_BENCH_INPUT_SIZE") {
            let (width, height) = parse_size(&size)?;
            self.detector.input.width = width;
            self.detector.input.height = height;
        }
        if let Ok(layout) = std::env::var("VISION_BENCH_INPUT_LAYOUT") {
            self.detector.input.layout = layout.parse::<TensorLayout>()?;
        }
        if let Ok(map) = std::env::var("VISION_BENCH_LABEL_MAP") {
            self.detector.label_map = map.parse::<LabelMap>()?;
        }
        if let Ok(locale) = std::env::var("VISION_BENCH_DISPLAY_NAMES_LOCALE") {
            self.detector.display_names_locale = locale.trim().to_string();
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.test_data_dir.as_os_str().is_empty() {
            return Err(BenchError::Config("test_data_dir must not be empty".into()));
        }
        self.detector.validate()
    }
}

fn read_config_file(path: &Path) -> Result<BenchConfigFile> {
    let raw = std::fs::read_to_string(path).map_err(|e| BenchError::io(path, e))?;
    serde_json::from_str(&raw)
        .map_err(|e| BenchError::Config(format!("invalid config file {}: {}", path.display(), e)))
}

fn parse_size(value: &str) -> Result<(u32, u32)> {
    let invalid = || {
        BenchError::Config(format!(
            "VISION_BENCH_INPUT_SIZE must look like WIDTHxHEIGHT, got '{value}'"
        ))
    };
    let (w, h) = value.trim().split_once(['x', 'X']).ok_or_else(invalid)?;
    let width = w.trim().parse().map_err(|_| invalid())?;
    let height = h.trim().parse().map_err(|_| invalid())?;
    Ok((width, height))
}
