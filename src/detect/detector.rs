use std::cmp::Ordering;

use crate::error::Result;
use crate::frame::Image;
use crate::options::{DetectorOptions, DetectorSettings};

use super::backend::DetectorBackend;
use super::labels::display_name;
use super::registry::BackendRegistry;
use super::result::{Category, Detection, DetectionResult};

/// A configured object detector.
///
/// Owns its backend exclusively. The backend and everything it loaded are
/// released when the detector is dropped, on every exit path.
pub struct ObjectDetector {
    backend: Box<dyn DetectorBackend>,
    options: DetectorOptions,
}

impl ObjectDetector {
    /// Create a detector using every backend compiled into this build.
    pub fn create_from_options(options: DetectorOptions) -> Result<Self> {
        Self::create_with_registry(&BackendRegistry::with_defaults(), options)
    }

    pub fn create_with_registry(
        registry: &BackendRegistry,
        options: DetectorOptions,
    ) -> Result<Self> {
        options.validate()?;
        let provider = registry.resolve(&options)?;
        let mut backend = provider.create(&options)?;
        backend.warm_up()?;
        log::info!(
            "created {} detector on {} for {}",
            backend.name(),
            backend.delegate(),
            options.base_options.model_asset_path.display()
        );
        Ok(Self { backend, options })
    }

    /// Run detection, apply the configured result filters and fill in
    /// display names for the configured locale.
    pub fn detect(&mut self, image: &Image) -> Result<DetectionResult> {
        let raw = self.backend.detect(image)?;
        let settings = &self.options.settings;
        let mut detections = filter_detections(raw, settings);
        localize(&mut detections, &settings.display_names_locale);
        Ok(DetectionResult { detections })
    }

    pub fn options(&self) -> &DetectorOptions {
        &self.options
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Release the detector now rather than at end of scope.
    pub fn close(self) {}
}

impl Drop for ObjectDetector {
    fn drop(&mut self) {
        log::debug!(
            "released {} detector for {}",
            self.backend.name(),
            self.options.base_options.model_asset_path.display()
        );
    }
}

fn filter_detections(detections: Vec<Detection>, settings: &DetectorSettings) -> Vec<Detection> {
    let keep = |category: &Category| {
        if settings
            .score_threshold
            .is_some_and(|threshold| category.score < threshold)
        {
            return false;
        }
        let name = category.category_name.as_deref().unwrap_or_default();
        if !settings.category_allowlist.is_empty() {
            return settings.category_allowlist.iter().any(|c| c == name);
        }
        !settings.category_denylist.iter().any(|c| c == name)
    };

    let mut kept: Vec<Detection> = detections
        .into_iter()
        .filter_map(|mut detection| {
            detection.categories.retain(|c| keep(c));
            detection.categories.sort_by(by_score_desc);
            (!detection.categories.is_empty()).then_some(detection)
        })
        .collect();

    kept.sort_by(|a, b| {
        b.top_score()
            .partial_cmp(&a.top_score())
            .unwrap_or(Ordering::Equal)
    });
    if let Some(max) = settings.max_results {
        kept.truncate(max);
    }
    kept
}

fn localize(detections: &mut [Detection], locale: &str) {
    for category in detections.iter_mut().flat_map(|d| d.categories.iter_mut()) {
        category.display_name = category
            .category_name
            .as_deref()
            .and_then(|name| display_name(name, locale));
    }
}

fn by_score_desc(a: &Category, b: &Category) -> Ordering {
    b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal)
}
