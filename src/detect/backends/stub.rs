use std::path::Path;

use crate::delegate::Delegate;
use crate::detect::backend::{BackendProvider, DetectorBackend};
use crate::detect::labels::LabelMap;
use crate::detect::result::{BoundingBox, Category, Detection};
use crate::error::Result;
use crate::frame::Image;
use crate::options::DetectorOptions;

pub const STUB_SCHEME: &str = "stub://";

/// Provider for `stub://` model paths. Needs no model file.
pub struct StubProvider;

impl BackendProvider for StubProvider {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn accepts(&self, model_path: &Path) -> bool {
        model_path
            .to_str()
            .is_some_and(|path| path.starts_with(STUB_SCHEME))
    }

    fn supports(&self, _delegate: Delegate) -> bool {
        true
    }

    fn create(&self, options: &DetectorOptions) -> Result<Box<dyn DetectorBackend>> {
        Ok(Box::new(StubBackend::new(
            options.base_options.delegate,
            options.settings.label_map,
        )))
    }
}

/// Stub backend for testing. Reports a cat on the left half of the image and
/// a dog on the right half.
pub struct StubBackend {
    delegate: Delegate,
    labels: LabelMap,
}

impl StubBackend {
    pub fn new(delegate: Delegate, labels: LabelMap) -> Self {
        Self { delegate, labels }
    }
}

impl DetectorBackend for StubBackend {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn delegate(&self) -> Delegate {
        self.delegate
    }

    fn detect(&mut self, image: &Image) -> Result<Vec<Detection>> {
        let half = (image.width() / 2) as i32;
        let height = image.height() as i32;
        let boxed = |origin_x: i32, width: i32, name: &str, score: f32| Detection {
            bounding_box: BoundingBox {
                origin_x,
                origin_y: 0,
                width,
                height,
            },
            categories: vec![Category {
                index: self.labels.index_of(name).unwrap_or(-1),
                score,
                category_name: Some(name.to_string()),
                display_name: None,
            }],
        };
        Ok(vec![
            boxed(0, half, "cat", 0.9),
            boxed(half, image.width() as i32 - half, "dog", 0.7),
        ])
    }
}
