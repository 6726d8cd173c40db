use std::path::Path;

use crate::delegate::Delegate;
use crate::error::Result;
use crate::frame::Image;
use crate::options::DetectorOptions;

use super::result::Detection;

/// A loaded model bound to one delegate.
///
/// Backends return raw detections; score thresholds, category lists and
/// result limits are applied by `ObjectDetector`. Dropping a backend releases
/// everything it allocated.
pub trait DetectorBackend: Send {
    /// Backend identifier.
    fn name(&self) -> &'static str;

    /// Delegate this instance executes on.
    fn delegate(&self) -> Delegate;

    /// Run detection on one image.
    ///
    /// The image is borrowed for the duration of the call only.
    fn detect(&mut self, image: &Image) -> Result<Vec<Detection>>;

    /// Optional warm-up hook, run once after creation.
    fn warm_up(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Factory that knows which models and delegates a backend can handle.
pub trait BackendProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Returns true when this provider understands the model path.
    fn accepts(&self, model_path: &Path) -> bool;

    fn supports(&self, delegate: Delegate) -> bool;

    /// Load the model named by `options` and return a ready backend.
    fn create(&self, options: &DetectorOptions) -> Result<Box<dyn DetectorBackend>>;
}
