mod backend;
pub mod backends;
pub mod decode;
mod detector;
pub mod labels;
mod registry;
mod result;

pub use backend::{BackendProvider, DetectorBackend};
pub use backends::{StubBackend, StubProvider};
pub use detector::ObjectDetector;
pub use labels::LabelMap;
pub use registry::BackendRegistry;
pub use result::{BoundingBox, Category, Detection, DetectionResult};
