use std::path::PathBuf;

use thiserror::Error;

use crate::delegate::Delegate;

/// Errors raised while building a detector or running a benchmark.
#[derive(Error, Debug)]
pub enum BenchError {
    /// Options or configuration rejected before any inference ran.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("model file not found: {}", .0.display())]
    ModelNotFound(PathBuf),

    #[error("backend '{backend}' does not support the {delegate} delegate")]
    UnsupportedDelegate {
        backend: &'static str,
        delegate: Delegate,
    },

    #[error("no {} in test directory: {}", name.display(), root.display())]
    TestDataNotFound { name: PathBuf, root: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode image {}: {message}", path.display())]
    ImageDecode { path: PathBuf, message: String },

    #[error("inference failed: {0}")]
    Inference(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl BenchError {
    /// True for errors raised while configuring the detector, before any
    /// image is loaded or timed.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            BenchError::Config(_)
                | BenchError::ModelNotFound(_)
                | BenchError::UnsupportedDelegate { .. }
        )
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BenchError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = BenchError> = std::result::Result<T, E>;
