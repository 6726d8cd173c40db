//! Resolution of benchmark assets on disk.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{BenchError, Result};

/// Default detection model, looked up in the vision test-data directory.
pub const MODEL_FILE: &str = "efficientdet_lite0.onnx";
/// Fixed benchmark input image.
pub const IMAGE_FILE: &str = "cats_and_dogs.jpg";
/// Vision test-data directory, relative to the working directory.
pub const VISION_TEST_DATA_DIR: &str = "testdata/vision";

/// Find `name` anywhere below `root`.
///
/// Each directory's entries are checked in sorted order before descending
/// into its subdirectories. Symlinked directories are matched by name but
/// never descended into. Paths are compared by components, so
/// `"models/x.onnx"` matches `root/a/models/x.onnx` but `"x.onnx"` does not
/// match `root/yx.onnx`.
pub fn get_test_data_path<R: AsRef<Path>, N: AsRef<Path>>(root: R, name: N) -> Result<PathBuf> {
    let (root, name) = (root.as_ref(), name.as_ref());
    find_below(root, name)?.ok_or_else(|| BenchError::TestDataNotFound {
        name: name.to_path_buf(),
        root: root.to_path_buf(),
    })
}

fn find_below(dir: &Path, name: &Path) -> Result<Option<PathBuf>> {
    let mut entries = fs::read_dir(dir)
        .map_err(|e| BenchError::io(dir, e))?
        .map(|entry| -> std::io::Result<(PathBuf, bool)> {
            let entry = entry?;
            // file_type does not follow symlinks
            Ok((entry.path(), entry.file_type()?.is_dir()))
        })
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(|e| BenchError::io(dir, e))?;
    entries.sort();

    if let Some((path, _)) = entries.iter().find(|(path, _)| path.ends_with(name)) {
        return Ok(Some(path.clone()));
    }
    for (path, _) in entries.iter().filter(|(_, is_dir)| *is_dir) {
        if let Some(found) = find_below(path, name)? {
            return Ok(Some(found));
        }
    }
    Ok(None)
}

/// Prefer a user-supplied model when it exists on disk or names a
/// `scheme://` model.
pub fn get_model_path(custom_model: Option<&Path>, default_model_path: &Path) -> PathBuf {
    match custom_model {
        Some(path) if path.exists() || has_scheme(path) => path.to_path_buf(),
        Some(path) => {
            log::warn!(
                "custom model {} does not exist; falling back to {}",
                path.display(),
                default_model_path.display()
            );
            default_model_path.to_path_buf()
        }
        None => default_model_path.to_path_buf(),
    }
}

pub(crate) fn has_scheme(path: &Path) -> bool {
    path.to_str().is_some_and(|p| p.contains("://"))
}
