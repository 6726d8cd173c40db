//! Input image handling.

use std::path::Path;

use image::RgbImage;
use sha2::{Digest, Sha256};

use crate::error::{BenchError, Result};

/// Decoded RGB image fed to a detector.
///
/// There is no mutable access to the pixels; a single `Image` can be handed
/// to any number of `detect` calls and is guaranteed to be identical for
/// each of them.
#[derive(Clone, Debug)]
pub struct Image {
    pixels: RgbImage,
}

impl Image {
    /// Decode an image file into RGB8.
    pub fn create_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let reader = image::ImageReader::open(path).map_err(|e| BenchError::io(path, e))?;
        let reader = reader
            .with_guessed_format()
            .map_err(|e| BenchError::io(path, e))?;
        let decoded = reader.decode().map_err(|e| BenchError::ImageDecode {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        log::debug!(
            "decoded {} ({}x{})",
            path.display(),
            decoded.width(),
            decoded.height()
        );
        Ok(Self {
            pixels: decoded.to_rgb8(),
        })
    }

    pub fn from_rgb(pixels: RgbImage) -> Self {
        Self { pixels }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn as_rgb(&self) -> &RgbImage {
        &self.pixels
    }

    /// SHA-256 over dimensions and pixel bytes.
    pub fn fingerprint(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(self.width().to_le_bytes());
        hasher.update(self.height().to_le_bytes());
        hasher.update(self.pixels.as_raw());
        hasher.finalize().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn loads_png_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiny.png");
        RgbImage::from_pixel(4, 3, Rgb([10, 20, 30]))
            .save(&path)
            .unwrap();

        let img = Image::create_from_file(&path).expect("decode png");
        assert_eq!(img.width(), 4);
        assert_eq!(img.height(), 3);
        assert_eq!(img.as_rgb().get_pixel(1, 1), &Rgb([10, 20, 30]));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = Image::create_from_file("/nonexistent/cats_and_dogs.jpg").unwrap_err();
        assert!(matches!(err, BenchError::Io { .. }));
    }

    #[test]
    fn garbage_file_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.jpg");
        std::fs::write(&path, b"definitely not a jpeg").unwrap();

        let err = Image::create_from_file(&path).unwrap_err();
        assert!(matches!(err, BenchError::ImageDecode { .. }));
    }

    #[test]
    fn fingerprint_tracks_pixels() {
        let a = Image::from_rgb(RgbImage::from_pixel(2, 2, Rgb([1, 2, 3])));
        let b = Image::from_rgb(RgbImage::from_pixel(2, 2, Rgb([1, 2, 3])));
        let c = Image::from_rgb(RgbImage::from_pixel(2, 2, Rgb([1, 2, 4])));
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), c.fingerprint());
    }
}
