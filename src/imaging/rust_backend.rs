//! Pure Rust thumbnail backend: no ImageMagick required.
//!
//! | Step | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG) | `image::ImageReader` |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3` |
//! | Encode JPEG | `JpegEncoder::new_with_quality` |
//! | Encode other formats | `DynamicImage::save_with_format` |
//!
//! Decoding and re-encoding drops all metadata. The `image` crate has no
//! progressive JPEG encoder, so output is baseline.

use super::backend::{BackendError, ThumbnailBackend};
use super::calculations::fit_to_width;
use super::params::ThumbnailParams;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// In-process backend using the `image` crate.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    ImageReader::open(path)
        .map_err(BackendError::Io)?
        .with_guessed_format()
        .map_err(BackendError::Io)?
        .decode()
        .map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e))
        })
}

fn save_image(img: &DynamicImage, path: &Path, quality: u32) -> Result<(), BackendError> {
    let format = ImageFormat::from_path(path).map_err(|e| {
        BackendError::ProcessingFailed(format!("Unknown output format {}: {}", path.display(), e))
    })?;

    match format {
        ImageFormat::Jpeg => {
            let writer = BufWriter::new(File::create(path)?);
            // The jpeg encoder takes quality 1-100.
            let encoder = JpegEncoder::new_with_quality(writer, quality.clamp(1, 100) as u8);
            DynamicImage::ImageRgb8(img.to_rgb8())
                .write_with_encoder(encoder)
                .map_err(|e| BackendError::ProcessingFailed(format!("JPEG encode failed: {e}")))
        }
        other => img.save_with_format(path, other).map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to save {}: {}", path.display(), e))
        }),
    }
}

impl ThumbnailBackend for RustBackend {
    fn thumbnail(&self, params: &ThumbnailParams) -> Result<(), BackendError> {
        let img = load_image(&params.source)?;
        let (w, h) = fit_to_width((img.width(), img.height()), params.max_width);
        let scaled = if (w, h) == (img.width(), img.height()) {
            img
        } else {
            img.resize_exact(w, h, FilterType::Lanczos3)
        };
        save_image(&scaled, &params.output, params.quality.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::Quality;
    use crate::test_helpers::{create_test_jpeg, create_test_png};

    #[test]
    fn thumbnail_scales_wide_jpeg_to_max_width() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("wide.jpg");
        create_test_jpeg(&source, 800, 600);

        let output = tmp.path().join("thumb.jpg");
        RustBackend::new()
            .thumbnail(&ThumbnailParams {
                source,
                output: output.clone(),
                max_width: 200,
                quality: Quality::new(80),
            })
            .unwrap();

        assert_eq!(image::image_dimensions(&output).unwrap(), (200, 150));
    }

    #[test]
    fn thumbnail_keeps_narrow_image_size() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("narrow.jpg");
        create_test_jpeg(&source, 120, 90);

        let output = tmp.path().join("thumb.jpg");
        RustBackend::new()
            .thumbnail(&ThumbnailParams {
                source,
                output: output.clone(),
                max_width: 400,
                quality: Quality::new(80),
            })
            .unwrap();

        assert_eq!(image::image_dimensions(&output).unwrap(), (120, 90));
    }

    #[test]
    fn thumbnail_png_stays_png() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("icon.png");
        create_test_png(&source, 64, 32);

        let output = tmp.path().join("thumb.png");
        RustBackend::new()
            .thumbnail(&ThumbnailParams {
                source,
                output: output.clone(),
                max_width: 16,
                quality: Quality::default(),
            })
            .unwrap();

        assert_eq!(image::image_dimensions(&output).unwrap(), (16, 8));
        assert_eq!(
            ImageFormat::from_path(&output).unwrap(),
            ImageFormat::Png
        );
    }

    #[test]
    fn thumbnail_nonexistent_source_errors() {
        let tmp = tempfile::TempDir::new().unwrap();
        let result = RustBackend::new().thumbnail(&ThumbnailParams {
            source: tmp.path().join("missing.jpg"),
            output: tmp.path().join("thumb.jpg"),
            max_width: 100,
            quality: Quality::default(),
        });
        assert!(matches!(result, Err(BackendError::Io(_))));
    }

    #[test]
    fn thumbnail_garbage_source_errors() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("broken.jpg");
        std::fs::write(&source, b"not really a jpeg").unwrap();
        let result = RustBackend::new().thumbnail(&ThumbnailParams {
            source,
            output: tmp.path().join("thumb.jpg"),
            max_width: 100,
            quality: Quality::default(),
        });
        assert!(matches!(result, Err(BackendError::ProcessingFailed(_))));
    }
}
