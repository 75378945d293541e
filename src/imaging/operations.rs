//! High-level thumbnail operations.
//!
//! These functions decide where a thumbnail lives and hand the concrete
//! parameters to a backend.

use super::backend::{BackendError, ThumbnailBackend};
use super::params::{Quality, ThumbnailParams};
use std::fs;
use std::path::{Path, PathBuf};

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Name of the directory, next to each image, that holds its thumbnail.
pub const THUMBNAIL_DIR: &str = "t";

/// Configuration for thumbnail generation.
#[derive(Debug, Clone, Copy)]
pub struct ThumbnailConfig {
    pub max_width: u32,
    pub quality: Quality,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            max_width: 400,
            quality: Quality::default(),
        }
    }
}

/// Where the thumbnail for `image` goes: `<dir>/t/<file name>`.
///
/// Returns `None` for paths without a file name.
pub fn thumbnail_path(image: &Path) -> Option<PathBuf> {
    let name = image.file_name()?;
    let dir = image.parent().unwrap_or(Path::new(""));
    Some(dir.join(THUMBNAIL_DIR).join(name))
}

/// Plan a thumbnail operation without executing it.
pub fn plan_thumbnail(image: &Path, config: &ThumbnailConfig) -> Option<ThumbnailParams> {
    Some(ThumbnailParams {
        source: image.to_path_buf(),
        output: thumbnail_path(image)?,
        max_width: config.max_width,
        quality: config.quality,
    })
}

/// Create the thumbnail for an image that was just copied into the build tree.
///
/// Creates the `t/` directory if needed and returns the thumbnail path.
pub fn create_thumbnail(
    backend: &(impl ThumbnailBackend + ?Sized),
    image: &Path,
    config: &ThumbnailConfig,
) -> Result<PathBuf> {
    let params = plan_thumbnail(image, config).ok_or_else(|| {
        BackendError::ProcessingFailed(format!("{} has no file name", image.display()))
    })?;
    if let Some(dir) = params.output.parent() {
        fs::create_dir_all(dir)?;
    }
    backend.thumbnail(&params)?;
    Ok(params.output)
}
