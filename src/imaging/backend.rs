//! Thumbnail backend trait and shared error type.
//!
//! The [`ThumbnailBackend`] trait is the seam between the build pipeline and
//! whatever actually touches pixels. Two implementations ship:
//!
//! - [`ImageMagickBackend`](super::magick_backend::ImageMagickBackend) runs
//!   ImageMagick `convert` as a child process (the default).
//! - [`RustBackend`](super::rust_backend::RustBackend) decodes and encodes
//!   in process with the `image` crate.

use super::params::ThumbnailParams;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
    #[error("`{program}` exited with {status}: {stderr}")]
    CommandFailed {
        program: String,
        status: std::process::ExitStatus,
        stderr: String,
    },
}

/// Produces a downscaled, recompressed copy of an image.
///
/// Implementations strip metadata, never produce output wider than
/// `params.max_width`, and do not retry on failure.
pub trait ThumbnailBackend: Sync {
    fn thumbnail(&self, params: &ThumbnailParams) -> Result<(), BackendError>;
}
