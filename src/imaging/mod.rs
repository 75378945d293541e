//! Thumbnail generation.
//!
//! | Backend | How |
//! |---|---|
//! | [`ImageMagickBackend`] (default) | `convert -strip -interlace Plane -quality Q% -thumbnail W` |
//! | [`RustBackend`] | `image` crate decode, Lanczos3 downscale, re-encode |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing thumbnail operations
//! - **Backend**: [`ThumbnailBackend`] trait and its implementations
//! - **Operations**: Thumbnail placement (`t/` next to the image) + backend call

pub mod backend;
pub mod calculations;
pub mod magick_backend;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, ThumbnailBackend};
pub use magick_backend::ImageMagickBackend;
pub use operations::{THUMBNAIL_DIR, ThumbnailConfig, create_thumbnail, thumbnail_path};
pub use params::{Quality, ThumbnailParams};
pub use rust_backend::RustBackend;
