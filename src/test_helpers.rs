//! Shared test utilities for the treepress test suite.
//!
//! Provides a scratch source/build tree, a config with no external programs,
//! and small generated images for the imaging backends.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tree = SourceTree::new();
//! tree.file("a/index.md", "# Hello\n");
//! tree.file("a/photo.jpg", "jpeg bytes");
//!
//! // ... run a build from tree.source() into tree.output() ...
//!
//! assert!(tree.read_output("a/index.html").contains("Hello"));
//! ```

use image::codecs::jpeg::JpegEncoder;
use image::{ImageFormat, Rgb, RgbImage};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::config::{MarkdownConfig, SiteConfig};
use crate::render::{ContentRenderer, options_from_config};

// =========================================================================
// Scratch trees
// =========================================================================

/// A temp directory holding `src/` and `build/` side by side.
pub struct SourceTree {
    tmp: TempDir,
}

impl SourceTree {
    pub fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("src")).unwrap();
        Self { tmp }
    }

    pub fn root(&self) -> &Path {
        self.tmp.path()
    }

    pub fn source(&self) -> PathBuf {
        self.root().join("src")
    }

    pub fn output(&self) -> PathBuf {
        self.root().join("build")
    }

    /// Write a source file, creating parent directories.
    pub fn file(&self, rel: &str, content: &str) {
        self.bytes(rel, content.as_bytes());
    }

    pub fn bytes(&self, rel: &str, content: &[u8]) {
        write_with_parents(&self.source().join(rel), content);
    }

    pub fn dir(&self, rel: &str) {
        fs::create_dir_all(self.source().join(rel)).unwrap();
    }

    /// Write a file straight into the build tree, as a previous run would.
    pub fn output_file(&self, rel: &str, content: &str) {
        write_with_parents(&self.output().join(rel), content.as_bytes());
    }

    pub fn read_output(&self, rel: &str) -> String {
        let path = self.output().join(rel);
        fs::read_to_string(&path).unwrap_or_else(|e| panic!("{}: {e}", path.display()))
    }
}

fn write_with_parents(path: &Path, content: &[u8]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

// =========================================================================
// Config and collaborators
// =========================================================================

/// Stock config with highlighting off so no external program is needed.
pub fn test_config() -> SiteConfig {
    let mut config = SiteConfig::default();
    config.highlight.enabled = false;
    config
}

/// Renderer with the stock markdown extensions and no highlighter.
pub fn test_renderer() -> ContentRenderer {
    ContentRenderer::new(options_from_config(&MarkdownConfig::default()))
}

// =========================================================================
// Generated images
// =========================================================================

fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            128,
        ])
    })
}

/// Write a small gradient JPEG.
pub fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    let file = fs::File::create(path).unwrap();
    let encoder = JpegEncoder::new_with_quality(file, 90);
    gradient(width, height).write_with_encoder(encoder).unwrap();
}

/// Write a small gradient PNG.
pub fn create_test_png(path: &Path, width: u32, height: u32) {
    gradient(width, height)
        .save_with_format(path, ImageFormat::Png)
        .unwrap();
}
