//! ImageMagick backend: runs `convert` as a child process.
//!
//! The command line is
//!
//! ```text
//! convert -strip -interlace Plane -quality <q>% -thumbnail <width> <source> <output>
//! ```
//!
//! `-strip` drops EXIF/IPTC/ICC metadata, `-interlace Plane` produces a
//! progressive JPEG (interlaced PNG), and `-thumbnail <width>` scales to the
//! target width keeping the aspect ratio. The program is invoked directly, so
//! paths with spaces or shell metacharacters need no quoting.

use super::backend::{BackendError, ThumbnailBackend};
use super::params::ThumbnailParams;
use std::ffi::OsString;
use std::process::Command;

pub struct ImageMagickBackend {
    program: String,
}

impl ImageMagickBackend {
    pub fn new() -> Self {
        Self::with_program("convert")
    }

    /// Use a different ImageMagick entry point (e.g. `magick` on IM7).
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for ImageMagickBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the argument list for one thumbnail.
fn thumbnail_args(params: &ThumbnailParams) -> Vec<OsString> {
    vec![
        "-strip".into(),
        "-interlace".into(),
        "Plane".into(),
        "-quality".into(),
        format!("{}%", params.quality.value()).into(),
        "-thumbnail".into(),
        params.max_width.to_string().into(),
        params.source.clone().into_os_string(),
        params.output.clone().into_os_string(),
    ]
}

impl ThumbnailBackend for ImageMagickBackend {
    fn thumbnail(&self, params: &ThumbnailParams) -> Result<(), BackendError> {
        let output = Command::new(&self.program)
            .args(thumbnail_args(params))
            .output()
            .map_err(|e| {
                BackendError::ProcessingFailed(format!("failed to run `{}`: {e}", self.program))
            })?;

        if !output.status.success() {
            return Err(BackendError::CommandFailed {
                program: self.program.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}
