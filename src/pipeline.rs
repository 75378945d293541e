//! The build pipeline: walk the source tree and mirror it into the build tree.
//!
//! Every regular file under the source root is visited once, in file-name
//! order with each directory before its contents, and dispatched on its
//! [`FileKind`]:
//!
//! | Kind | Output |
//! |------|--------|
//! | `index.md` | `index.html`: rendered, wrapped in the page template, always rewritten |
//! | image (`jpg`, `png` by default) | copied once, plus `t/<name>` thumbnail; skipped if already built |
//! | anything else | copied verbatim, always overwritten |
//!
//! ## Idempotence
//!
//! There is no hashing or timestamp comparison. An image whose destination
//! already exists is skipped along with its thumbnail, so clearing the build
//! directory is the way to force regeneration. The existence check is the
//! atomic creation of the destination file (`create_new`), which keeps
//! parallel workers from generating the same thumbnail twice. When the copy
//! or the thumbnail fails the destination is removed again, so the next run
//! retries the image.
//!
//! Symlinked files are read through the link and treated like the file they
//! point to. Symlinked directories are not entered.
//!
//! ## Failure policy
//!
//! [`ErrorPolicy::Abort`] stops at the first failing entry and returns that
//! error; anything written before it stays on disk. [`ErrorPolicy::KeepGoing`]
//! records failures in the [`BuildReport`] and finishes the walk.
//!
//! ## Parallelism
//!
//! With `processing.max_processes` above one, entries are dispatched on the
//! global [rayon](https://docs.rs/rayon) pool. Each entry creates its own
//! parent directories, so no ordering between entries is needed. Under
//! `Abort` the first error wins and rayon stops handing out new entries.

use crate::config::{
    ErrorPolicy, SiteConfig, ThumbnailBackendKind, ThumbnailsConfig, effective_threads,
};
use crate::context::{ContextBuilder, ContextError};
use crate::imaging::{
    BackendError, ImageMagickBackend, Quality, RustBackend, ThumbnailBackend, ThumbnailConfig,
    create_thumbnail,
};
use crate::render::{ContentRenderer, RenderError};
use crate::template::{PageTemplate, SiteTemplate};
use rayon::prelude::*;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

/// File name that marks a directory's page.
pub const INDEX_DOCUMENT: &str = "index.md";

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("cannot resolve {path}: {reason}")]
    PathResolution { path: PathBuf, reason: String },
    #[error("cannot create directory {path}: {source}")]
    CreateDir { path: PathBuf, source: io::Error },
    #[error("I/O error on {path}: {source}")]
    FileIo { path: PathBuf, source: io::Error },
    #[error("cannot render {path}: {source}")]
    Render { path: PathBuf, source: RenderError },
    #[error("thumbnail for {path} failed: {source}")]
    Thumbnail { path: PathBuf, source: BackendError },
    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

impl BuildError {
    /// Short name of the step that failed, for logs and summaries.
    pub fn step(&self) -> &'static str {
        match self {
            BuildError::PathResolution { .. } => "resolve-path",
            BuildError::CreateDir { .. } => "create-dir",
            BuildError::FileIo { .. } => "file-io",
            BuildError::Render { .. } => "render",
            BuildError::Thumbnail { .. } => "thumbnail",
            BuildError::Walk(_) => "walk",
        }
    }

    /// The file or directory the failure is about, when known.
    pub fn path(&self) -> Option<&Path> {
        match self {
            BuildError::PathResolution { path, .. }
            | BuildError::CreateDir { path, .. }
            | BuildError::FileIo { path, .. }
            | BuildError::Render { path, .. }
            | BuildError::Thumbnail { path, .. } => Some(path),
            BuildError::Walk(e) => e.path(),
        }
    }
}

impl From<ContextError> for BuildError {
    fn from(err: ContextError) -> Self {
        match err {
            ContextError::Read { path, source } => BuildError::FileIo { path, source },
            ContextError::NotUnderRoot { path, root } => BuildError::PathResolution {
                path,
                reason: format!("not under {}", root.display()),
            },
            ContextError::Render { path, source } => BuildError::Render { path, source },
        }
    }
}

/// How a walked entry is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Directory,
    IndexDocument,
    Image,
    Passthrough,
}

/// Classify an entry from its relative path alone.
///
/// Image extensions are compared ASCII case-insensitively.
pub fn classify(rel: &Path, is_dir: bool, image_extensions: &[String]) -> FileKind {
    if is_dir {
        return FileKind::Directory;
    }
    if rel.file_name().is_some_and(|name| name == INDEX_DOCUMENT) {
        return FileKind::IndexDocument;
    }
    let is_image = rel
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| image_extensions.iter().any(|i| i.eq_ignore_ascii_case(ext)));
    if is_image {
        FileKind::Image
    } else {
        FileKind::Passthrough
    }
}

/// One walked path.
#[derive(Debug, Clone)]
pub struct SourceEntry {
    pub path: PathBuf,
    pub rel: PathBuf,
    pub is_dir: bool,
}

/// What happened to one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Outcome {
    Directory,
    Page,
    ImageCopied,
    ImageSkipped,
    Copied,
}

/// Counts of what a build did, plus the failures kept under `keep-going`.
#[derive(Debug, Default)]
pub struct BuildReport {
    pub pages: usize,
    pub images_copied: usize,
    pub images_skipped: usize,
    pub thumbnails: usize,
    pub files_copied: usize,
    pub failures: Vec<BuildError>,
}

impl BuildReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Directory => {}
            Outcome::Page => self.pages += 1,
            Outcome::ImageCopied => {
                self.images_copied += 1;
                self.thumbnails += 1;
            }
            Outcome::ImageSkipped => self.images_skipped += 1,
            Outcome::Copied => self.files_copied += 1,
        }
    }
}

/// The replaceable parts of a build.
pub struct Collaborators<'a> {
    pub renderer: &'a ContentRenderer,
    pub template: &'a dyn PageTemplate,
    pub thumbnails: &'a dyn ThumbnailBackend,
}

/// Thumbnail backend selected by config.
pub fn thumbnail_backend(config: &ThumbnailsConfig) -> Box<dyn ThumbnailBackend> {
    match config.backend {
        ThumbnailBackendKind::Imagemagick => {
            Box::new(ImageMagickBackend::with_program(&config.command))
        }
        ThumbnailBackendKind::Rust => Box::new(RustBackend::new()),
    }
}

/// Build `source` into `output` with the collaborators the config selects.
pub fn build(source: &Path, output: &Path, config: &SiteConfig) -> Result<BuildReport, BuildError> {
    let renderer = ContentRenderer::from_config(config);
    let backend = thumbnail_backend(&config.thumbnails);
    let collaborators = Collaborators {
        renderer: &renderer,
        template: &SiteTemplate,
        thumbnails: backend.as_ref(),
    };
    build_with(source, output, config, &collaborators)
}

/// Build with explicit collaborators (allows testing with mocks).
pub fn build_with(
    source: &Path,
    output: &Path,
    config: &SiteConfig,
    collaborators: &Collaborators<'_>,
) -> Result<BuildReport, BuildError> {
    let source_root = resolve(source)?;
    let build_root = resolve(output)?;
    if !source_root.is_dir() {
        return Err(BuildError::PathResolution {
            path: source_root,
            reason: "source root is not a directory".to_string(),
        });
    }

    let job = Job {
        context: ContextBuilder::new(&source_root, &config.root_name, collaborators.renderer),
        build_root: &build_root,
        image_extensions: &config.images.extensions,
        thumbnail: ThumbnailConfig {
            max_width: config.thumbnails.width,
            quality: Quality::new(config.thumbnails.quality),
        },
        template: collaborators.template,
        thumbnails: collaborators.thumbnails,
    };

    info!(
        source = %source_root.display(),
        output = %build_root.display(),
        "building site"
    );

    let entries = walk(&source_root, &build_root);
    if effective_threads(&config.processing) > 1 {
        build_parallel(&job, entries, config.on_error)
    } else {
        build_sequential(&job, entries, config.on_error)
    }
}

fn resolve(path: &Path) -> Result<PathBuf, BuildError> {
    std::path::absolute(path).map_err(|e| BuildError::PathResolution {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Sorted walk of the source tree that never enters the build root.
fn walk<'a>(
    source_root: &'a Path,
    build_root: &'a Path,
) -> impl Iterator<Item = Result<SourceEntry, BuildError>> + 'a {
    WalkDir::new(source_root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(move |e| e.path() != build_root)
        .filter_map(move |entry| {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => return Some(Err(BuildError::from(e))),
            };
            // Links are classified by their target. Linked directories are
            // never entered, which also rules out cycles.
            let is_dir = if entry.path_is_symlink() {
                match fs::metadata(entry.path()) {
                    Ok(meta) if meta.is_dir() => {
                        debug!(path = %entry.path().display(), "directory symlink, not followed");
                        return None;
                    }
                    Ok(_) => false,
                    Err(e) => return Some(Err(file_io(entry.path())(e))),
                }
            } else {
                entry.file_type().is_dir()
            };
            let rel = match entry.path().strip_prefix(source_root) {
                Ok(rel) => rel.to_path_buf(),
                Err(e) => {
                    return Some(Err(BuildError::PathResolution {
                        path: entry.path().to_path_buf(),
                        reason: e.to_string(),
                    }));
                }
            };
            Some(Ok(SourceEntry {
                is_dir,
                path: entry.into_path(),
                rel,
            }))
        })
}

fn build_sequential(
    job: &Job<'_>,
    entries: impl Iterator<Item = Result<SourceEntry, BuildError>>,
    policy: ErrorPolicy,
) -> Result<BuildReport, BuildError> {
    let mut report = BuildReport::default();
    for entry in entries {
        match entry.and_then(|e| job.process(&e)) {
            Ok(outcome) => report.record(outcome),
            Err(err) => {
                log_failure(&err);
                match policy {
                    ErrorPolicy::Abort => return Err(err),
                    ErrorPolicy::KeepGoing => report.failures.push(err),
                }
            }
        }
    }
    Ok(report)
}

fn build_parallel(
    job: &Job<'_>,
    entries: impl Iterator<Item = Result<SourceEntry, BuildError>>,
    policy: ErrorPolicy,
) -> Result<BuildReport, BuildError> {
    let mut report = BuildReport::default();
    let mut walked = Vec::new();
    for entry in entries {
        match entry {
            Ok(entry) => walked.push(entry),
            Err(err) => {
                log_failure(&err);
                match policy {
                    ErrorPolicy::Abort => return Err(err),
                    ErrorPolicy::KeepGoing => report.failures.push(err),
                }
            }
        }
    }

    let process = |entry: &SourceEntry| job.process(entry).inspect_err(log_failure);

    match policy {
        ErrorPolicy::Abort => {
            let outcomes = walked
                .par_iter()
                .map(process)
                .collect::<Result<Vec<_>, _>>()?;
            outcomes.into_iter().for_each(|o| report.record(o));
        }
        ErrorPolicy::KeepGoing => {
            let results: Vec<_> = walked.par_iter().map(process).collect();
            for result in results {
                match result {
                    Ok(outcome) => report.record(outcome),
                    Err(err) => report.failures.push(err),
                }
            }
        }
    }
    Ok(report)
}

fn file_io(path: &Path) -> impl FnOnce(io::Error) -> BuildError {
    let path = path.to_path_buf();
    move |source| BuildError::FileIo { path, source }
}

fn log_failure(err: &BuildError) {
    let path = err.path().map(|p| p.display().to_string()).unwrap_or_default();
    error!(path = %path, step = err.step(), "{err}");
}

/// Everything one entry needs, shared read-only across workers.
struct Job<'a> {
    context: ContextBuilder<'a>,
    build_root: &'a Path,
    image_extensions: &'a [String],
    thumbnail: ThumbnailConfig,
    template: &'a dyn PageTemplate,
    thumbnails: &'a dyn ThumbnailBackend,
}

impl Job<'_> {
    fn process(&self, entry: &SourceEntry) -> Result<Outcome, BuildError> {
        debug!(path = %entry.rel.display(), "visiting");
        let kind = classify(&entry.rel, entry.is_dir, self.image_extensions);
        if kind == FileKind::Directory {
            return Ok(Outcome::Directory);
        }

        let dst = self.build_root.join(&entry.rel);
        if let Some(parent) = dst.parent() {
            fs::create_dir_all(parent).map_err(|source| BuildError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        match kind {
            FileKind::Directory => Ok(Outcome::Directory),
            FileKind::IndexDocument => self.build_page(entry, &dst.with_extension("html")),
            FileKind::Image => self.copy_image(entry, &dst),
            FileKind::Passthrough => self.copy_file(entry, &dst),
        }
    }

    fn build_page(&self, entry: &SourceEntry, dst: &Path) -> Result<Outcome, BuildError> {
        let page = self.context.build(&entry.path)?;
        let html = self.template.render(&page);
        fs::write(dst, html).map_err(|source| BuildError::FileIo {
            path: dst.to_path_buf(),
            source,
        })?;
        info!(page = %dst.display(), "rendered");
        Ok(Outcome::Page)
    }

    fn copy_image(&self, entry: &SourceEntry, dst: &Path) -> Result<Outcome, BuildError> {
        let mut src = File::open(&entry.path).map_err(file_io(&entry.path))?;
        let mut out = match OpenOptions::new().write(true).create_new(true).open(dst) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                debug!(image = %dst.display(), "already built, skipping");
                return Ok(Outcome::ImageSkipped);
            }
            Err(e) => return Err(file_io(dst)(e)),
        };
        // An existing destination means "done", so it must not outlive a
        // failed copy or thumbnail.
        if let Err(e) = io::copy(&mut src, &mut out) {
            drop(out);
            discard(dst);
            return Err(file_io(dst)(e));
        }
        drop(out);

        let thumb = match create_thumbnail(self.thumbnails, dst, &self.thumbnail) {
            Ok(thumb) => thumb,
            Err(source) => {
                discard(dst);
                return Err(BuildError::Thumbnail {
                    path: entry.path.clone(),
                    source,
                });
            }
        };
        info!(image = %dst.display(), thumbnail = %thumb.display(), "copied image");
        Ok(Outcome::ImageCopied)
    }

    fn copy_file(&self, entry: &SourceEntry, dst: &Path) -> Result<Outcome, BuildError> {
        fs::copy(&entry.path, dst).map_err(|source| BuildError::FileIo {
            path: entry.path.clone(),
            source,
        })?;
        debug!(file = %entry.rel.display(), "copied");
        Ok(Outcome::Copied)
    }
}

/// Remove an output that must not count as built.
fn discard(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        warn!(path = %path.display(), error = %e, "could not remove incomplete output");
    }
}
