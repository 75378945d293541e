//! Page context: rendered content plus breadcrumbs for one `index.md`.
//!
//! Breadcrumbs mirror the directory hierarchy. For `src/travel/japan/index.md`
//! with root name `Home`:
//!
//! ```text
//! /                 Home
//! /travel/          travel
//! /travel/japan/    japan
//! ```

use crate::render::{ContentRenderer, RenderError};
use crate::types::{Breadcrumb, RenderedPage};
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContextError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{path} is not under source root {root}")]
    NotUnderRoot { path: PathBuf, root: PathBuf },
    #[error("failed to render {path}: {source}")]
    Render { path: PathBuf, source: RenderError },
}

/// Breadcrumb trail for a document directory relative to the source root.
///
/// Always starts with `("/", root_name)`. Only normal path segments count,
/// so empty and `.` segments add nothing.
pub fn breadcrumbs(root_name: &str, rel_dir: &Path) -> Vec<Breadcrumb> {
    let mut crumbs = vec![Breadcrumb::new("/", root_name)];
    let mut path = String::from("/");
    for component in rel_dir.components() {
        if let Component::Normal(segment) = component {
            let segment = segment.to_string_lossy();
            path.push_str(&segment);
            path.push('/');
            crumbs.push(Breadcrumb::new(path.clone(), segment));
        }
    }
    crumbs
}

/// Builds [`RenderedPage`]s for documents under one source root.
pub struct ContextBuilder<'a> {
    source_root: &'a Path,
    root_name: &'a str,
    renderer: &'a ContentRenderer,
}

impl<'a> ContextBuilder<'a> {
    pub fn new(source_root: &'a Path, root_name: &'a str, renderer: &'a ContentRenderer) -> Self {
        Self {
            source_root,
            root_name,
            renderer,
        }
    }

    /// Read, render, and place one document in the site hierarchy.
    pub fn build(&self, src: &Path) -> Result<RenderedPage, ContextError> {
        let bytes = fs::read(src).map_err(|source| ContextError::Read {
            path: src.to_path_buf(),
            source,
        })?;
        let content = self
            .renderer
            .render(&bytes)
            .map_err(|source| ContextError::Render {
                path: src.to_path_buf(),
                source,
            })?;

        let rel = src
            .strip_prefix(self.source_root)
            .map_err(|_| ContextError::NotUnderRoot {
                path: src.to_path_buf(),
                root: self.source_root.to_path_buf(),
            })?;
        let rel_dir = rel.parent().unwrap_or(Path::new(""));

        Ok(RenderedPage {
            content,
            breadcrumbs: breadcrumbs(self.root_name, rel_dir),
        })
    }
}
