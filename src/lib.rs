//! # treepress
//!
//! A static site builder for a directory tree of markdown and images. The
//! source tree is the site: every directory becomes a section, its `index.md`
//! becomes its page, and every other file is mirrored as-is.
//!
//! # Architecture: One Walk
//!
//! ```text
//! src/                          build/
//! ├── index.md          →       ├── index.html        (rendered + templated)
//! ├── travel/                   ├── travel/
//! │   ├── index.md      →       │   ├── index.html
//! │   └── dusk.jpg      →       │   ├── dusk.jpg      (copied once)
//! │                             │   └── t/dusk.jpg    (thumbnail)
//! └── style.css         →       └── style.css         (copied every time)
//! ```
//!
//! The [`pipeline`] visits each source file once and dispatches it. Pages go
//! through the [`context`] builder (rendered markdown plus breadcrumbs) and
//! then the [`template`]. Images are copied and handed to an [`imaging`]
//! backend for a thumbnail. Everything else is copied.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`pipeline`] | Tree walk, classification, dispatch, failure policy |
//! | [`context`] | Rendered page plus breadcrumb trail for one `index.md` |
//! | [`render`] | Markdown → HTML with clearfix markers, sized images, highlighted code |
//! | [`highlight`] | `CodeHighlighter` trait and the `pygmentize` implementation |
//! | [`template`] | `PageTemplate` trait and the maud site layout |
//! | [`imaging`] | `ThumbnailBackend` trait, ImageMagick and pure-Rust backends |
//! | [`escape`] | HTML attribute escaping |
//! | [`config`] | `config.toml` loading, merging over stock defaults, validation |
//! | [`types`] | `RenderedPage` and `Breadcrumb` |
//! | [`output`] | CLI summary of a build |
//!
//! # Design Decisions
//!
//! ## No Change Detection
//!
//! Pages and plain files are rewritten on every build; images are skipped when
//! their copy already exists in the build tree. There is no hashing and no
//! timestamp comparison. Thumbnails are the only expensive output, and
//! "present means done" is enough for them. Deleting the build directory is
//! the reset.
//!
//! ## External Programs Behind Traits
//!
//! Thumbnails default to ImageMagick `convert` and highlighting uses
//! `pygmentize`. Both sit behind traits ([`imaging::ThumbnailBackend`],
//! [`highlight::CodeHighlighter`]) so tests run with mocks and a pure-Rust
//! thumbnail backend is one config switch away.
//!
//! ## Maud For The Page Shell
//!
//! The page layout is a [maud](https://maud.lambda.xyz/) template: breadcrumb
//! names are escaped automatically and the rendered markdown is embedded as
//! trusted HTML.

pub mod config;
pub mod context;
pub mod escape;
pub mod highlight;
pub mod imaging;
pub mod output;
pub mod pipeline;
pub mod render;
pub mod template;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
