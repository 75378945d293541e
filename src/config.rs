//! Site configuration module.
//!
//! Handles loading, validating, and merging the build configuration. User
//! values are layered on top of stock defaults, so a config file only needs
//! the keys it wants to change.
//!
//! ## Config File Location
//!
//! The CLI reads `config.toml` from the working directory by default
//! (`--config` overrides). A path ending in `.json` is parsed as JSON with the
//! same schema. When a `.toml` path does not exist, a `.json` file with the
//! same stem is tried instead. If neither exists, stock defaults apply.
//!
//! JSON files also accept the older flat keys `RootName`, `ThumbWidth` and
//! `ThumbQuality`, which map to `root_name`, `thumbnails.width` and
//! `thumbnails.quality`.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! root_name = "Home"        # Display name of the root breadcrumb
//! on_error = "abort"        # "abort" | "keep-going"
//!
//! [thumbnails]
//! width = 400               # Maximum thumbnail width in pixels
//! quality = 80              # Encoding quality (0-100)
//! backend = "imagemagick"   # "imagemagick" | "rust"
//! command = "convert"       # ImageMagick program
//!
//! [images]
//! extensions = ["jpg", "png"]
//!
//! [highlight]
//! enabled = true
//! command = "pygmentize"
//!
//! [markdown]
//! tables = true
//! footnotes = true
//! strikethrough = true
//! heading_attributes = true
//! definition_lists = true
//! smart_punctuation = true
//! tasklists = false
//!
//! [processing]
//! max_processes = 1         # 0 = one worker per core
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Build configuration.
///
/// Read once before the walk and shared read-only for the whole run.
/// Unknown keys are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Display name of the root breadcrumb (site path `/`).
    pub root_name: String,
    /// What to do when an entry fails.
    pub on_error: ErrorPolicy,
    /// Thumbnail generation settings.
    pub thumbnails: ThumbnailsConfig,
    /// Which files count as images.
    pub images: ImagesConfig,
    /// Fenced code highlighting.
    pub highlight: HighlightConfig,
    /// Markdown extension flags.
    pub markdown: MarkdownConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            root_name: "Home".to_string(),
            on_error: ErrorPolicy::default(),
            thumbnails: ThumbnailsConfig::default(),
            images: ImagesConfig::default(),
            highlight: HighlightConfig::default(),
            markdown: MarkdownConfig::default(),
            processing: ProcessingConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.thumbnails.quality > 100 {
            return Err(ConfigError::Validation(
                "thumbnails.quality must be 0-100".into(),
            ));
        }
        if self.thumbnails.width == 0 {
            return Err(ConfigError::Validation(
                "thumbnails.width must be non-zero".into(),
            ));
        }
        if self.images.extensions.is_empty() {
            return Err(ConfigError::Validation(
                "images.extensions must not be empty".into(),
            ));
        }
        if let Some(ext) = self
            .images
            .extensions
            .iter()
            .find(|e| e.is_empty() || e.starts_with('.'))
        {
            return Err(ConfigError::Validation(format!(
                "images.extensions entries must be bare extensions like \"jpg\", got {ext:?}"
            )));
        }
        Ok(())
    }
}

/// Failure handling for the tree walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorPolicy {
    /// Stop at the first failing entry.
    #[default]
    Abort,
    /// Record failures and keep walking.
    KeepGoing,
}

/// Which thumbnail implementation to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ThumbnailBackendKind {
    /// Shell out to ImageMagick `convert`.
    #[default]
    Imagemagick,
    /// Decode and re-encode in process with the `image` crate.
    Rust,
}

/// Thumbnail generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThumbnailsConfig {
    /// Maximum thumbnail width in pixels.
    pub width: u32,
    /// Encoding quality (0 = worst, 100 = best).
    pub quality: u32,
    pub backend: ThumbnailBackendKind,
    /// ImageMagick program used by the `imagemagick` backend.
    pub command: String,
}

impl Default for ThumbnailsConfig {
    fn default() -> Self {
        Self {
            width: 400,
            quality: 80,
            backend: ThumbnailBackendKind::default(),
            command: "convert".to_string(),
        }
    }
}

/// Image classification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImagesConfig {
    /// Extensions (without the dot) that are copied and thumbnailed.
    /// Matched ASCII case-insensitively.
    pub extensions: Vec<String>,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["jpg".to_string(), "png".to_string()],
        }
    }
}

/// Code highlighting settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HighlightConfig {
    /// When false, fenced code always uses the plain `<pre><code>` rendering.
    pub enabled: bool,
    /// Pygments-compatible program: `<command> -l<lang> -fhtml`.
    pub command: String,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            command: "pygmentize".to_string(),
        }
    }
}

/// Markdown extension flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarkdownConfig {
    pub tables: bool,
    pub footnotes: bool,
    pub strikethrough: bool,
    /// Explicit heading ids and classes: `# Title {#id .class}`.
    pub heading_attributes: bool,
    pub definition_lists: bool,
    /// Curly quotes, en/em dashes, and ellipses.
    pub smart_punctuation: bool,
    pub tasklists: bool,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            tables: true,
            footnotes: true,
            strikethrough: true,
            heading_attributes: true,
            definition_lists: true,
            smart_punctuation: true,
            tasklists: false,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel workers. `1` walks sequentially,
    /// `0` uses every core. Values larger than the core count are clamped down.
    pub max_processes: usize,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self { max_processes: 1 }
    }
}

/// Resolve the effective thread count from config.
///
/// - `0` → use all available cores
/// - `n` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    match config.max_processes {
        0 => cores,
        n => n.min(cores),
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"))
}

/// A JSON config in the older flat layout. Keys it does not name are kept
/// in `rest` and pass through untouched.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct LegacyJsonKeys {
    root_name: Option<String>,
    thumb_width: Option<u32>,
    thumb_quality: Option<u32>,
    #[serde(flatten)]
    rest: serde_json::Map<String, serde_json::Value>,
}

impl LegacyJsonKeys {
    fn into_current(self) -> serde_json::Value {
        let mut map = self.rest;
        if let Some(name) = self.root_name {
            map.insert("root_name".into(), name.into());
        }
        if self.thumb_width.is_some() || self.thumb_quality.is_some() {
            let thumbnails = map
                .entry("thumbnails")
                .or_insert_with(|| serde_json::Value::Object(serde_json::Map::new()));
            // A non-table `thumbnails` is left for deserialization to reject.
            if let Some(thumbnails) = thumbnails.as_object_mut() {
                if let Some(width) = self.thumb_width {
                    thumbnails.insert("width".into(), width.into());
                }
                if let Some(quality) = self.thumb_quality {
                    thumbnails.insert("quality".into(), quality.into());
                }
            }
        }
        serde_json::Value::Object(map)
    }
}

/// Rewrite the older flat JSON keys into the current layout.
fn upgrade_legacy_json(json: serde_json::Value) -> Result<serde_json::Value, ConfigError> {
    if !json.is_object() {
        return Ok(json);
    }
    let legacy: LegacyJsonKeys = serde_json::from_value(json)?;
    Ok(legacy.into_current())
}

/// The file to read for `path`: a missing `.toml` falls back to the `.json`
/// beside it when that exists.
fn locate_config(path: &Path) -> PathBuf {
    let is_toml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("toml"));
    if is_toml && !path.exists() {
        let json = path.with_extension("json");
        if json.exists() {
            return json;
        }
    }
    path.to_path_buf()
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist. JSON files are converted
/// to the equivalent TOML value so both formats merge the same way.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value = if is_json(path) {
        let json = upgrade_legacy_json(serde_json::from_str(&content)?)?;
        toml::Value::try_from(json).map_err(|e| ConfigError::Validation(e.to_string()))?
    } else {
        toml::from_str(&content)?
    };
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from the given file path.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(path: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(&locate_config(path))?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# treepress configuration
# =======================
# Every key is optional. Values shown are the defaults.

# Display name of the root breadcrumb (site path "/").
root_name = "Home"

# "abort" stops at the first failing file.
# "keep-going" reports every failure and exits non-zero at the end.
on_error = "abort"

[thumbnails]
# Thumbnails are never wider than this many pixels.
width = 400
# Encoding quality, 0-100.
quality = 80
# "imagemagick" runs `command`; "rust" encodes in process.
backend = "imagemagick"
command = "convert"

[images]
# Files with these extensions are copied once and get a thumbnail in t/.
extensions = ["jpg", "png"]

[highlight]
# Fenced code blocks with a language are piped through `command -l<lang> -fhtml`.
enabled = true
command = "pygmentize"

[markdown]
tables = true
footnotes = true
strikethrough = true
heading_attributes = true
definition_lists = true
smart_punctuation = true
tasklists = false

[processing]
# Parallel workers. 1 walks the tree sequentially, 0 uses every core.
max_processes = 1
"##
}
