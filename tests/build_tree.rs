//! End-to-end builds of small source trees through the public API.

use std::fs;
use std::path::Path;
use std::sync::Mutex;
use tempfile::TempDir;
use treepress::config::{SiteConfig, ThumbnailBackendKind};
use treepress::imaging::{BackendError, ThumbnailBackend, ThumbnailParams};
use treepress::pipeline::{self, Collaborators, build_with};
use treepress::render::{CLEARFIX_HTML, ContentRenderer};
use treepress::template::SiteTemplate;

/// Writes a marker file for each thumbnail and remembers the output paths.
#[derive(Default)]
struct RecordingBackend {
    outputs: Mutex<Vec<String>>,
}

impl ThumbnailBackend for RecordingBackend {
    fn thumbnail(&self, params: &ThumbnailParams) -> Result<(), BackendError> {
        fs::write(&params.output, format!("thumb {}", params.max_width))?;
        self.outputs
            .lock()
            .unwrap()
            .push(params.output.to_string_lossy().to_string());
        Ok(())
    }
}

fn write(root: &Path, rel: &str, content: &[u8]) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn config() -> SiteConfig {
    let mut config = SiteConfig::default();
    config.highlight.enabled = false;
    config
}

fn run(source: &Path, output: &Path, backend: &RecordingBackend) -> pipeline::BuildReport {
    let config = config();
    let renderer = ContentRenderer::from_config(&config);
    let collaborators = Collaborators {
        renderer: &renderer,
        template: &SiteTemplate,
        thumbnails: backend,
    };
    build_with(source, output, &config, &collaborators).unwrap()
}

#[test]
fn page_image_and_thumbnail_end_to_end() {
    let tmp = TempDir::new().unwrap();
    let src = tmp.path().join("src");
    let build = tmp.path().join("build");
    write(
        &src,
        "a/index.md",
        b"Intro\n\n![Photo](photo.jpg =300l)\n<-->\nAfter\n",
    );
    write(&src, "a/photo.jpg", b"jpeg bytes");

    let backend = RecordingBackend::default();
    let report = run(&src, &build, &backend);

    let page = fs::read_to_string(build.join("a/index.html")).unwrap();
    assert!(page.starts_with("<!DOCTYPE html>"));
    assert!(page.contains(r#"<a href="/">Home</a>"#));
    assert!(page.contains(r#"<a href="/a/" aria-current="page">a</a>"#));
    assert!(page.contains(CLEARFIX_HTML));
    assert!(page.contains(
        r#"<img src="photo.jpg" alt="Photo" class="img-300" style="float:left;">"#
    ));

    assert_eq!(fs::read(build.join("a/photo.jpg")).unwrap(), b"jpeg bytes");
    assert_eq!(
        fs::read_to_string(build.join("a/t/photo.jpg")).unwrap(),
        "thumb 400"
    );
    assert_eq!(report.pages, 1);
    assert_eq!(report.thumbnails, 1);
}

#[test]
fn second_run_makes_no_thumbnail_calls() {
    let tmp = TempDir::new().unwrap();
    let src = tmp.path().join("src");
    let build = tmp.path().join("build");
    write(&src, "a/index.md", b"# A\n");
    write(&src, "a/photo.jpg", b"jpeg bytes");
    write(&src, "a/b/pic.png", b"png bytes");

    let first = RecordingBackend::default();
    run(&src, &build, &first);
    assert_eq!(first.outputs.lock().unwrap().len(), 2);

    // Pages are still re-rendered on the second run.
    write(&src, "a/index.md", b"# Changed\n");

    let second = RecordingBackend::default();
    let report = run(&src, &build, &second);
    assert!(second.outputs.lock().unwrap().is_empty());
    assert_eq!(report.images_skipped, 2);
    let page = fs::read_to_string(build.join("a/index.html")).unwrap();
    assert!(page.contains("Changed"));
}

#[test]
fn deep_page_has_full_breadcrumb_trail() {
    let tmp = TempDir::new().unwrap();
    let src = tmp.path().join("src");
    let build = tmp.path().join("build");
    write(&src, "travel/japan/kyoto/index.md", b"Temples\n");

    run(&src, &build, &RecordingBackend::default());

    let page = fs::read_to_string(build.join("travel/japan/kyoto/index.html")).unwrap();
    assert!(page.contains("<title>kyoto</title>"));
    assert!(page.contains(
        r#"<a href="/">Home</a> › <a href="/travel/">travel</a> › <a href="/travel/japan/">japan</a> › "#
    ));
}

#[test]
fn build_with_rust_backend_writes_real_thumbnail() {
    let tmp = TempDir::new().unwrap();
    let src = tmp.path().join("src");
    let build = tmp.path().join("build");
    fs::create_dir_all(src.join("gallery")).unwrap();
    image::RgbImage::from_pixel(800, 400, image::Rgb([200, 100, 50]))
        .save(src.join("gallery/wide.png"))
        .unwrap();

    let mut config = config();
    config.thumbnails.backend = ThumbnailBackendKind::Rust;
    config.thumbnails.width = 200;
    let report = pipeline::build(&src, &build, &config).unwrap();

    assert_eq!(report.thumbnails, 1);
    assert_eq!(
        image::image_dimensions(build.join("gallery/t/wide.png")).unwrap(),
        (200, 100)
    );
}
