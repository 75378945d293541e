//! CLI output formatting for a build.
//!
//! # Output Format
//!
//! ```text
//! Built src/ → build/
//!     3 pages
//!     2 images copied, 1 already present
//!     2 thumbnails
//!     5 files copied
//!
//! Failures (1)
//!     render: src/a/index.md
//!         content is not valid UTF-8: invalid utf-8 sequence of 1 bytes from index 0
//! ```
//!
//! # Architecture
//!
//! [`format_build_report`] returns `Vec<String>` for testability and
//! [`print_build_report`] writes it to stdout. The format function is pure.

use crate::pipeline::BuildReport;
use std::path::Path;

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `1 page`, `2 pages`.
fn count(n: usize, singular: &str, plural: &str) -> String {
    if n == 1 {
        format!("{n} {singular}")
    } else {
        format!("{n} {plural}")
    }
}

fn dir_label(path: &Path) -> String {
    let shown = path.display().to_string();
    if shown.ends_with('/') {
        shown
    } else {
        format!("{shown}/")
    }
}

/// Format the summary of one build.
pub fn format_build_report(report: &BuildReport, source: &Path, output: &Path) -> Vec<String> {
    let mut lines = vec![format!("Built {} → {}", dir_label(source), dir_label(output))];

    lines.push(format!("{}{}", indent(1), count(report.pages, "page", "pages")));

    let mut images = count(report.images_copied, "image copied", "images copied");
    if report.images_skipped > 0 {
        images.push_str(&format!(", {} already present", report.images_skipped));
    }
    lines.push(format!("{}{images}", indent(1)));
    lines.push(format!(
        "{}{}",
        indent(1),
        count(report.thumbnails, "thumbnail", "thumbnails")
    ));
    lines.push(format!(
        "{}{}",
        indent(1),
        count(report.files_copied, "file copied", "files copied")
    ));

    if !report.failures.is_empty() {
        lines.push(String::new());
        lines.push(format!("Failures ({})", report.failures.len()));
        for failure in &report.failures {
            let location = failure
                .path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(unknown path)".to_string());
            lines.push(format!("{}{}: {location}", indent(1), failure.step()));
            lines.push(format!("{}{failure}", indent(2)));
        }
    }
    lines
}

pub fn print_build_report(report: &BuildReport, source: &Path, output: &Path) {
    for line in format_build_report(report, source, output) {
        println!("{line}");
    }
}
