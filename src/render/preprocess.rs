//! Line-level rewrites applied before markdown parsing.
//!
//! Two rewrites run outside code (fenced or indented blocks and inline code
//! spans):
//!
//! - A line that is exactly `<-->` becomes a clearfix `<div>`, followed by a
//!   blank line so the next paragraph is not swallowed by the HTML block.
//! - `![alt](url =300l)` is rewritten to `![alt](<url =300l>)`. CommonMark
//!   does not allow spaces in a bare link destination, so without the angle
//!   brackets the parser would not see an image at all.
//!
//! Code is located with a first parse of the raw input, so blocks nested in
//! lists or quotes are found the same way the real render finds them.

use pulldown_cmark::{Event, Options, Parser, Tag};
use regex::Regex;
use std::borrow::Cow;
use std::ops::Range;
use std::sync::LazyLock;

/// Line token that forces a layout break.
pub const CLEARFIX_MARKER: &str = "<-->";

/// HTML substituted for [`CLEARFIX_MARKER`].
pub const CLEARFIX_HTML: &str = r#"<div class="clearfix"></div>"#;

const SIZED_IMAGE_REPLACEMENT: &str = "$1<$2 $3>$4)";

/// `![alt](dest =size "title")` with a bare destination.
static SIZED_IMAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(!\[[^\]]*\]\()[ \t]*([^\s<>()"]+)[ \t]+(=[^\s<>()"]*)([ \t]+"[^"]*")?[ \t]*\)"#)
        .expect("sized image pattern must compile")
});

/// Byte ranges of the input that the parser treats as code.
struct CodeRanges(Vec<Range<usize>>);

impl CodeRanges {
    fn scan(input: &str, options: Options) -> Self {
        let ranges = Parser::new_ext(input, options)
            .into_offset_iter()
            .filter_map(|(event, range)| match event {
                Event::Start(Tag::CodeBlock(_)) | Event::Code(_) => Some(range),
                _ => None,
            })
            .collect();
        Self(ranges)
    }

    fn overlaps(&self, start: usize, end: usize) -> bool {
        self.0.iter().any(|r| r.start < end && start < r.end)
    }
}

/// Rewrite sized-image destinations on one line into angle-bracket form.
pub fn wrap_sized_images(line: &str) -> Cow<'_, str> {
    wrap_sized_images_outside(line, |_| false)
}

/// Like [`wrap_sized_images`], but leaves a match alone when `in_code`
/// reports its byte range (relative to `line`) as code.
fn wrap_sized_images_outside(line: &str, in_code: impl Fn(Range<usize>) -> bool) -> Cow<'_, str> {
    let mut out = String::new();
    let mut last = 0;
    for caps in SIZED_IMAGE.captures_iter(line) {
        let Some(m) = caps.get(0) else { continue };
        if in_code(m.range()) {
            continue;
        }
        out.push_str(&line[last..m.start()]);
        caps.expand(SIZED_IMAGE_REPLACEMENT, &mut out);
        last = m.end();
    }
    if last == 0 {
        return Cow::Borrowed(line);
    }
    out.push_str(&line[last..]);
    Cow::Owned(out)
}

/// Apply the clearfix and sized-image rewrites to a whole document.
///
/// `options` should match the ones used for the final render so both parses
/// agree on where code is.
pub fn preprocess(input: &str, options: Options) -> String {
    let code = CodeRanges::scan(input, options);
    let mut out = String::with_capacity(input.len() + 64);
    let mut offset = 0;

    for raw in input.split_inclusive('\n') {
        let start = offset;
        offset += raw.len();
        let line = raw.strip_suffix('\n').unwrap_or(raw);
        let line = line.strip_suffix('\r').unwrap_or(line);
        let newline = &raw[line.len()..];

        if line == CLEARFIX_MARKER && !code.overlaps(start, offset) {
            out.push_str(CLEARFIX_HTML);
            out.push_str("\n\n");
        } else {
            let wrapped =
                wrap_sized_images_outside(line, |r| code.overlaps(start + r.start, start + r.end));
            out.push_str(&wrapped);
            out.push_str(newline);
        }
    }
    out
}
