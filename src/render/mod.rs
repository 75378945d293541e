//! Extended markdown to HTML.
//!
//! [`ContentRenderer`] runs three stages:
//!
//! 1. [`preprocess`]: clearfix markers and sized-image destinations,
//!    line by line, skipping anything the parser will treat as code.
//! 2. pulldown-cmark parsing with the configured extensions.
//! 3. One pass over the event stream that replaces fenced code blocks with
//!    highlighter output and images with [`image::write_img`] tags. Every
//!    other event goes to the stock HTML writer.
//!
//! The renderer is built once and shared by reference; it holds no mutable
//! state.

pub mod image;
pub mod preprocess;

use crate::config::{MarkdownConfig, SiteConfig};
use crate::highlight::{CodeHighlighter, Pygments};
use pulldown_cmark::{CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd, html};
use thiserror::Error;
use tracing::{debug, warn};

pub use preprocess::{CLEARFIX_HTML, CLEARFIX_MARKER, preprocess};

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("content is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
}

/// Markdown extension flags for the configured feature set.
pub fn options_from_config(config: &MarkdownConfig) -> Options {
    let mut options = Options::empty();
    let flags = [
        (config.tables, Options::ENABLE_TABLES),
        (config.footnotes, Options::ENABLE_FOOTNOTES),
        (config.strikethrough, Options::ENABLE_STRIKETHROUGH),
        (config.heading_attributes, Options::ENABLE_HEADING_ATTRIBUTES),
        (config.definition_lists, Options::ENABLE_DEFINITION_LIST),
        (config.smart_punctuation, Options::ENABLE_SMART_PUNCTUATION),
        (config.tasklists, Options::ENABLE_TASKLISTS),
    ];
    for (enabled, flag) in flags {
        if enabled {
            options.insert(flag);
        }
    }
    options
}

pub struct ContentRenderer {
    options: Options,
    highlighter: Option<Box<dyn CodeHighlighter>>,
}

impl ContentRenderer {
    /// Renderer without a highlighter: code blocks use the stock rendering.
    pub fn new(options: Options) -> Self {
        Self {
            options,
            highlighter: None,
        }
    }

    pub fn from_config(config: &SiteConfig) -> Self {
        let renderer = Self::new(options_from_config(&config.markdown));
        if config.highlight.enabled {
            renderer.with_highlighter(Pygments::with_program(&config.highlight.command))
        } else {
            renderer
        }
    }

    pub fn with_highlighter(mut self, highlighter: impl CodeHighlighter + 'static) -> Self {
        self.highlighter = Some(Box::new(highlighter));
        self
    }

    /// Render raw file bytes. Fails only when the bytes are not UTF-8.
    pub fn render(&self, input: &[u8]) -> Result<String, RenderError> {
        let text = std::str::from_utf8(input)?;
        Ok(self.render_str(text))
    }

    pub fn render_str(&self, input: &str) -> String {
        let source = preprocess(input, self.options);
        let parser = Parser::new_ext(&source, self.options);
        let events = self.apply_hooks(parser);

        let mut out = String::with_capacity(source.len() * 3 / 2);
        html::push_html(&mut out, events.into_iter());
        out
    }

    fn apply_hooks<'a>(&self, mut events: impl Iterator<Item = Event<'a>>) -> Vec<Event<'a>> {
        let mut out = Vec::new();
        while let Some(event) = events.next() {
            match event {
                Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info))) => {
                    let code = collect_code(&mut events);
                    match self.highlight(&info, &code) {
                        Some(html) => out.push(Event::Html(html.into())),
                        None => {
                            out.push(Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info))));
                            out.push(Event::Text(code.into()));
                            out.push(Event::End(TagEnd::CodeBlock));
                        }
                    }
                }
                Event::Start(Tag::Image {
                    dest_url, title, ..
                }) => {
                    let alt = collect_alt(&mut events);
                    let mut tag = String::new();
                    image::write_img(&mut tag, &dest_url, &title, &alt);
                    out.push(Event::InlineHtml(tag.into()));
                }
                other => out.push(other),
            }
        }
        out
    }

    /// Highlighted HTML for a fenced block, or `None` to fall back to the
    /// stock `<pre><code>` rendering.
    fn highlight(&self, info: &CowStr<'_>, code: &str) -> Option<String> {
        let highlighter = self.highlighter.as_ref()?;
        let lang = info.split_whitespace().next()?;
        match highlighter.highlight(lang, code) {
            Ok(html) => {
                debug!(lang, "highlighted code block");
                Some(html)
            }
            Err(e) => {
                warn!(lang, error = %e, "highlighting failed, using plain code block");
                None
            }
        }
    }
}

/// Drain a code block's text up to its end tag.
fn collect_code<'a>(events: &mut impl Iterator<Item = Event<'a>>) -> String {
    let mut code = String::new();
    for event in events.by_ref() {
        match event {
            Event::End(TagEnd::CodeBlock) => break,
            Event::Text(text) => code.push_str(&text),
            _ => {}
        }
    }
    code
}

/// Drain an image description up to its end tag, keeping only plain text.
fn collect_alt<'a>(events: &mut impl Iterator<Item = Event<'a>>) -> String {
    let mut alt = String::new();
    let mut depth = 0usize;
    for event in events.by_ref() {
        match event {
            Event::Start(Tag::Image { .. }) => depth += 1,
            Event::End(TagEnd::Image) if depth == 0 => break,
            Event::End(TagEnd::Image) => depth -= 1,
            Event::Text(text) | Event::Code(text) => alt.push_str(&text),
            Event::SoftBreak | Event::HardBreak => alt.push(' '),
            _ => {}
        }
    }
    alt
}
