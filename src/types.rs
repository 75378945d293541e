//! Types shared between the context builder, the page template, and the
//! build pipeline.

/// One level of site navigation derived from a document's directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breadcrumb {
    /// Site path, always ending in `/` (e.g. `/travel/japan/`).
    pub path: String,
    /// Display name: the raw directory segment, or the configured root name.
    pub name: String,
}

impl Breadcrumb {
    pub fn new(path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
        }
    }
}

/// Rendered markdown plus the breadcrumb trail for one `index.md`.
///
/// `content` is trusted HTML: the renderer has already escaped user text,
/// so templates embed it verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    pub content: String,
    pub breadcrumbs: Vec<Breadcrumb>,
}

impl RenderedPage {
    /// Name of the deepest breadcrumb, used as the page title.
    pub fn title(&self) -> &str {
        self.breadcrumbs
            .last()
            .map(|b| b.name.as_str())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_is_last_breadcrumb_name() {
        let page = RenderedPage {
            content: String::new(),
            breadcrumbs: vec![Breadcrumb::new("/", "Home"), Breadcrumb::new("/a/", "a")],
        };
        assert_eq!(page.title(), "a");
    }

    #[test]
    fn title_of_empty_trail_is_empty() {
        let page = RenderedPage {
            content: String::new(),
            breadcrumbs: vec![],
        };
        assert_eq!(page.title(), "");
    }
}
