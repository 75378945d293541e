//! Full HTML documents from rendered pages.
//!
//! The pipeline only depends on [`PageTemplate`]. [`SiteTemplate`] is the
//! shipped implementation, written with [maud](https://maud.lambda.xyz/) so
//! breadcrumb names are escaped at compile-checked interpolation points while
//! the already-rendered content is embedded verbatim.

use crate::types::{Breadcrumb, RenderedPage};
use maud::{DOCTYPE, Markup, PreEscaped, html};

const CSS: &str = include_str!("../static/style.css");

/// Separator between breadcrumb links.
pub const BREADCRUMB_SEPARATOR: &str = " › ";

/// Wraps a [`RenderedPage`] in a complete HTML document.
pub trait PageTemplate: Sync {
    fn render(&self, page: &RenderedPage) -> String;
}

/// The default site layout: breadcrumb navigation above the content.
#[derive(Debug, Default, Clone, Copy)]
pub struct SiteTemplate;

impl PageTemplate for SiteTemplate {
    fn render(&self, page: &RenderedPage) -> String {
        html! {
            (DOCTYPE)
            html lang="en" {
                head {
                    meta charset="UTF-8";
                    meta name="viewport" content="width=device-width, initial-scale=1.0";
                    title { (page.title()) }
                    style { (PreEscaped(CSS)) }
                }
                body {
                    (breadcrumb_nav(&page.breadcrumbs))
                    main {
                        (PreEscaped(&page.content))
                    }
                }
            }
        }
        .into_string()
    }
}

fn breadcrumb_nav(crumbs: &[Breadcrumb]) -> Markup {
    let last = crumbs.len().saturating_sub(1);
    html! {
        nav.breadcrumb aria-label="Breadcrumb" {
            @for (i, crumb) in crumbs.iter().enumerate() {
                @if i > 0 { (BREADCRUMB_SEPARATOR) }
                @if i == last {
                    a href=(crumb.path) aria-current="page" { (crumb.name) }
                } @else {
                    a href=(crumb.path) { (crumb.name) }
                }
            }
        }
    }
}
