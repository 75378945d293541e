//! The `<img>` hook: size classes and floats from the link field.
//!
//! An image link may carry a suffix after ` =`:
//!
//! ```text
//! ![Sunset](sunset.jpg =300)    → class="img-300"
//! ![Sunset](sunset.jpg =300l)   → class="img-300" style="float:left;"
//! ![Sunset](sunset.jpg =wider)  → class="img-wide" style="float:right;"
//! ```
//!
//! A trailing `l` or `r` always selects a float, even when it is part of a
//! word.

use crate::escape::escape_attr_into;

/// Float direction requested by an image suffix.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Float {
    #[default]
    None,
    Left,
    Right,
}

impl Float {
    fn style(self) -> Option<&'static str> {
        match self {
            Float::None => None,
            Float::Left => Some("float:left;"),
            Float::Right => Some("float:right;"),
        }
    }
}

/// Parsed ` =<size>[l|r]` suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSizeSpec<'a> {
    /// Size text without the float letter; may be empty (`url =l`).
    pub size: &'a str,
    pub float: Float,
}

impl ImageSizeSpec<'_> {
    /// CSS class for the size, `None` when the size text is empty.
    pub fn class(&self) -> Option<String> {
        (!self.size.is_empty()).then(|| format!("img-{}", self.size))
    }
}

/// Split an image link into its URL and optional size suffix.
///
/// Without a ` =` separator the link is returned unchanged.
pub fn parse_image_link(link: &str) -> (&str, Option<ImageSizeSpec<'_>>) {
    let Some((url, token)) = link.split_once(" =") else {
        return (link, None);
    };
    let token = token.trim();
    let (size, float) = if let Some(rest) = token.strip_suffix('l') {
        (rest, Float::Left)
    } else if let Some(rest) = token.strip_suffix('r') {
        (rest, Float::Right)
    } else {
        (token, Float::None)
    };
    (
        url.trim(),
        Some(ImageSizeSpec {
            size: size.trim(),
            float,
        }),
    )
}

/// Append an `<img>` tag for a markdown image to `out`.
///
/// `src` and `alt` are always present. `title`, `class`, and `style` appear
/// only when they have a value. Every value is attribute-escaped.
pub fn write_img(out: &mut String, link: &str, title: &str, alt: &str) {
    let (url, spec) = parse_image_link(link);

    out.push_str("<img src=\"");
    escape_attr_into(out, url);
    out.push_str("\" alt=\"");
    escape_attr_into(out, alt);
    out.push('"');

    if !title.is_empty() {
        out.push_str(" title=\"");
        escape_attr_into(out, title);
        out.push('"');
    }

    if let Some(spec) = spec {
        if let Some(class) = spec.class() {
            out.push_str(" class=\"");
            escape_attr_into(out, &class);
            out.push('"');
        }
        if let Some(style) = spec.float.style() {
            out.push_str(" style=\"");
            out.push_str(style);
            out.push('"');
        }
    }

    out.push('>');
}

#[cfg(test)]
mod tests {
    use super::*;

    fn img(link: &str, title: &str, alt: &str) -> String {
        let mut out = String::new();
        write_img(&mut out, link, title, alt);
        out
    }

    #[test]
    fn no_suffix_has_no_class_or_style() {
        let html = img("photo.jpg", "", "A photo");
        assert_eq!(html, r#"<img src="photo.jpg" alt="A photo">"#);
    }

    #[test]
    fn size_only_sets_class() {
        let html = img("photo.jpg =300", "", "");
        assert_eq!(html, r#"<img src="photo.jpg" alt="" class="img-300">"#);
    }

    #[test]
    fn size_with_l_floats_left() {
        let html = img("photo.jpg =300l", "", "");
        assert_eq!(
            html,
            r#"<img src="photo.jpg" alt="" class="img-300" style="float:left;">"#
        );
    }

    #[test]
    fn size_with_r_floats_right() {
        let html = img("photo.jpg =300r", "", "");
        assert_eq!(
            html,
            r#"<img src="photo.jpg" alt="" class="img-300" style="float:right;">"#
        );
    }

    #[test]
    fn title_included_only_when_present() {
        let html = img("photo.jpg", "Dusk", "");
        assert_eq!(html, r#"<img src="photo.jpg" alt="" title="Dusk">"#);
    }

    #[test]
    fn url_and_size_are_trimmed() {
        let (url, spec) = parse_image_link("  photo.jpg   =  half r ");
        assert_eq!(url, "photo.jpg");
        assert_eq!(
            spec,
            Some(ImageSizeSpec {
                size: "half",
                float: Float::Right
            })
        );
    }

    #[test]
    fn float_without_size_has_style_but_no_class() {
        let html = img("photo.jpg =l", "", "");
        assert_eq!(html, r#"<img src="photo.jpg" alt="" style="float:left;">"#);
    }

    #[test]
    fn empty_suffix_has_no_class_or_style() {
        let html = img("photo.jpg =", "", "");
        assert_eq!(html, r#"<img src="photo.jpg" alt="">"#);
    }

    #[test]
    fn trailing_letter_of_word_is_a_float() {
        let (_, spec) = parse_image_link("a.png =full");
        let spec = spec.unwrap();
        assert_eq!(spec.size, "ful");
        assert_eq!(spec.float, Float::Left);
    }

    #[test]
    fn split_happens_at_first_separator() {
        let (url, spec) = parse_image_link("a.png =1 =2");
        assert_eq!(url, "a.png");
        assert_eq!(spec.unwrap().size, "1 =2");
    }

    #[test]
    fn attribute_values_are_escaped() {
        let html = img(r#"a.png?x=1&y="2""#, r#"<"t">"#, "Tom & Jerry");
        assert_eq!(
            html,
            r#"<img src="a.png?x=1&amp;y=&quot;2&quot;" alt="Tom &amp; Jerry" title="&lt;&quot;t&quot;&gt;">"#
        );
    }

    #[test]
    fn class_text_is_escaped() {
        let html = img("a.png =<b>", "", "");
        assert!(html.contains(r#"class="img-&lt;b&gt;""#));
    }
}
