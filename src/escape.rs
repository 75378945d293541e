//! HTML attribute escaping.
//!
//! Only the four characters that can break out of a double-quoted attribute
//! value are rewritten. Runs of ordinary text are copied in one slice.

fn entity(ch: u8) -> Option<&'static str> {
    match ch {
        b'"' => Some("&quot;"),
        b'&' => Some("&amp;"),
        b'<' => Some("&lt;"),
        b'>' => Some("&gt;"),
        _ => None,
    }
}

/// Append `src` to `out`, escaped for use inside an HTML attribute value.
pub fn escape_attr_into(out: &mut String, src: &str) {
    let bytes = src.as_bytes();
    let mut start = 0;
    for (i, &ch) in bytes.iter().enumerate() {
        if let Some(replacement) = entity(ch) {
            // All four escaped bytes are ASCII, so `i` is a char boundary.
            out.push_str(&src[start..i]);
            out.push_str(replacement);
            start = i + 1;
        }
    }
    out.push_str(&src[start..]);
}

/// Escape `src` for use inside an HTML attribute value.
pub fn escape_attr(src: &str) -> String {
    let mut out = String::with_capacity(src.len());
    escape_attr_into(&mut out, src);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_quotes_ampersands_and_angle_brackets() {
        assert_eq!(
            escape_attr(r#"He said "hi" <b>&</b>"#),
            "He said &quot;hi&quot; &lt;b&gt;&amp;&lt;/b&gt;"
        );
    }

    #[test]
    fn plain_text_is_unchanged() {
        assert_eq!(escape_attr("photo-01.jpg"), "photo-01.jpg");
    }

    #[test]
    fn empty_input_gives_empty_output() {
        assert_eq!(escape_attr(""), "");
    }

    #[test]
    fn single_quotes_pass_through() {
        assert_eq!(escape_attr("it's"), "it's");
    }

    #[test]
    fn multibyte_text_around_entities_is_preserved() {
        assert_eq!(escape_attr("café & crème"), "café &amp; crème");
    }

    #[test]
    fn escape_into_appends_to_existing_buffer() {
        let mut out = String::from("src=\"");
        escape_attr_into(&mut out, "a?b=1&c=2");
        assert_eq!(out, "src=\"a?b=1&amp;c=2");
    }
}
