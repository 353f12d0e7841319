//! HTML rendering helpers.

/// Tag used when a selector names no element.
pub const DEFAULT_TAG: &str = "div";

/// Replace `<`, `>`, `&` and `"` with their entity references.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// `<tag name="value" flag>`; attributes without a value render bare.
pub fn start_tag<'a>(tag: &str, attributes: impl IntoIterator<Item = (&'a str, Option<&'a str>)>) -> String {
    let mut html = format!("<{}", tag);
    for (name, value) in attributes {
        match value {
            Some(value) => html.push_str(&format!(" {}=\"{}\"", name, value)),
            None => {
                html.push(' ');
                html.push_str(name);
            }
        }
    }
    html.push('>');
    html
}

pub fn end_tag(tag: &str) -> String {
    format!("</{}>", tag)
}

/// Wrap verbatim stylesheet text, leaving it untouched.
pub fn style_block(css: &str) -> String {
    format!("<style>{}</style>", css)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_four_characters() {
        assert_eq!(escape(r#"<a href="x">&</a>"#), "&lt;a href=&quot;x&quot;&gt;&amp;&lt;/a&gt;");
    }

    #[test]
    fn test_escape_leaves_everything_else() {
        let text = "it's 100% café\n\t'quoted'";
        assert_eq!(escape(text), text);
    }

    #[test]
    fn test_escape_does_not_double_decode() {
        assert_eq!(escape("&amp;"), "&amp;amp;");
    }

    #[test]
    fn test_start_tag() {
        let html = start_tag("input", [("type", Some("checkbox")), ("checked", None)]);
        assert_eq!(html, r#"<input type="checkbox" checked>"#);
    }

    #[test]
    fn test_start_tag_without_attributes() {
        assert_eq!(start_tag(DEFAULT_TAG, Vec::<(&str, Option<&str>)>::new()), "<div>");
        assert_eq!(end_tag(DEFAULT_TAG), "</div>");
    }

    #[test]
    fn test_style_block_is_verbatim() {
        assert_eq!(style_block("a > b { c: \"&\" }"), "<style>a > b { c: \"&\" }</style>");
    }
}
