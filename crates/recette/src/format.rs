//! Value formatting: typed record values to canonical text and markup.
//!
//! Everything here is a pure function. Two output flavors exist because the
//! template holds markers in two container shapes:
//!
//! | Shape | Elements | Newlines become |
//! |-------|----------|-----------------|
//! | [`MarkerShape::Inline`] | `span`, `strong`, `em`, ... | `&#10;` |
//! | [`MarkerShape::Block`] | `div`, `p`, `td`, `li`, ... | `<br>` |

use serde_json::{Number, Value};

use crate::registry::FieldKind;

/// Elements treated as block containers for scalar markers.
pub const BLOCK_ELEMENTS: &[&str] = &[
    "article",
    "blockquote",
    "dd",
    "div",
    "footer",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "header",
    "li",
    "p",
    "pre",
    "section",
    "td",
    "th",
];

/// The container shape of a scalar marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerShape {
    Inline,
    Block,
}

impl MarkerShape {
    /// Shape of a marker element by tag name.
    pub fn of(tag: &str) -> MarkerShape {
        if BLOCK_ELEMENTS.contains(&tag) {
            MarkerShape::Block
        } else {
            MarkerShape::Inline
        }
    }
}

/// Escapes the five HTML-sensitive characters.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Renders a JSON number as decimal digits; integral floats drop the fraction.
pub fn format_number(n: &Number) -> String {
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}

/// Plain text of a value, without kind-specific decoration.
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => format_number(n),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(value_to_text)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(_) => value.to_string(),
    }
}

/// Canonical (unescaped) text for a value of the given kind.
///
/// Percent values get a `%` suffix unless empty or already suffixed.
pub fn format_value(kind: FieldKind, value: &Value) -> String {
    let text = value_to_text(value);
    if kind == FieldKind::Percent && !text.is_empty() && !text.ends_with('%') {
        format!("{}%", text)
    } else {
        text
    }
}

/// Escaped text safe inside an inline element or an attribute.
pub fn format_inline(kind: FieldKind, value: &Value) -> String {
    escape_html(&format_value(kind, value))
        .replace("\r\n", "&#10;")
        .replace('\n', "&#10;")
}

/// Escaped text for a block element, keeping line breaks visible.
pub fn format_block(kind: FieldKind, value: &Value) -> String {
    escape_html(&format_value(kind, value))
        .replace("\r\n", "<br>")
        .replace('\n', "<br>")
}

/// Formats a value for a marker of the given shape.
pub fn format_for_shape(kind: FieldKind, value: &Value, shape: MarkerShape) -> String {
    match shape {
        MarkerShape::Inline => format_inline(kind, value),
        MarkerShape::Block => format_block(kind, value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn escape_html_all_five() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn numbers_render_as_digits() {
        assert_eq!(format_value(FieldKind::Number, &json!(42)), "42");
        assert_eq!(format_value(FieldKind::Number, &json!(-3)), "-3");
        assert_eq!(format_value(FieldKind::Number, &json!(7.0)), "7");
        assert_eq!(format_value(FieldKind::Number, &json!(2.5)), "2.5");
    }

    #[test]
    fn percent_suffix() {
        assert_eq!(format_value(FieldKind::Percent, &json!(67)), "67%");
        assert_eq!(format_value(FieldKind::Percent, &json!("80%")), "80%");
        assert_eq!(format_value(FieldKind::Percent, &json!("")), "");
        assert_eq!(format_value(FieldKind::Text, &json!(67)), "67");
    }

    #[test]
    fn null_and_arrays() {
        assert_eq!(format_value(FieldKind::Text, &Value::Null), "");
        assert_eq!(format_value(FieldKind::Text, &json!(["a", "", "b"])), "a, b");
    }

    #[test]
    fn inline_newlines_become_entities() {
        let out = format_inline(FieldKind::Text, &json!("line 1\r\nline <2>\nend"));
        assert_eq!(out, "line 1&#10;line &lt;2&gt;&#10;end");
        assert!(!out.contains('\n'));
    }

    #[test]
    fn block_newlines_become_breaks() {
        let out = format_block(FieldKind::Text, &json!("a\nb"));
        assert_eq!(out, "a<br>b");
    }

    #[test]
    fn marker_shape() {
        assert_eq!(MarkerShape::of("span"), MarkerShape::Inline);
        assert_eq!(MarkerShape::of("strong"), MarkerShape::Inline);
        assert_eq!(MarkerShape::of("td"), MarkerShape::Block);
        assert_eq!(MarkerShape::of("div"), MarkerShape::Block);
    }
}
