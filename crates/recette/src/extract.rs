//! Reverse mapping from rendered markup to a partial record.
//!
//! Extraction is lossy by nature: only scalar text, counts and percentages
//! come back. Lists, rich paragraphs, badge groups and charts are one-way.

use recette_markup::{decode_entities, Document, NodeId, VOID_ELEMENTS};
use serde_json::Value;
use tracing::debug;

use crate::record::Record;
use crate::registry::{kind_of, FieldKind};
use crate::template::FIELD_ATTR;

/// Extracts scalar fields from rendered markup.
pub fn extract(markup: &str) -> Record {
    extract_document(&Document::parse(markup))
}

/// Extracts scalar fields from a parsed document. The first occurrence of a
/// field wins.
pub fn extract_document(doc: &Document) -> Record {
    let mut record = Record::new();
    for id in doc.elements() {
        let Some(name) = doc.element(id).and_then(|el| el.attr(FIELD_ATTR)) else {
            continue;
        };
        if record.contains(name) {
            continue;
        }
        let kind = kind_of(name);
        if !kind.is_extractable() {
            continue;
        }
        record.set(name, coerce(kind, marker_text(doc, id).trim()));
    }
    debug!(fields = record.len(), "extracted record");
    record
}

/// Shown text of a marker; void markers such as `<input>` carry it in `value`.
fn marker_text(doc: &Document, id: NodeId) -> String {
    match doc.element(id) {
        Some(el) if VOID_ELEMENTS.contains(&el.name()) => {
            el.attr("value").map(decode_entities).unwrap_or_default()
        }
        _ => doc.text_content(id),
    }
}

fn coerce(kind: FieldKind, text: &str) -> Value {
    match kind {
        FieldKind::Number => Value::from(parse_integer(text)),
        FieldKind::Percent => {
            let number = text.trim_end_matches('%').trim();
            let parsed = number.parse::<f64>().ok().filter(|f| f.is_finite());
            Value::from(parsed.unwrap_or(0.0))
        }
        _ => Value::String(text.to_string()),
    }
}

/// Leading integer of the text; zero when there is none.
fn parse_integer(text: &str) -> i64 {
    let digits_end = text
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+'))))
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    text[..digits_end].parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalars_by_kind() {
        let record = extract(concat!(
            r#"<span data-field="project_name"> Atlas &amp; co </span>"#,
            r#"<td data-field="defauts_high">12</td>"#,
            r#"<td data-field="taux_resolution">75%</td>"#,
            r#"<td data-field="nb_custom">abc</td>"#,
        ));
        assert_eq!(record.get("project_name"), Some(&json!("Atlas & co")));
        assert_eq!(record.get("defauts_high"), Some(&json!(12)));
        assert_eq!(record.get("taux_resolution"), Some(&json!(75.0)));
        assert_eq!(record.get("nb_custom"), Some(&json!(0)));
    }

    #[test]
    fn first_occurrence_wins() {
        let record = extract(r#"<b data-field="sprint">7</b><b data-field="sprint">8</b>"#);
        assert_eq!(record.get("sprint"), Some(&json!("7")));
        assert_eq!(record.len(), 1);
    }

    #[test]
    fn one_way_fields_are_skipped() {
        let record = extract(concat!(
            r#"<div class="rich-text" data-field="conclusion"><p>x</p></div>"#,
            r#"<div class="badge-group" data-field="environments"><span>DEV</span></div>"#,
            r#"<ul data-list="risks"><li>r</li></ul>"#,
        ));
        assert!(record.is_empty());
    }

    #[test]
    fn non_numeric_percent_is_zero() {
        let record = extract(r#"<i data-field="pct_automation">n/a</i>"#);
        assert_eq!(record.get("pct_automation"), Some(&json!(0.0)));
    }

    #[test]
    fn void_marker_value_attribute() {
        let record = extract(r#"<input data-field="author" value="Tom &amp; Jerry"><input data-field="defauts_low" value="7">"#);
        assert_eq!(record.get("author"), Some(&json!("Tom & Jerry")));
        assert_eq!(record.get("defauts_low"), Some(&json!(7)));
    }

    #[test]
    fn leading_integer() {
        assert_eq!(parse_integer("42"), 42);
        assert_eq!(parse_integer("42 open"), 42);
        assert_eq!(parse_integer(""), 0);
        assert_eq!(parse_integer("x1"), 0);
    }
}
