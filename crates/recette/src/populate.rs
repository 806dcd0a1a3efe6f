//! Template population: record in, rendered markup out.
//!
//! The pipeline runs in a fixed order over a private copy of the template
//! tree:
//!
//! 1. Multi-select markers are replaced wholesale by badge groups.
//! 2. Chart configuration blocks receive freshly generated JSON.
//! 3. Every other field, in record order, is rendered by shape: list anchors
//!    get new items, rich paragraphs replace their enclosing `<p>`, scalars
//!    replace the content of each marker (or the `value` attribute of a void
//!    marker such as `<input>`).
//!
//! Every step addresses nodes through the template's [`MarkerIndex`], never by
//! searching text, so nothing written by one step can be matched by a later
//! one, and every generated region keeps a marker attribute so the output can
//! itself be populated again with the same result.

use recette_markup::{Document, NodeId, VOID_ELEMENTS};
use serde_json::Value;
use tracing::{debug, trace};

use crate::derive::recompute;
use crate::format::{escape_html, format_for_shape, format_value, value_to_text, MarkerShape};
use crate::generators::{render_badges, selected_values, BadgeDomain, CHARTS};
use crate::record::Record;
use crate::registry::{kind_of, FieldKind};
use crate::template::{MarkerIndex, Template, FIELD_ATTR};

/// The single item rendered for an empty list field.
pub const EMPTY_LIST_ITEM: &str = r#"<li class="list-empty">No items</li>"#;

/// Populates a template and serializes the result.
pub fn populate(template: &Template, record: &Record) -> String {
    populate_document(template, record).render()
}

/// Populates raw template text.
pub fn populate_str(template: &str, record: &Record) -> String {
    populate(&Template::parse("inline", template), record)
}

/// Populates a template, returning the tree for further passes.
///
/// The record is merged onto the defaults and its derived fields recomputed
/// on a copy; the caller's record is left untouched.
pub fn populate_document(template: &Template, record: &Record) -> Document {
    let mut record = record.clone().merged_onto_defaults();
    recompute(&mut record);

    let mut doc = template.instantiate();
    let index = template.index();
    debug!(template = template.name(), fields = record.len(), "populating template");

    render_multi_selects(&mut doc, index, &record);
    render_charts(&mut doc, index, &record);

    for (name, value) in record.iter() {
        let kind = kind_of(name);
        if matches!(kind, FieldKind::MultiSelect | FieldKind::Chart)
            || (value.is_array() && kind != FieldKind::List)
        {
            continue;
        }
        match kind {
            FieldKind::List => render_list(&mut doc, index, name, value),
            FieldKind::RichText => render_rich_text(&mut doc, index, name, value),
            _ => render_scalar(&mut doc, index, name, kind, value),
        }
    }

    doc
}

fn render_multi_selects(doc: &mut Document, index: &MarkerIndex, record: &Record) {
    for (name, value) in record.iter() {
        if kind_of(name) != FieldKind::MultiSelect {
            continue;
        }
        let Some(domain) = BadgeDomain::for_field(name) else {
            trace!(field = %name, "no badge domain, skipping");
            continue;
        };
        let markup = render_badges(name, domain, &selected_values(value));
        for &marker in index.fields(name) {
            if !doc.is_attached(marker) {
                continue;
            }
            let group = doc.parse_fragment(&markup);
            doc.replace(marker, group);
        }
    }
}

fn render_charts(doc: &mut Document, index: &MarkerIndex, record: &Record) {
    for chart in CHARTS {
        let Some(block) = index.chart_block(chart.block_id) else {
            trace!(block = chart.block_id, "chart block absent");
            continue;
        };
        let json = chart.config(record).to_json();
        let text = doc.create_text(json);
        doc.set_children(block, vec![text]);
    }
}

/// The `<li>` items for a list field value.
///
/// Markup values (starting with `<`) contribute the items inside their first
/// `ul`/`ol`, or their whole content when there is no list wrapper. Text values
/// contribute one escaped item per non-blank line. Arrays count as one line
/// per element.
pub fn list_items(value: &Value) -> String {
    let raw = match value {
        Value::Array(items) => items
            .iter()
            .map(value_to_text)
            .collect::<Vec<_>>()
            .join("\n"),
        other => value_to_text(other),
    };
    let trimmed = raw.trim();

    let items = if trimmed.starts_with('<') {
        let scratch = Document::parse(trimmed);
        let wrapper = scratch.elements().into_iter().find(|&id| {
            scratch
                .element(id)
                .is_some_and(|el| matches!(el.name(), "ul" | "ol"))
        });
        match wrapper {
            Some(list) => scratch.inner_html(list).trim().to_string(),
            None => trimmed.to_string(),
        }
    } else {
        trimmed
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| format!("<li>{}</li>", escape_html(line)))
            .collect::<String>()
    };

    if items.is_empty() {
        EMPTY_LIST_ITEM.to_string()
    } else {
        items
    }
}

fn render_list(doc: &mut Document, index: &MarkerIndex, name: &str, value: &Value) {
    let anchors = index.lists(name);
    if anchors.is_empty() {
        trace!(field = %name, "no list anchor");
        return;
    }
    let items = list_items(value);
    for &anchor in anchors {
        let nodes = doc.parse_fragment(&items);
        doc.set_children(anchor, nodes);
    }
}

/// The element a rich paragraph replaces: the nearest enclosing `<p>`, or the
/// marker itself.
fn rich_text_target(doc: &Document, marker: NodeId) -> NodeId {
    std::iter::once(marker)
        .chain(doc.ancestors(marker))
        .find(|&id| doc.element(id).is_some_and(|el| el.name() == "p"))
        .unwrap_or(marker)
}

fn render_rich_text(doc: &mut Document, index: &MarkerIndex, name: &str, value: &Value) {
    let html = value_to_text(value);
    for &marker in index.fields(name) {
        if !doc.is_attached(marker) {
            continue;
        }
        let target = rich_text_target(doc, marker);
        let block = doc.create_element("div", &[("class", "rich-text"), (FIELD_ATTR, name)]);
        let content = doc.parse_fragment(&html);
        doc.set_children(block, content);
        doc.replace(target, vec![block]);
    }
}

fn render_scalar(
    doc: &mut Document,
    index: &MarkerIndex,
    name: &str,
    kind: FieldKind,
    value: &Value,
) {
    let markers = index.fields(name);
    if markers.is_empty() {
        trace!(field = %name, "no marker in template");
        return;
    }
    for &marker in markers {
        let Some(el) = doc.element(marker) else {
            continue;
        };
        if VOID_ELEMENTS.contains(&el.name()) {
            doc.set_attr(marker, "value", &format_value(kind, value));
            continue;
        }
        let shape = MarkerShape::of(el.name());
        let markup = format_for_shape(kind, value, shape);
        let content = doc.parse_fragment(&markup);
        doc.set_children(marker, content);
    }
}
