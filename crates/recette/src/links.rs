//! Hyperlink annotation: wraps rendered field occurrences in links taken from
//! the record's `link_*` fields.

use recette_markup::{Document, NodeId};
use tracing::{debug, trace};

use crate::format::MarkerShape;
use crate::record::Record;
use crate::template::FIELD_ATTR;

/// Attribute identifying anchors created by the annotator.
pub const LINK_ATTR: &str = "data-link";

/// A link field and the fields whose occurrences it wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkRule {
    pub link: &'static str,
    pub targets: &'static [&'static str],
}

const fn rule(link: &'static str, targets: &'static [&'static str]) -> LinkRule {
    LinkRule { link, targets }
}

/// Every link field, in application order.
///
/// Some targets appear in more than one rule; when both links are set the
/// later rule's URL ends up on the anchor.
pub static LINK_RULES: &[LinkRule] = &[
    rule("link_project_name", &["project_name"]),
    rule("link_application", &["application"]),
    rule("link_package_version", &["package_version"]),
    rule("link_release_notes", &["package_version"]),
    rule("link_sprint", &["sprint"]),
    rule("link_us_todo", &["us_todo"]),
    rule("link_us_in_progress", &["us_in_progress"]),
    rule("link_us_in_review", &["us_in_review"]),
    rule("link_us_validated", &["us_validated"]),
    rule("link_us_rejected", &["us_rejected"]),
    rule("link_us_blocked", &["us_blocked"]),
    rule("link_us_board", &["nb_us_total", "taux_us_validated"]),
    rule("link_nb_tests_passed", &["nb_tests_passed"]),
    rule("link_nb_tests_failed", &["nb_tests_failed"]),
    rule("link_nb_tests_blocked", &["nb_tests_blocked"]),
    rule("link_nb_tests_not_run", &["nb_tests_not_run"]),
    rule("link_nb_tests_total", &["nb_tests_total"]),
    rule("link_nb_tests_executed", &["nb_tests_executed"]),
    rule(
        "link_test_campaign",
        &["nb_tests_total", "taux_execution", "taux_reussite"],
    ),
    rule("link_automation", &["nb_automated_tests", "pct_automation"]),
    rule("link_defauts_critical", &["defauts_critical"]),
    rule("link_defauts_high", &["defauts_high"]),
    rule("link_defauts_medium", &["defauts_medium"]),
    rule("link_defauts_low", &["defauts_low"]),
    rule("link_defauts_closed", &["defauts_closed"]),
    rule("link_defauts_identified", &["defauts_identified"]),
    rule("link_defauts_resolved", &["defauts_resolved"]),
    rule("link_defauts_active", &["defauts_active"]),
    rule("link_taux_resolution", &["taux_resolution"]),
    rule(
        "link_defects_board",
        &["defauts_identified", "defauts_active", "taux_resolution"],
    ),
];

impl LinkRule {
    /// Looks up the rule for a link field.
    pub fn for_link(link: &str) -> Option<&'static LinkRule> {
        LINK_RULES.iter().find(|rule| rule.link == link)
    }
}

/// Annotates rendered markup.
pub fn annotate(markup: &str, record: &Record) -> String {
    let mut doc = Document::parse(markup);
    annotate_document(&mut doc, record);
    doc.render()
}

/// Annotates a document in place. Running it twice leaves the document as the
/// first run left it.
///
/// Inline markers are wrapped from outside. Block markers (`td`, `div`, ...)
/// get the anchor inside them, around their content, so table rows stay
/// valid.
pub fn annotate_document(doc: &mut Document, record: &Record) {
    for rule in LINK_RULES {
        let url = record.text(rule.link);
        let url = url.trim();
        if url.is_empty() {
            continue;
        }
        for target in rule.targets {
            for marker in doc.find_by_attr(FIELD_ATTR, target) {
                link_occurrence(doc, marker, rule.link, url);
            }
        }
    }
}

fn is_anchor(doc: &Document, id: NodeId) -> bool {
    doc.element(id).is_some_and(|el| el.name() == "a")
}

fn is_generated_anchor(doc: &Document, id: NodeId) -> bool {
    is_anchor(doc, id) && doc.element(id).is_some_and(|el| el.has_attr(LINK_ATTR))
}

/// The anchor a previous run placed around (inline) or inside (block) the
/// marker.
fn existing_anchor(doc: &Document, marker: NodeId, shape: MarkerShape) -> Option<NodeId> {
    match shape {
        MarkerShape::Inline => doc.parent(marker).filter(|&p| is_generated_anchor(doc, p)),
        MarkerShape::Block => doc
            .children(marker)
            .iter()
            .copied()
            .find(|&c| is_generated_anchor(doc, c)),
    }
}

/// Whether an author-written link already covers the occurrence.
fn inside_link(doc: &Document, marker: NodeId, shape: MarkerShape) -> bool {
    if is_anchor(doc, marker) || doc.ancestors(marker).any(|a| is_anchor(doc, a)) {
        return true;
    }
    shape == MarkerShape::Block
        && doc
            .descendants(marker)
            .into_iter()
            .any(|d| is_anchor(doc, d))
}

fn link_occurrence(doc: &mut Document, marker: NodeId, link: &str, url: &str) {
    let Some(shape) = doc.element(marker).map(|el| MarkerShape::of(el.name())) else {
        return;
    };
    if let Some(anchor) = existing_anchor(doc, marker, shape) {
        doc.set_attr(anchor, "href", url);
        doc.set_attr(anchor, LINK_ATTR, link);
        trace!(link, "updated existing link");
        return;
    }
    if inside_link(doc, marker, shape) {
        trace!(link, "occurrence already inside a link");
        return;
    }
    let anchor = doc.create_element(
        "a",
        &[
            ("href", url),
            ("target", "_blank"),
            ("rel", "noopener noreferrer"),
            ("class", "field-link"),
            ("title", "Open in a new tab"),
            (LINK_ATTR, link),
        ],
    );
    match shape {
        // table cells and other containers keep their place in the layout
        MarkerShape::Block => {
            let content = doc.children(marker).to_vec();
            doc.set_children(anchor, content);
            doc.set_children(marker, vec![anchor]);
        }
        MarkerShape::Inline => doc.wrap(marker, anchor),
    }
    debug!(link, "linked field occurrence");
}
