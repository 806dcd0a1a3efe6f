//! Parsed templates and their marker index.

use std::collections::HashMap;

use recette_markup::{Document, NodeId};

use crate::generators::CHARTS;

/// Attribute naming the field a marker element stands for.
pub const FIELD_ATTR: &str = "data-field";

/// Attribute naming the list field whose items a `ul`/`ol` holds.
pub const LIST_ATTR: &str = "data-list";

/// Where every marker of a document lives.
///
/// Built once per document. Entries are in document order.
#[derive(Debug, Clone, Default)]
pub struct MarkerIndex {
    fields: HashMap<String, Vec<NodeId>>,
    lists: HashMap<String, Vec<NodeId>>,
    charts: HashMap<&'static str, NodeId>,
    /// Marker names in first-seen document order, with their source attribute.
    order: Vec<(String, MarkerSource)>,
}

/// Which kind of insertion point introduced a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerSource {
    Field,
    List,
    Chart,
}

impl MarkerIndex {
    pub fn build(doc: &Document) -> Self {
        let mut index = MarkerIndex::default();
        for id in doc.elements() {
            let Some(el) = doc.element(id) else {
                continue;
            };
            if let Some(name) = el.attr(FIELD_ATTR) {
                index.record(name, MarkerSource::Field);
                index.fields.entry(name.to_string()).or_default().push(id);
            }
            if let Some(name) = el.attr(LIST_ATTR) {
                index.record(name, MarkerSource::List);
                index.lists.entry(name.to_string()).or_default().push(id);
            }
            if let Some(element_id) = el.attr("id") {
                if let Some(chart) = CHARTS.iter().find(|c| c.block_id == element_id) {
                    if !index.charts.contains_key(chart.block_id) {
                        index.record(chart.field, MarkerSource::Chart);
                        index.charts.insert(chart.block_id, id);
                    }
                }
            }
        }
        index
    }

    fn record(&mut self, name: &str, source: MarkerSource) {
        if !self.order.iter().any(|(n, _)| n == name) {
            self.order.push((name.to_string(), source));
        }
    }

    /// Elements carrying `data-field="<name>"`.
    pub fn fields(&self, name: &str) -> &[NodeId] {
        self.fields.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Elements carrying `data-list="<name>"`.
    pub fn lists(&self, name: &str) -> &[NodeId] {
        self.lists.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The configuration block with the given element id.
    pub fn chart_block(&self, block_id: &str) -> Option<NodeId> {
        self.charts.get(block_id).copied()
    }

    /// Every marker name in first-seen order.
    pub fn names(&self) -> impl Iterator<Item = (&str, MarkerSource)> {
        self.order.iter().map(|(n, s)| (n.as_str(), *s))
    }

    /// Number of distinct names.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// A loaded template: its source, parse tree and marker index.
///
/// Templates are immutable once built. Each population works on its own copy
/// of the tree ([`Template::instantiate`]); node ids in the index are valid for
/// every copy.
#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    source: String,
    document: Document,
    index: MarkerIndex,
}

impl Template {
    pub fn parse(name: impl Into<String>, source: impl Into<String>) -> Self {
        let source = source.into();
        let document = Document::parse(&source);
        let index = MarkerIndex::build(&document);
        Self {
            name: name.into(),
            source,
            document,
            index,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn index(&self) -> &MarkerIndex {
        &self.index
    }

    /// A fresh, mutable copy of the tree.
    pub fn instantiate(&self) -> Document {
        self.document.clone()
    }
}
