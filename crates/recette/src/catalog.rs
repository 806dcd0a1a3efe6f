//! Field catalog: which fields a template exposes and what type they are.

use std::fmt;

use recette_markup::Document;
use serde::Serialize;

use crate::registry::{lookup, FieldKind, NARRATIVE_FIELDS};
use crate::template::{MarkerIndex, MarkerSource, Template};

/// Catalog-level field type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Number,
    Percent,
    Html,
    Chart,
}

impl FieldType {
    /// Infers a type from the name alone.
    ///
    /// Precedence: `chart_` prefix, then `taux_` anywhere or `pct_` prefix,
    /// then `nb_`/`bs_` prefix, then the narrative field set, then text.
    pub fn infer(name: &str) -> FieldType {
        if name.starts_with("chart_") {
            FieldType::Chart
        } else if name.contains("taux_") || name.starts_with("pct_") {
            FieldType::Percent
        } else if name.starts_with("nb_") || name.starts_with("bs_") {
            FieldType::Number
        } else if NARRATIVE_FIELDS.contains(&name) {
            FieldType::Html
        } else {
            FieldType::Text
        }
    }

    /// Type of a field: from the registry when known, inferred otherwise.
    pub fn of(name: &str) -> FieldType {
        lookup(name)
            .map(|spec| FieldType::from(spec.kind))
            .unwrap_or_else(|| FieldType::infer(name))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Number => "number",
            FieldType::Percent => "percent",
            FieldType::Html => "html",
            FieldType::Chart => "chart",
        }
    }
}

impl From<FieldKind> for FieldType {
    fn from(kind: FieldKind) -> Self {
        match kind {
            FieldKind::Number => FieldType::Number,
            FieldKind::Percent => FieldType::Percent,
            FieldKind::RichText | FieldKind::List => FieldType::Html,
            FieldKind::Chart => FieldType::Chart,
            FieldKind::Text | FieldKind::MultiSelect | FieldKind::Link => FieldType::Text,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One field exposed by a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Trimmed text of the first marker in the raw template.
    #[serde(rename = "defaultValue")]
    pub default_value: String,
}

/// The deduplicated, document-ordered list of template fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    /// Scans raw template text. A template without markers yields an empty
    /// catalog.
    pub fn scan(template: &str) -> Catalog {
        Self::from_document(&Document::parse(template))
    }

    pub fn from_document(doc: &Document) -> Catalog {
        Self::build(doc, &MarkerIndex::build(doc))
    }

    /// Catalog of an already-parsed template.
    pub fn from_template(template: &Template) -> Catalog {
        Self::build(template.document(), template.index())
    }

    fn build(doc: &Document, index: &MarkerIndex) -> Catalog {
        let entries = index
            .names()
            .map(|(name, source)| {
                let first = match source {
                    MarkerSource::Field => index.fields(name).first().copied(),
                    MarkerSource::List => index.lists(name).first().copied(),
                    MarkerSource::Chart => None,
                };
                CatalogEntry {
                    name: name.to_string(),
                    field_type: FieldType::of(name),
                    default_value: first
                        .map(|id| doc.text_content(id).trim().to_string())
                        .unwrap_or_default(),
                }
            })
            .collect();
        Catalog { entries }
    }

    pub fn get(&self, name: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a CatalogEntry;
    type IntoIter = std::slice::Iter<'a, CatalogEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
