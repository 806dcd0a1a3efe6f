//! # Recette - data-bound report templates
//!
//! Recette turns a flat report record (a sprint acceptance report: counts,
//! rates, narrative, links) into a rendered HTML report, and reads scalar
//! values back out of rendered reports.
//!
//! ## Templates
//!
//! Templates are plain HTML. Insertion points are marked with attributes:
//!
//! | Markup | Meaning |
//! |--------|---------|
//! | `<span data-field="sprint">0</span>` | the element's content is the field value |
//! | `<ul data-list="risks">...</ul>` | the list's items come from the field |
//! | `<script type="application/json" id="chart-us-status">` | chart configuration block |
//!
//! The marker element stays in the output, so a rendered report is itself a
//! valid template: rendering it again with the same record gives the same
//! result.
//!
//! ## Pipeline
//!
//! ```text
//! JSON ──load_record──▶ Record ──populate──▶ Document ──annotate──▶ HTML
//!        (migrate,                (derive,                (link_* fields)
//!         defaults)                badges, charts,
//!                                  fields)
//! HTML ──extract──▶ partial Record
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use recette::{populate_str, Record};
//!
//! let mut record = Record::new();
//! record.set("defauts_high", 3);
//! record.set("defauts_closed", 1);
//!
//! let html = populate_str(
//!     r#"<td data-field="defauts_active">0</td><td data-field="taux_resolution">0%</td>"#,
//!     &record,
//! );
//! assert_eq!(
//!     html,
//!     r#"<td data-field="defauts_active">2</td><td data-field="taux_resolution">33%</td>"#
//! );
//! ```
//!
//! For file-based templates, configuration and link annotation use
//! [`ReportEngine`].

pub mod catalog;
pub mod config;
pub mod defaults;
pub mod derive;
pub mod engine;
pub mod error;
pub mod extract;
pub mod format;
pub mod generators;
pub mod links;
pub mod migrate;
pub mod populate;
pub mod record;
pub mod registry;
pub mod store;
pub mod template;

pub use catalog::{Catalog, CatalogEntry, FieldType};
pub use config::EngineConfig;
pub use defaults::default_record;
pub use derive::{percent, recompute, CampaignSummary, DefectSummary};
pub use engine::ReportEngine;
pub use error::{RecetteError, Result};
pub use extract::{extract, extract_document};
pub use links::{annotate, annotate_document, LinkRule, LINK_RULES};
pub use migrate::{load_record, migrate, try_load_record};
pub use populate::{populate, populate_document, populate_str, EMPTY_LIST_ITEM};
pub use record::Record;
pub use registry::{FieldKind, FieldSpec, FIELDS};
pub use store::{ReloadPolicy, TemplateStore};
pub use template::Template;

pub use recette_markup::Document;
