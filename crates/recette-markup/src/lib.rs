//! Lossless HTML parsing for template rewriting.
//!
//! This crate parses HTML into an arena-backed tree whose nodes are addressed by
//! stable [`NodeId`]s. It is not a browser-grade parser: it recognizes tags,
//! attributes, comments, declarations, raw-text elements (`script`, `style`,
//! `textarea`, `title`) and the handful of implicit closes that hand-written
//! templates rely on (`p`, `li`, `td`, ...). In exchange it keeps every byte of
//! the source, so untouched regions serialize exactly as they were read.
//!
//! # Example
//!
//! ```rust
//! use recette_markup::Document;
//!
//! let mut doc = Document::parse(r#"<p>Version <span data-field="v">x</span></p>"#);
//! let marker = doc.find_by_attr("data-field", "v")[0];
//! let text = doc.create_text("12.0.8");
//! doc.set_children(marker, vec![text]);
//!
//! assert_eq!(doc.render(), r#"<p>Version <span data-field="v">12.0.8</span></p>"#);
//! ```
//!
//! # Stable ids
//!
//! A [`NodeId`] is an index into the arena. Detached nodes keep their slot, and a
//! cloned document shares the same ids, so an index built once over a template
//! can be used against every copy made from it.

mod document;
mod entities;
mod tokenizer;

pub use document::{Attribute, Document, Element, NodeData, NodeId, VOID_ELEMENTS};
pub use entities::{decode_entities, escape_attr_value};
