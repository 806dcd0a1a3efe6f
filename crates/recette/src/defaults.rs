//! The zero-value record.

use serde_json::Value;

use crate::record::Record;
use crate::registry::{FieldKind, FIELDS};

/// Zero value for a field kind.
pub fn zero_value(kind: FieldKind) -> Value {
    match kind {
        FieldKind::Number | FieldKind::Percent => Value::from(0u64),
        FieldKind::MultiSelect => Value::Array(Vec::new()),
        FieldKind::Text
        | FieldKind::RichText
        | FieldKind::List
        | FieldKind::Chart
        | FieldKind::Link => Value::String(String::new()),
    }
}

/// A complete record covering every registered field.
///
/// Used as the state of a new report and as the base that loaded records
/// are merged onto.
pub fn default_record() -> Record {
    FIELDS
        .iter()
        .map(|spec| (spec.name.to_string(), zero_value(spec.kind)))
        .collect()
}
