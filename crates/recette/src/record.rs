//! The report record: a flat, ordered map from field name to JSON value.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::defaults::default_record;
use crate::error::{RecetteError, Result};
use crate::format::value_to_text;

/// One report instance.
///
/// Field order is insertion order and is significant: the populator visits
/// fields in this order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Parses a JSON object.
    ///
    /// # Errors
    ///
    /// Returns [`RecetteError::Json`] for malformed JSON and
    /// [`RecetteError::InvalidRecord`] if the document is not an object.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        match serde_json::from_str::<Value>(raw)? {
            Value::Object(map) => Ok(Self(map)),
            other => Err(RecetteError::InvalidRecord(format!(
                "expected a JSON object, found {}",
                json_type_name(&other)
            ))),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Sets a field. An existing field keeps its position.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    /// Removes a field, keeping the order of the remaining ones.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        let value = self.0.get(name).cloned()?;
        self.0.retain(|key, _| key != name);
        Some(value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Plain text of a field; empty when absent.
    pub fn text(&self, name: &str) -> String {
        self.get(name).map(value_to_text).unwrap_or_default()
    }

    /// A field coerced to a non-negative count; see [`as_count`].
    pub fn count(&self, name: &str) -> u64 {
        self.get(name).map(as_count).unwrap_or(0)
    }

    /// `{...defaults, ...self}`: every default field is present, every field of
    /// `self` is kept. Known fields stay in registry order; unknown ones follow.
    pub fn merged_onto_defaults(self) -> Record {
        let mut merged = default_record().0;
        for (name, value) in self.0 {
            merged.insert(name, value);
        }
        Record(merged)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Coerces a value to a non-negative count.
///
/// Integers are taken as-is, non-negative floats are rounded, numeric strings
/// are parsed. Negative, non-finite and non-numeric values count as zero.
pub fn as_count(value: &Value) -> u64 {
    match value {
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                u
            } else {
                n.as_f64().map(float_to_count).unwrap_or(0)
            }
        }
        Value::String(s) => {
            let s = s.trim();
            s.parse::<u64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(float_to_count))
                .unwrap_or(0)
        }
        _ => 0,
    }
}

fn float_to_count(f: f64) -> u64 {
    if f.is_finite() && f > 0.0 {
        f.round() as u64
    } else {
        0
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
