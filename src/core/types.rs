use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::fmt;

use crate::core::error::{Error, ErrorKind, Result};

/// Internal document handle: a positive integer allocated when a
/// document first enters the index. Handles are never reissued, so a
/// stale one can at worst miss, never alias a newer document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DocId(pub u64);

impl DocId {
    /// The id handed to the first document of a fresh index.
    pub(crate) const FIRST: DocId = DocId(1);

    /// The next id in allocation order.
    pub(crate) fn succ(self) -> DocId {
        DocId(self.0 + 1)
    }
}

impl fmt::Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Positional index into the configured field list.
pub type FieldId = usize;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Date(DateTime<Utc>),
    Json(JsonValue),
}

impl FieldValue {
    /// Canonical text rendering, fed to the tokenizer and used as the
    /// document identity key. `Json` arrays and objects have no canonical
    /// rendering and fail with `FieldNotString`.
    pub fn render(&self) -> Result<String> {
        match self {
            FieldValue::Text(s) => Ok(s.clone()),
            FieldValue::Integer(i) => Ok(i.to_string()),
            FieldValue::Float(f) => Ok(f.to_string()),
            FieldValue::Boolean(b) => Ok(b.to_string()),
            FieldValue::Date(d) => Ok(d.to_rfc3339()),
            FieldValue::Json(JsonValue::String(s)) => Ok(s.clone()),
            FieldValue::Json(JsonValue::Number(n)) => Ok(n.to_string()),
            FieldValue::Json(JsonValue::Bool(b)) => Ok(b.to_string()),
            FieldValue::Json(JsonValue::Null) => Ok(String::new()),
            FieldValue::Json(_) => Err(Error::new(ErrorKind::FieldNotString, "")),
        }
    }

    /// Type-tagged byte encoding used by the content fingerprint. Unlike
    /// `render`, this never collapses values of different types ("1" vs 1)
    /// and is defined for every variant.
    pub(crate) fn write_canonical(&self, out: &mut Vec<u8>) {
        match self {
            FieldValue::Text(s) => {
                out.push(0);
                out.extend_from_slice(s.as_bytes());
            }
            FieldValue::Integer(i) => {
                out.push(1);
                out.extend_from_slice(&i.to_le_bytes());
            }
            FieldValue::Float(f) => {
                out.push(2);
                out.extend_from_slice(&f.to_bits().to_le_bytes());
            }
            FieldValue::Boolean(b) => {
                out.push(3);
                out.push(*b as u8);
            }
            FieldValue::Date(d) => {
                out.push(4);
                out.extend_from_slice(d.to_rfc3339().as_bytes());
            }
            FieldValue::Json(v) => {
                out.push(5);
                write_canonical_json(v, out);
            }
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Integer(i)
    }
}

fn write_canonical_json(value: &JsonValue, out: &mut Vec<u8>) {
    match value {
        JsonValue::Null => out.push(0),
        JsonValue::Bool(b) => {
            out.push(1);
            out.push(*b as u8);
        }
        JsonValue::Number(n) => {
            out.push(2);
            out.extend_from_slice(n.to_string().as_bytes());
        }
        JsonValue::String(s) => {
            out.push(3);
            out.extend_from_slice(&(s.len() as u64).to_le_bytes());
            out.extend_from_slice(s.as_bytes());
        }
        JsonValue::Array(items) => {
            out.push(4);
            out.extend_from_slice(&(items.len() as u64).to_le_bytes());
            for item in items {
                write_canonical_json(item, out);
            }
        }
        JsonValue::Object(map) => {
            out.push(5);
            out.extend_from_slice(&(map.len() as u64).to_le_bytes());
            // serde_json map iteration order is insertion order; sort so the
            // fingerprint does not depend on it
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            for (key, item) in entries {
                out.extend_from_slice(&(key.len() as u64).to_le_bytes());
                out.extend_from_slice(key.as_bytes());
                write_canonical_json(item, out);
            }
        }
    }
}

/// A document as presented by the caller: named fields, one of which
/// (`id`) holds the external identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub fields: HashMap<String, FieldValue>,
}

impl Document {
    pub fn new() -> Self {
        Document {
            fields: HashMap::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn get_field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// The external identifier value, if present.
    pub fn id(&self) -> Option<&FieldValue> {
        self.fields.get("id")
    }

    /// CRC32 fingerprint over the full document (unindexed fields
    /// included), with fields visited in name order so the value is
    /// independent of map iteration order. Used only to validate
    /// removals; never exposed to callers.
    pub(crate) fn fingerprint(&self) -> u32 {
        let mut names: Vec<&String> = self.fields.keys().collect();
        names.sort();

        let mut buf = Vec::new();
        for name in names {
            buf.extend_from_slice(&(name.len() as u64).to_le_bytes());
            buf.extend_from_slice(name.as_bytes());
            self.fields[name].write_canonical(&mut buf);
        }

        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&buf);
        hasher.finalize()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
