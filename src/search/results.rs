use serde::Serialize;
use std::collections::HashMap;

use crate::core::types::{DocId, FieldId, FieldValue};

/// One ranked document in a search response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    /// The external document id, as inserted.
    pub id: FieldValue,
    /// Summed, weighted BM25 score across all matched (term, field)
    /// pairs.
    pub score: f64,
    /// Indexed terms that matched, deduplicated.
    pub terms: Vec<String>,
    /// Matched term → field names it matched in (each field at most
    /// once per term).
    pub matches: HashMap<String, Vec<String>>,
    /// Projection of the configured return fields, raw values.
    pub fields: HashMap<String, FieldValue>,
}

/// Per-term accumulation state for one document.
#[derive(Debug, Default)]
pub struct TermMatch {
    pub score: f64,
    pub fields: Vec<FieldId>,
}

/// Accumulates weighted scores keyed by (document, matched term),
/// enforcing pass-precedence deduplication: once a (term, field) pair
/// has been credited for a document, later contributions for the same
/// pair are ignored, so a weaker pass can never double count a match
/// an earlier pass already scored.
#[derive(Debug, Default)]
pub struct MatchAccumulator {
    entries: HashMap<DocId, HashMap<String, TermMatch>>,
}

impl MatchAccumulator {
    pub fn new() -> Self {
        MatchAccumulator {
            entries: HashMap::new(),
        }
    }

    /// Credit a weighted score to (doc, term, field). Returns false if
    /// the (term, field) pair was already credited for this document.
    pub fn credit(&mut self, doc_id: DocId, term: &str, field_id: FieldId, score: f64) -> bool {
        let term_match = self
            .entries
            .entry(doc_id)
            .or_default()
            .entry(term.to_string())
            .or_default();

        if term_match.fields.contains(&field_id) {
            return false;
        }
        term_match.fields.push(field_id);
        term_match.score += score;
        true
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> HashMap<DocId, HashMap<String, TermMatch>> {
        self.entries
    }
}
