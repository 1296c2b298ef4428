use patricia_tree::PatriciaMap;
use std::collections::HashMap;

use crate::core::types::{DocId, FieldId};

/// Occurrence counts for one field of one term: short id → term
/// frequency (occurrences, not unique-term count).
pub type Postings = HashMap<DocId, u32>;

/// Everything the index knows about one term: field id → postings.
pub type TermRecord = HashMap<FieldId, Postings>;

/// The term index: a radix tree keyed by normalized terms.
///
/// A term is present iff at least one (field, document) pair still
/// references it; removal prunes empty inner maps so the tree never
/// carries dead keys.
#[derive(Debug, Clone, Default)]
pub struct TermTree {
    map: PatriciaMap<TermRecord>,
}

impl TermTree {
    pub fn new() -> Self {
        TermTree {
            map: PatriciaMap::new(),
        }
    }

    /// Number of distinct terms.
    pub fn term_count(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Point lookup by exact term.
    pub fn get(&self, term: &str) -> Option<&TermRecord> {
        self.map.get(term)
    }

    /// Record `freq` occurrences of `term` in `field_id` of `doc_id`.
    pub fn add_posting(&mut self, term: &str, field_id: FieldId, doc_id: DocId, freq: u32) {
        if let Some(record) = self.map.get_mut(term) {
            *record
                .entry(field_id)
                .or_default()
                .entry(doc_id)
                .or_insert(0) += freq;
            return;
        }

        let mut postings = Postings::new();
        postings.insert(doc_id, freq);
        let mut record = TermRecord::new();
        record.insert(field_id, postings);
        self.map.insert(term, record);
    }

    /// Remove the (field, document) cell for `term`, pruning the field
    /// entry and the term itself once nothing references them.
    pub fn remove_posting(&mut self, term: &str, field_id: FieldId, doc_id: DocId) {
        let Some(record) = self.map.get_mut(term) else {
            return;
        };

        if let Some(postings) = record.get_mut(&field_id) {
            postings.remove(&doc_id);
            if postings.is_empty() {
                record.remove(&field_id);
            }
        }
        if record.is_empty() {
            self.map.remove(term);
        }
    }

    /// Iterate every term that strictly extends `prefix`. The exact
    /// `prefix` key itself is excluded; the exact-match pass handles it
    /// and including it here would double count.
    pub fn extensions<'a>(
        &'a self,
        prefix: &'a str,
    ) -> impl Iterator<Item = (String, &'a TermRecord)> + 'a {
        self.map
            .iter_prefix(prefix.as_bytes())
            .filter(move |(key, _)| key.len() > prefix.len())
            .filter_map(|(key, record)| String::from_utf8(key).ok().map(|term| (term, record)))
    }

    /// Iterate every (term, record) pair. Order is unspecified.
    pub fn walk(&self) -> impl Iterator<Item = (String, &TermRecord)> + '_ {
        self.map
            .iter()
            .filter_map(|(key, record)| String::from_utf8(key).ok().map(|term| (term, record)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_accumulates_frequencies() {
        let mut tree = TermTree::new();
        tree.add_posting("elixir", 0, DocId(1), 1);
        tree.add_posting("elixir", 1, DocId(1), 1);
        tree.add_posting("elixir", 1, DocId(1), 2);
        tree.add_posting("elixir", 1, DocId(2), 1);

        let record = tree.get("elixir").unwrap();
        assert_eq!(record[&0][&DocId(1)], 1);
        assert_eq!(record[&1][&DocId(1)], 3);
        assert_eq!(record[&1][&DocId(2)], 1);
        assert_eq!(tree.term_count(), 1);
    }

    #[test]
    fn remove_prunes_empty_levels() {
        let mut tree = TermTree::new();
        tree.add_posting("web", 0, DocId(1), 1);
        tree.add_posting("web", 1, DocId(1), 1);
        tree.add_posting("web", 1, DocId(2), 1);

        tree.remove_posting("web", 1, DocId(1));
        assert_eq!(tree.get("web").unwrap().get(&1).unwrap().len(), 1);

        tree.remove_posting("web", 1, DocId(2));
        assert!(tree.get("web").unwrap().get(&1).is_none());

        tree.remove_posting("web", 0, DocId(1));
        assert!(tree.get("web").is_none());
        assert!(tree.is_empty());
    }

    #[test]
    fn extensions_exclude_the_exact_key() {
        let mut tree = TermTree::new();
        tree.add_posting("eli", 0, DocId(1), 1);
        tree.add_posting("elixir", 0, DocId(1), 1);
        tree.add_posting("elixirs", 0, DocId(2), 1);
        tree.add_posting("ember", 0, DocId(3), 1);

        let mut terms: Vec<String> = tree.extensions("eli").map(|(t, _)| t).collect();
        terms.sort();
        assert_eq!(terms, vec!["elixir", "elixirs"]);

        let none: Vec<String> = tree.extensions("elixirs").map(|(t, _)| t).collect();
        assert!(none.is_empty());
    }

    #[test]
    fn walk_visits_every_term() {
        let mut tree = TermTree::new();
        for term in ["a", "ab", "b", "ba"] {
            tree.add_posting(term, 0, DocId(1), 1);
        }

        let mut terms: Vec<String> = tree.walk().map(|(t, _)| t).collect();
        terms.sort();
        assert_eq!(terms, vec!["a", "ab", "b", "ba"]);
    }
}
