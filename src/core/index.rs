use log::debug;
use std::collections::HashMap;

use crate::analysis::analyzer::Analyzer;
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::registry::DocumentRegistry;
use crate::core::stats::FieldStats;
use crate::core::types::{DocId, Document, FieldValue};
use crate::index::term_tree::TermTree;
use crate::search::executor::QueryExecutor;
use crate::search::options::SearchOptions;
use crate::search::results::SearchResult;

/// An in-memory full-text search index.
///
/// Created over a fixed field list, mutated synchronously through
/// `add`/`remove`, queried through `search`. Every mutation leaves the
/// index fully consistent; `clone` yields an independent snapshot that
/// can be read from other threads while the original keeps mutating.
#[derive(Debug, Clone)]
pub struct SearchIndex {
    /// Indexed field names; field ids are positions in this list.
    pub(crate) fields: Vec<String>,
    /// Field names projected back into search results.
    pub(crate) return_fields: Vec<String>,
    /// Short id → stored return-field values.
    pub(crate) return_field_data: HashMap<DocId, HashMap<String, FieldValue>>,
    pub(crate) registry: DocumentRegistry,
    pub(crate) stats: FieldStats,
    pub(crate) tree: TermTree,
    pub(crate) analyzer: Analyzer,
}

impl SearchIndex {
    /// Create an index over `fields`. The field list is fixed for the
    /// lifetime of the index.
    pub fn new<S: Into<String>>(fields: Vec<S>) -> Self {
        Self::with_return_fields(fields, Vec::<String>::new())
    }

    /// Create an index that additionally stores the raw values of
    /// `return_fields` and hands them back with each search result.
    pub fn with_return_fields<S: Into<String>, R: Into<String>>(
        fields: Vec<S>,
        return_fields: Vec<R>,
    ) -> Self {
        let fields: Vec<String> = fields.into_iter().map(Into::into).collect();
        let field_count = fields.len();
        SearchIndex {
            fields,
            return_fields: return_fields.into_iter().map(Into::into).collect(),
            return_field_data: HashMap::new(),
            registry: DocumentRegistry::new(),
            stats: FieldStats::new(field_count),
            tree: TermTree::new(),
            analyzer: Analyzer::standard(),
        }
    }

    /// Number of live documents.
    pub fn document_count(&self) -> usize {
        self.registry.document_count()
    }

    pub fn is_empty(&self) -> bool {
        self.document_count() == 0
    }

    /// Number of distinct terms in the term index.
    pub fn term_count(&self) -> usize {
        self.tree.term_count()
    }

    pub fn field_names(&self) -> &[String] {
        &self.fields
    }

    /// Whether a document with this external id is present.
    pub fn contains_document(&self, id: &FieldValue) -> bool {
        match id.render() {
            Ok(rendered) => self.registry.contains(&rendered),
            Err(_) => false,
        }
    }

    /// Index one document. The `id` field identifies it; indexed fields
    /// are tokenized, everything else only contributes to the stored
    /// fingerprint. Fails without touching the index.
    pub fn add(&mut self, doc: Document) -> Result<()> {
        let id_value = doc
            .id()
            .ok_or_else(|| Error::new(ErrorKind::DocumentMissingId, ""))?
            .clone();
        let rendered = id_value
            .render()
            .map_err(|e| Error::new(e.kind, "field 'id'"))?;

        if self.registry.contains(&rendered) {
            return Err(Error::new(ErrorKind::DocumentExists, rendered));
        }

        // Tokenize every indexed field up front so a failing field
        // cannot leave partial postings behind.
        let field_terms = self.tokenize_fields(&doc)?;
        let fingerprint = doc.fingerprint();

        let doc_id = self.registry.insert(&rendered, id_value, fingerprint)?;

        let mut lengths = Vec::with_capacity(self.fields.len());
        for (field_id, counts) in field_terms.iter().enumerate() {
            lengths.push(counts.len() as u32);
            for (term, freq) in counts {
                self.tree.add_posting(term, field_id, doc_id, *freq);
            }
        }
        self.stats
            .add_document(doc_id, lengths, self.registry.document_count());

        let projection: HashMap<String, FieldValue> = self
            .return_fields
            .iter()
            .filter_map(|name| doc.get_field(name).map(|v| (name.clone(), v.clone())))
            .collect();
        self.return_field_data.insert(doc_id, projection);

        debug!("indexed document '{}' as short id {}", rendered, doc_id);
        Ok(())
    }

    /// Index a batch, equivalent to a left fold of single adds.
    /// Fails fast: documents after the first failure are not processed,
    /// documents before it stay indexed.
    pub fn add_all(&mut self, docs: Vec<Document>) -> Result<()> {
        for doc in docs {
            self.add(doc)?;
        }
        Ok(())
    }

    /// Remove a document. The caller must present the original document
    /// unchanged: the stored fingerprint is recomputed and compared, and
    /// a mismatch fails the removal rather than risk partially deleted
    /// postings.
    pub fn remove(&mut self, doc: &Document) -> Result<()> {
        let id_value = doc
            .id()
            .ok_or_else(|| Error::new(ErrorKind::DocumentMissingId, ""))?;
        let rendered = id_value
            .render()
            .map_err(|e| Error::new(e.kind, "field 'id'"))?;

        let doc_id = self.registry.verify(&rendered, doc.fingerprint())?;
        let field_terms = self.tokenize_fields(doc)?;

        self.registry.remove(&rendered, doc_id);
        for (field_id, counts) in field_terms.iter().enumerate() {
            for term in counts.keys() {
                self.tree.remove_posting(term, field_id, doc_id);
            }
        }
        self.stats
            .remove_document(doc_id, self.registry.document_count());
        self.return_field_data.remove(&doc_id);

        debug!("removed document '{}' (short id {})", rendered, doc_id);
        Ok(())
    }

    /// Remove a batch with the same fail-fast semantics as `add_all`.
    pub fn remove_all(&mut self, docs: &[Document]) -> Result<()> {
        for doc in docs {
            self.remove(doc)?;
        }
        Ok(())
    }

    /// Search with default options (exact matching only).
    pub fn search(&self, query: &str) -> Vec<SearchResult> {
        self.search_with(query, &SearchOptions::default())
    }

    /// Search with explicit options. Results are sorted by descending
    /// score; an empty or unmatched query yields an empty list.
    pub fn search_with(&self, query: &str, options: &SearchOptions) -> Vec<SearchResult> {
        QueryExecutor::new().execute(self, query, options)
    }

    /// Per-field occurrence counts of a document, in field-id order.
    /// The map size per field is the unique-term count.
    fn tokenize_fields(&self, doc: &Document) -> Result<Vec<HashMap<String, u32>>> {
        let mut field_terms = Vec::with_capacity(self.fields.len());
        for name in &self.fields {
            let mut counts: HashMap<String, u32> = HashMap::new();
            if let Some(value) = doc.get_field(name) {
                let text = value
                    .render()
                    .map_err(|e| Error::new(e.kind, format!("field '{}'", name)))?;
                for term in self.analyzer.terms(&text) {
                    *counts.entry(term).or_insert(0) += 1;
                }
            }
            field_terms.push(counts);
        }
        Ok(field_terms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    const EPS: f64 = 1e-3;

    fn d1() -> Document {
        Document::new()
            .with_field("id", 100i64)
            .with_field("title", "Elixir")
            .with_field("content", "Elixir is a dynamic, functional language.")
            .with_field("tag", "lang")
    }

    fn d2() -> Document {
        Document::new()
            .with_field("id", 101i64)
            .with_field("title", "Phoenix")
            .with_field("content", "Phoenix is a web framework for Elixir.")
            .with_field("tag", "framework")
    }

    fn d3() -> Document {
        Document::new()
            .with_field("id", 102i64)
            .with_field("title", "Nerves")
            .with_field("content", "Nerves is a framework for embedded systems.")
            .with_field("tag", "framework")
    }

    fn indexed() -> SearchIndex {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut index = SearchIndex::new(vec!["title", "content"]);
        index.add_all(vec![d1(), d2(), d3()]).unwrap();
        index
    }

    /// Everything but `next_id` and the float averages, in a comparable
    /// form.
    #[derive(Debug, PartialEq)]
    struct Snapshot {
        document_count: usize,
        ids: BTreeMap<String, u64>,
        short_ids: BTreeMap<u64, FieldValue>,
        hashes: BTreeMap<u64, u32>,
        field_lengths: BTreeMap<u64, Vec<u32>>,
        return_field_data: BTreeMap<u64, Vec<(String, FieldValue)>>,
        tree: BTreeMap<String, BTreeMap<usize, BTreeMap<u64, u32>>>,
    }

    fn snapshot(index: &SearchIndex) -> Snapshot {
        Snapshot {
            document_count: index.document_count(),
            ids: index
                .registry
                .ids
                .iter()
                .map(|(k, v)| (k.clone(), v.0))
                .collect(),
            short_ids: index
                .registry
                .short_ids
                .iter()
                .map(|(k, v)| (k.0, v.clone()))
                .collect(),
            hashes: index
                .registry
                .hashes
                .iter()
                .map(|(k, v)| (k.0, *v))
                .collect(),
            field_lengths: index
                .stats
                .field_lengths
                .iter()
                .map(|(k, v)| (k.0, v.clone()))
                .collect(),
            return_field_data: index
                .return_field_data
                .iter()
                .map(|(k, v)| {
                    let mut entries: Vec<_> =
                        v.iter().map(|(n, val)| (n.clone(), val.clone())).collect();
                    entries.sort_by(|a, b| a.0.cmp(&b.0));
                    (k.0, entries)
                })
                .collect(),
            tree: index
                .tree
                .walk()
                .map(|(term, record)| {
                    let record: BTreeMap<usize, BTreeMap<u64, u32>> = record
                        .iter()
                        .map(|(field_id, postings)| {
                            (
                                *field_id,
                                postings.iter().map(|(doc, freq)| (doc.0, *freq)).collect(),
                            )
                        })
                        .collect();
                    (term, record)
                })
                .collect(),
        }
    }

    fn assert_consistent(index: &SearchIndex) {
        let count = index.document_count();
        assert_eq!(index.registry.ids.len(), count);
        assert_eq!(index.registry.short_ids.len(), count);
        assert_eq!(index.registry.hashes.len(), count);
        assert_eq!(index.stats.field_lengths.len(), count);
        assert_eq!(index.return_field_data.len(), count);

        // ids and short_ids are mutual inverses
        for (rendered, doc_id) in &index.registry.ids {
            let external = index.registry.short_ids.get(doc_id).unwrap();
            assert_eq!(&external.render().unwrap(), rendered);
        }

        // every short id in the tree is live
        for (_, record) in index.tree.walk() {
            for postings in record.values() {
                assert!(!postings.is_empty());
                for doc_id in postings.keys() {
                    assert!(index.registry.short_ids.contains_key(doc_id));
                }
            }
        }
    }

    #[test]
    fn exact_search_ranks_and_scores() {
        let index = indexed();
        let results = index.search("Elixir");

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, FieldValue::Integer(100));
        assert_eq!(results[1].id, FieldValue::Integer(101));
        assert!((results[0].score - 2.1949).abs() < EPS);
        assert!((results[1].score - 0.6962).abs() < EPS);
        assert_eq!(results[0].terms, vec!["elixir"]);
    }

    #[test]
    fn prefix_search_finds_extensions() {
        let index = indexed();
        let results = index.search_with("Eli", &SearchOptions::exact().with_prefix());

        assert_eq!(results.len(), 2);
        let mut ids: Vec<FieldValue> = results.iter().map(|r| r.id.clone()).collect();
        ids.sort_by_key(|v| match v {
            FieldValue::Integer(i) => *i,
            _ => 0,
        });
        assert_eq!(ids, vec![FieldValue::Integer(100), FieldValue::Integer(101)]);
        for result in &results {
            assert!(result.score > 0.0);
            assert_eq!(result.terms, vec!["elixir"]);
        }
    }

    #[test]
    fn removal_reshapes_scores() {
        let mut index = indexed();
        index.remove(&d1()).unwrap();

        let results = index.search("Phoenix");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, FieldValue::Integer(101));
        assert!((results[0].score - 2.0794).abs() < EPS);
        assert_consistent(&index);
    }

    #[test]
    fn add_then_remove_returns_to_empty_except_next_id() {
        let empty = SearchIndex::new(vec!["title", "content"]);
        let mut index = empty.clone();
        index.add(d1()).unwrap();
        index.remove(&d1()).unwrap();

        assert_eq!(snapshot(&index), snapshot(&empty));
        for avg in &index.stats.avg_field_lengths {
            assert_eq!(*avg, 0.0);
        }
        assert_eq!(index.registry.next_id, DocId(2));
        assert_eq!(empty.registry.next_id, DocId(1));
        assert!(index.tree.is_empty());
        assert_consistent(&index);
    }

    #[test]
    fn remove_then_readd_restores_state() {
        let index = indexed();
        let before = snapshot(&index);
        let avgs_before = index.stats.avg_field_lengths.clone();

        let mut index2 = index.clone();
        index2.remove(&d2()).unwrap();
        index2.add(d2()).unwrap();

        let after = snapshot(&index2);
        // the re-added document gets a fresh short id
        assert_eq!(after.ids["101"], 4);
        assert!(index2.registry.next_id > index.registry.next_id);

        // modulo that renumbering, the state is identical
        let renumber = |snap: Snapshot, from: u64, to: u64| -> Snapshot {
            let remap = |id: u64| if id == from { to } else { id };
            Snapshot {
                document_count: snap.document_count,
                ids: snap.ids.into_iter().map(|(k, v)| (k, remap(v))).collect(),
                short_ids: snap
                    .short_ids
                    .into_iter()
                    .map(|(k, v)| (remap(k), v))
                    .collect(),
                hashes: snap
                    .hashes
                    .into_iter()
                    .map(|(k, v)| (remap(k), v))
                    .collect(),
                field_lengths: snap
                    .field_lengths
                    .into_iter()
                    .map(|(k, v)| (remap(k), v))
                    .collect(),
                return_field_data: snap
                    .return_field_data
                    .into_iter()
                    .map(|(k, v)| (remap(k), v))
                    .collect(),
                tree: snap
                    .tree
                    .into_iter()
                    .map(|(term, record)| {
                        (
                            term,
                            record
                                .into_iter()
                                .map(|(f, postings)| {
                                    (f, postings.into_iter().map(|(d, c)| (remap(d), c)).collect())
                                })
                                .collect(),
                        )
                    })
                    .collect(),
            }
        };
        assert_eq!(renumber(after, 4, 2), before);

        for (a, b) in index2.stats.avg_field_lengths.iter().zip(&avgs_before) {
            assert!((a - b).abs() < 1e-9);
        }
        assert_consistent(&index2);
    }

    #[test]
    fn identical_ingest_is_deterministic() {
        let a = indexed();
        let mut b = SearchIndex::new(vec!["title", "content"]);
        b.add_all(vec![d1(), d2(), d3()]).unwrap();

        assert_eq!(snapshot(&a), snapshot(&b));
        assert_eq!(a.stats.avg_field_lengths, b.stats.avg_field_lengths);
        assert_eq!(a.registry.next_id, b.registry.next_id);
    }

    #[test]
    fn empty_and_unmatched_queries_return_nothing() {
        let index = indexed();
        assert!(index.search("").is_empty());
        assert!(index.search("not-found").is_empty());
        assert!(
            index
                .search_with(
                    "zzzz",
                    &SearchOptions::exact().with_prefix().with_fuzzy(1)
                )
                .is_empty()
        );
    }

    #[test]
    fn prefix_and_fuzzy_compose_without_double_counting() {
        let index = indexed();
        let options = SearchOptions::exact().with_prefix().with_fuzzy(2);
        let results = index.search_with("web famewrk", &options);

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, FieldValue::Integer(101));
        assert_eq!(results[1].id, FieldValue::Integer(102));
        assert!(results[0].score > results[1].score);

        assert!(results[0].matches.contains_key("web"));
        assert!(results[0].matches.contains_key("framework"));
        assert!(!results[1].matches.contains_key("web"));
        assert!(results[1].matches.contains_key("framework"));

        // no field is credited twice for the same term
        for result in &results {
            for fields in result.matches.values() {
                let mut unique = fields.clone();
                unique.sort();
                unique.dedup();
                assert_eq!(unique.len(), fields.len());
            }
        }
    }

    #[test]
    fn remove_rejects_a_mutated_document() {
        let mut index = indexed();
        let tampered = Document::new()
            .with_field("id", 100i64)
            .with_field("title", "Unknown")
            .with_field("content", "Elixir is a dynamic, functional language.")
            .with_field("tag", "lang");

        let err = index.remove(&tampered).unwrap_err();
        assert_eq!(err.kind, ErrorKind::DocumentMutated);
        // nothing was deleted
        assert_eq!(index.document_count(), 3);
        assert_eq!(index.search("Elixir").len(), 2);
    }

    #[test]
    fn mutation_of_unindexed_fields_is_detected() {
        let mut index = indexed();
        let mut tampered = d1();
        tampered
            .fields
            .insert("tag".to_string(), FieldValue::Text("other".into()));

        let err = index.remove(&tampered).unwrap_err();
        assert_eq!(err.kind, ErrorKind::DocumentMutated);
    }

    #[test]
    fn error_taxonomy_on_the_facade() {
        let mut index = indexed();

        let err = index.add(d1()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::DocumentExists);

        let err = index
            .remove(&Document::new().with_field("id", 999i64))
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::DocumentNotExists);

        let err = index
            .add(Document::new().with_field("title", "No id"))
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::DocumentMissingId);

        let err = index
            .add(
                Document::new()
                    .with_field("id", 7i64)
                    .with_field("title", FieldValue::Json(json!({"nested": true}))),
            )
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::FieldNotString);
        // the failed add left no trace
        assert_eq!(index.document_count(), 3);
        assert!(!index.contains_document(&FieldValue::Integer(7)));
        assert_consistent(&index);
    }

    #[test]
    fn batches_fail_fast_but_keep_earlier_documents() {
        let mut index = SearchIndex::new(vec!["title", "content"]);
        let err = index
            .add_all(vec![d1(), d1(), d2()])
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::DocumentExists);

        // the first d1 stays, d2 was never processed
        assert_eq!(index.document_count(), 1);
        assert!(index.contains_document(&FieldValue::Integer(100)));
        assert!(!index.contains_document(&FieldValue::Integer(101)));
        assert_consistent(&index);
    }

    #[test]
    fn return_fields_are_projected_raw() {
        let mut index =
            SearchIndex::with_return_fields(vec!["title", "content"], vec!["title", "tag"]);
        index.add_all(vec![d1(), d2(), d3()]).unwrap();

        let results = index.search("Phoenix");
        assert_eq!(results.len(), 1);
        assert_eq!(
            results[0].fields["title"],
            FieldValue::Text("Phoenix".into())
        );
        assert_eq!(
            results[0].fields["tag"],
            FieldValue::Text("framework".into())
        );
        assert!(!results[0].fields.contains_key("content"));
    }

    #[test]
    fn numeric_and_typed_fields_are_rendered_for_indexing() {
        let mut index = SearchIndex::new(vec!["title", "year"]);
        index
            .add(
                Document::new()
                    .with_field("id", "book-1")
                    .with_field("title", "Programming Elixir")
                    .with_field("year", 2019i64),
            )
            .unwrap();

        let results = index.search("2019");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, FieldValue::Text("book-1".into()));
    }

    #[test]
    fn field_lengths_are_unique_term_counts() {
        let mut index = SearchIndex::new(vec!["content"]);
        index
            .add(
                Document::new()
                    .with_field("id", 1i64)
                    // four tokens, three unique terms
                    .with_field("content", "the quick the fox"),
            )
            .unwrap();

        assert_eq!(index.stats.length(DocId(1), 0), 3);
        assert!((index.stats.average(0) - 3.0).abs() < 1e-9);

        // term frequency still counts occurrences
        let record = index.tree.get("the").unwrap();
        assert_eq!(record[&0][&DocId(1)], 2);
    }
}
