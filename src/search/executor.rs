use log::debug;
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::core::index::SearchIndex;
use crate::index::term_tree::TermRecord;
use crate::scoring::scorer::{Bm25Scorer, Scorer, TermStats};
use crate::search::fuzzy::FuzzyMatcher;
use crate::search::options::SearchOptions;
use crate::search::results::{MatchAccumulator, SearchResult};

/// Stateless query evaluator.
///
/// Runs the match passes in order of decreasing precision (exact,
/// prefix, fuzzy) so that when a weaker pass re-encounters a (term,
/// field) pair an earlier pass already credited for a document, the
/// stronger match wins and the contribution is skipped.
pub struct QueryExecutor {
    scorer: Bm25Scorer,
}

impl QueryExecutor {
    pub fn new() -> Self {
        QueryExecutor {
            scorer: Bm25Scorer::default(),
        }
    }

    pub fn execute(
        &self,
        index: &SearchIndex,
        query: &str,
        options: &SearchOptions,
    ) -> Vec<SearchResult> {
        // The query runs through the same analyzer as ingested text.
        // Duplicate query terms are kept; the accumulator collapses
        // identical matches.
        let query_terms = index.analyzer.terms(query);
        if query_terms.is_empty() {
            return Vec::new();
        }
        debug!("evaluating {} query terms", query_terms.len());

        let mut acc = MatchAccumulator::new();

        // exact pass: point lookups, full weight
        for term in &query_terms {
            if let Some(record) = index.tree.get(term) {
                self.credit_record(index, &mut acc, term, record, 1.0);
            }
        }

        // prefix pass: strict extensions of each query term, attenuated
        // by how much longer the stored term is
        if options.prefix {
            for query_term in &query_terms {
                let q_len = query_term.chars().count() as f64;
                for (term, record) in index.tree.extensions(query_term) {
                    let t_len = term.chars().count() as f64;
                    let weight = options.prefix_weight * t_len / (t_len + 0.3 * (t_len - q_len));
                    self.credit_record(index, &mut acc, &term, record, weight);
                }
            }
        }

        // fuzzy pass: full tree walk, pruned by length before the edit
        // distance check; one term-level weight per query term
        if options.fuzzy {
            for query_term in &query_terms {
                let q_len = query_term.chars().count();
                let weight = options.fuzzy_weight * q_len as f64
                    / (q_len as f64 + options.fuzziness as f64);
                let matcher = FuzzyMatcher::new(query_term, options.fuzziness);

                for (term, record) in index.tree.walk() {
                    if term.chars().count().abs_diff(q_len) > options.fuzziness {
                        continue;
                    }
                    if matcher.matches(&term) {
                        self.credit_record(index, &mut acc, &term, record, weight);
                    }
                }
            }
        }

        self.collapse(index, acc)
    }

    /// Score every (field, document) posting of one matched term and
    /// feed it to the accumulator under the given pass weight.
    fn credit_record(
        &self,
        index: &SearchIndex,
        acc: &mut MatchAccumulator,
        term: &str,
        record: &TermRecord,
        weight: f64,
    ) {
        let doc_count = index.registry.document_count();
        for (&field_id, postings) in record {
            let doc_freq = postings.len();
            for (&doc_id, &term_freq) in postings {
                let stats = TermStats {
                    term_freq,
                    doc_freq,
                    doc_count,
                    field_length: index.stats.length(doc_id, field_id),
                    avg_field_length: index.stats.average(field_id),
                };
                let score = self.scorer.score(&stats) * weight;
                acc.credit(doc_id, term, field_id, score);
            }
        }
    }

    /// Collapse the per-(document, term) entries into one result per
    /// document and sort by descending score.
    fn collapse(&self, index: &SearchIndex, acc: MatchAccumulator) -> Vec<SearchResult> {
        let mut results = Vec::new();

        for (doc_id, term_matches) in acc.into_entries() {
            let Some(external_id) = index.registry.external_id(doc_id) else {
                continue;
            };

            let mut entries: Vec<_> = term_matches.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));

            let mut score = 0.0;
            let mut terms = Vec::with_capacity(entries.len());
            let mut matches = HashMap::with_capacity(entries.len());
            for (term, term_match) in entries {
                score += term_match.score;
                let field_names: Vec<String> = term_match
                    .fields
                    .iter()
                    .filter_map(|&field_id| index.fields.get(field_id).cloned())
                    .collect();
                terms.push(term.clone());
                matches.insert(term, field_names);
            }

            results.push(SearchResult {
                id: external_id.clone(),
                score,
                terms,
                matches,
                fields: index
                    .return_field_data
                    .get(&doc_id)
                    .cloned()
                    .unwrap_or_default(),
            });
        }

        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        results
    }
}

impl Default for QueryExecutor {
    fn default() -> Self {
        Self::new()
    }
}
