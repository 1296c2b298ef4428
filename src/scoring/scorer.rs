/// Inputs for scoring one (term, field, document) triple.
#[derive(Debug, Clone)]
pub struct TermStats {
    /// Occurrences of the term in this field of this document.
    pub term_freq: u32,
    /// Documents in which this (term, field) pair appears.
    pub doc_freq: usize,
    /// Live documents in the index.
    pub doc_count: usize,
    /// Unique-term length of this field on this document.
    pub field_length: u32,
    /// Mean unique-term length of this field across live documents.
    pub avg_field_length: f64,
}

/// Scorer trait
pub trait Scorer: Send + Sync {
    fn score(&self, stats: &TermStats) -> f64;

    fn name(&self) -> &str;
}

/// BM25 variant with a lower-bound shift on the term-frequency
/// component, so every match keeps a positive contribution even in
/// long fields.
#[derive(Debug, Clone)]
pub struct Bm25Scorer {
    pub k1: f64,    // term frequency saturation
    pub b: f64,     // length normalization strength
    pub delta: f64, // lower bound added to the tf component
}

impl Default for Bm25Scorer {
    fn default() -> Self {
        Bm25Scorer {
            k1: 1.2,
            b: 0.7,
            delta: 0.5,
        }
    }
}

impl Scorer for Bm25Scorer {
    fn score(&self, stats: &TermStats) -> f64 {
        if stats.doc_count == 0 || stats.avg_field_length <= 0.0 {
            return 0.0;
        }

        let n = stats.doc_count as f64;
        let n_t = stats.doc_freq as f64;
        let idf = (1.0 + (n - n_t + 0.5) / (n_t + 0.5)).ln();

        let tf = stats.term_freq as f64;
        let norm = stats.field_length as f64 / stats.avg_field_length;
        let saturated = tf * (self.k1 + 1.0) / (tf + self.k1 * (1.0 - self.b + self.b * norm));

        idf * (self.delta + saturated)
    }

    fn name(&self) -> &str {
        "bm25"
    }
}
