use std::collections::HashMap;

use crate::core::types::{DocId, FieldId};

/// Per-field length statistics consumed by BM25 scoring.
///
/// Lengths are *unique-term* counts, not raw token counts. Each
/// document's lengths are stored in field-id order, one entry per
/// configured field (0 for absent or empty fields). The per-field
/// average is maintained incrementally; accumulated float drift is
/// acceptable for ranking purposes.
#[derive(Debug, Clone)]
pub struct FieldStats {
    /// Short id → unique-term count per field, indexed by field id.
    pub(crate) field_lengths: HashMap<DocId, Vec<u32>>,
    /// Field id → running mean of `field_lengths` across live documents.
    pub(crate) avg_field_lengths: Vec<f64>,
}

impl FieldStats {
    pub fn new(field_count: usize) -> Self {
        FieldStats {
            field_lengths: HashMap::new(),
            avg_field_lengths: vec![0.0; field_count],
        }
    }

    pub fn length(&self, doc_id: DocId, field_id: FieldId) -> u32 {
        self.field_lengths
            .get(&doc_id)
            .and_then(|lengths| lengths.get(field_id))
            .copied()
            .unwrap_or(0)
    }

    pub fn average(&self, field_id: FieldId) -> f64 {
        self.avg_field_lengths.get(field_id).copied().unwrap_or(0.0)
    }

    /// Record a document's lengths. `doc_count` is the number of live
    /// documents *after* the addition.
    pub fn add_document(&mut self, doc_id: DocId, lengths: Vec<u32>, doc_count: usize) {
        let n = doc_count as f64;
        for (field_id, avg) in self.avg_field_lengths.iter_mut().enumerate() {
            let length = lengths.get(field_id).copied().unwrap_or(0) as f64;
            *avg = (*avg * (n - 1.0) + length) / n;
        }
        self.field_lengths.insert(doc_id, lengths);
    }

    /// Drop a document's lengths. `doc_count` is the number of live
    /// documents *after* the removal.
    pub fn remove_document(&mut self, doc_id: DocId, doc_count: usize) {
        let Some(lengths) = self.field_lengths.remove(&doc_id) else {
            return;
        };

        if doc_count == 0 {
            // last document out: reset, so drift does not outlive the data
            for avg in &mut self.avg_field_lengths {
                *avg = 0.0;
            }
            return;
        }

        let n = doc_count as f64;
        for (field_id, avg) in self.avg_field_lengths.iter_mut().enumerate() {
            let length = lengths.get(field_id).copied().unwrap_or(0) as f64;
            *avg = (*avg * (n + 1.0) - length) / n;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.field_lengths.is_empty()
    }
}
