use std::collections::HashMap;

use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::{DocId, FieldValue};

/// Bookkeeping for document identity: external id → short id, the
/// inverse mapping, the short-id allocator, and the per-document
/// content fingerprints used to validate removals.
///
/// Short ids start at 1 and are never reissued, even after removal.
#[derive(Debug, Clone)]
pub struct DocumentRegistry {
    /// Rendered external id → short id.
    pub(crate) ids: HashMap<String, DocId>,
    /// Short id → original external id value.
    pub(crate) short_ids: HashMap<DocId, FieldValue>,
    /// Next short id to allocate. Not rewound when the index empties.
    pub(crate) next_id: DocId,
    /// Short id → content fingerprint of the document as inserted.
    pub(crate) hashes: HashMap<DocId, u32>,
}

impl DocumentRegistry {
    pub fn new() -> Self {
        DocumentRegistry {
            ids: HashMap::new(),
            short_ids: HashMap::new(),
            next_id: DocId::FIRST,
            hashes: HashMap::new(),
        }
    }

    pub fn document_count(&self) -> usize {
        self.ids.len()
    }

    pub fn contains(&self, rendered_id: &str) -> bool {
        self.ids.contains_key(rendered_id)
    }

    pub fn external_id(&self, doc_id: DocId) -> Option<&FieldValue> {
        self.short_ids.get(&doc_id)
    }

    /// Register a new document and allocate its short id.
    pub fn insert(
        &mut self,
        rendered_id: &str,
        id_value: FieldValue,
        fingerprint: u32,
    ) -> Result<DocId> {
        if self.ids.contains_key(rendered_id) {
            return Err(Error::new(ErrorKind::DocumentExists, rendered_id));
        }

        let doc_id = self.next_id;
        self.next_id = doc_id.succ();
        self.ids.insert(rendered_id.to_string(), doc_id);
        self.short_ids.insert(doc_id, id_value);
        self.hashes.insert(doc_id, fingerprint);
        Ok(doc_id)
    }

    /// Check that a document is present and unchanged, without removing
    /// it. Lets callers tokenize the presented document before any state
    /// is touched, so a failed removal leaves the index intact.
    pub fn verify(&self, rendered_id: &str, fingerprint: u32) -> Result<DocId> {
        let doc_id = *self
            .ids
            .get(rendered_id)
            .ok_or_else(|| Error::new(ErrorKind::DocumentNotExists, rendered_id))?;

        if self.hashes.get(&doc_id) != Some(&fingerprint) {
            return Err(Error::new(ErrorKind::DocumentMutated, rendered_id));
        }
        Ok(doc_id)
    }

    /// Drop a verified document from the registry.
    pub fn remove(&mut self, rendered_id: &str, doc_id: DocId) {
        self.ids.remove(rendered_id);
        self.short_ids.remove(&doc_id);
        self.hashes.remove(&doc_id);
    }
}
