//! In-memory full-text search for embedded document collections.
//!
//! Documents are maps of named fields; the index tokenizes the
//! configured fields, keeps per-field BM25 statistics, and answers
//! ranked queries with exact, prefix, and fuzzy matching layered in
//! decreasing precision. Nothing is persisted: the host owns the
//! document collection and replays it to rebuild an index.
//!
//! ```
//! use microsearch::{Document, SearchIndex, SearchOptions};
//!
//! let mut index = SearchIndex::new(vec!["title", "content"]);
//! index.add(
//!     Document::new()
//!         .with_field("id", 1i64)
//!         .with_field("title", "Elixir")
//!         .with_field("content", "Elixir is a dynamic, functional language."),
//! ).unwrap();
//!
//! let results = index.search_with("eli", &SearchOptions::exact().with_prefix());
//! assert_eq!(results[0].terms, vec!["elixir"]);
//! ```

pub mod analysis;
pub mod core;
pub mod index;
pub mod scoring;
pub mod search;

pub use crate::analysis::analyzer::Analyzer;
pub use crate::core::error::{Error, ErrorKind, Result};
pub use crate::core::index::SearchIndex;
pub use crate::core::types::{DocId, Document, FieldId, FieldValue};
pub use crate::search::options::SearchOptions;
pub use crate::search::results::SearchResult;
