//! # archiver-search
//!
//! Full-text record index for dir-archiver using Tantivy.
//!
//! The archiver submits one record per traversed file; this crate stores them
//! in an embedded index, packages the finished index as a single zip snapshot,
//! and answers BM25-ranked queries against either form.
//!
//! ## Features
//! - Embedded on-disk Tantivy index, appended to when it already exists
//! - English stemming on file content
//! - Snapshot packaging and in-memory loading
//! - Conjunctive queries with leading-wildcard support

pub mod document;
pub mod error;
pub mod index;
pub mod indexer;
pub mod schema;
pub mod searcher;
pub mod snapshot;

pub use document::record_to_doc;
pub use error::SearchError;
pub use index::SearchIndex;
pub use indexer::SearchIndexer;
pub use schema::{build_record_schema, SearchSchema, CONTENT_TOKENIZER};
pub use searcher::{ArchiveSearcher, SearchHit, SearchOutcome};
pub use snapshot::{is_snapshot_path, load_snapshot, package_index, SNAPSHOT_EXTENSION};
