//! Search error types.

use thiserror::Error;

/// Errors that can occur during index and search operations.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Tantivy index error
    #[error("Tantivy error: {0}")]
    Tantivy(#[from] tantivy::TantivyError),

    /// Query parse error
    #[error("Query parse error: {0}")]
    QueryParse(#[from] tantivy::query::QueryParserError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Index snapshot archive error
    #[error("Snapshot error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Index not found
    #[error("Index not found at path: {0}")]
    IndexNotFound(String),

    /// Write after the index writer was finished
    #[error("Index writer already finished")]
    WriterClosed,

    /// Schema mismatch
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),
}
