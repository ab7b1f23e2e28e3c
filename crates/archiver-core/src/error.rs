//! Error types for archiving and indexing passes.

use archiver_search::SearchError;
use thiserror::Error;

/// Errors that abort a traversal pass.
///
/// Every variant is fatal: a pass never recovers from a partially written
/// container or a record it could not build.
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// Filesystem traversal failed (permissions, dangling link, link loop)
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// Entry that is neither a regular file nor a directory
    #[error("Unsupported entry (neither file nor directory): {0}")]
    UnsupportedEntry(String),

    /// File content could not be read as text
    #[error("Failed to read content of '{path}': {source}")]
    Content {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Container file could not be created or written
    #[error("Container I/O error for '{path}': {source}")]
    Container {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Zip encoding error while writing a container
    #[error("Zip error for '{path}': {source}")]
    Zip {
        path: String,
        #[source]
        source: zip::result::ZipError,
    },

    /// Index engine error
    #[error("Search error: {0}")]
    Search(#[from] SearchError),

    /// Output would be traversed as part of its own input
    #[error("Output directory '{output}' is inside input directory '{input}'")]
    OutputInsideInput { input: String, output: String },

    /// Output artifact left over from a previous run
    #[error("Output already exists: {0}")]
    AlreadyExists(String),

    /// Path cannot be expressed as a relative UTF-8 entry name
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Other filesystem error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
