//! # archiver-core
//!
//! Directory-partitioning archive builder for dir-archiver.
//!
//! ## Key Components
//!
//! - [`TreeWalker`]: depth-first traversal driving a [`VisitHandler`]
//! - [`RecordClassifier`]: index-and-archive / archive-only / drop decisions
//! - [`ArchiveUnit`]: one zip container, append-only, closed exactly once
//! - [`ArchivePartitioner`]: container lifecycle and promoted-folder recursion
//! - [`IndexVisitor`]: plain indexing without archives
//! - [`IndexSink`]: write side of the full-text index
//!
//! ## Example
//!
//! ```ignore
//! use archiver_core::compress_directory;
//! use archiver_types::Settings;
//!
//! let settings = Settings::load(None)?;
//! let report = compress_directory(Path::new("./projects"), Path::new("/backup"), &settings)?;
//! println!("{} files archived", report.stats.archived());
//! ```

pub mod classifier;
pub mod container;
pub mod error;
pub mod indexing;
pub mod orchestrator;
pub mod partitioner;
pub mod paths;
pub mod sink;
pub mod walker;

pub use classifier::{extension_of, Classification, Outcome, RecordClassifier};
pub use container::{ArchiveUnit, CONTAINER_EXTENSION};
pub use error::ArchiveError;
pub use indexing::{IndexStats, IndexVisitor, RecordIndexer};
pub use orchestrator::{
    compress_directory, index_directory, CompressReport, IndexReport, INDEX_DIR_NAME,
};
pub use partitioner::{ArchivePartitioner, PartitionStats};
pub use sink::IndexSink;
pub use walker::{TreeWalker, VisitHandler, VisitState};
