//! The record index, on disk while archiving and read back from either a
//! plain directory or a packaged snapshot.

use std::path::Path;

use tantivy::{Index, IndexReader, IndexWriter, ReloadPolicy};
use tracing::{debug, info};

use crate::error::SearchError;
use crate::schema::{build_record_schema, SearchSchema};
use crate::snapshot::{is_snapshot_path, load_snapshot};

/// Marker file of a committed Tantivy index.
const META_FILE: &str = "meta.json";

/// Writer budget for indexes opened read-only or in memory.
const READ_ONLY_WRITER_MEMORY_MB: usize = 15;

/// Record index with its resolved schema.
pub struct SearchIndex {
    index: Index,
    schema: SearchSchema,
    writer_memory_mb: usize,
}

impl SearchIndex {
    /// Open the index in `dir`, creating an empty one when none exists.
    ///
    /// Writers created from it get `writer_memory_mb` of indexing memory.
    pub fn open_or_create(dir: &Path, writer_memory_mb: usize) -> Result<Self, SearchError> {
        let index = if dir.join(META_FILE).exists() {
            debug!(path = ?dir, "Appending to existing index");
            Index::open_in_dir(dir)?
        } else {
            info!(path = ?dir, "Creating new index");
            std::fs::create_dir_all(dir)?;
            Index::create_in_dir(dir, build_record_schema().schema().clone())?
        };
        Self::from_index(index, writer_memory_mb)
    }

    /// Open an existing index for reading.
    ///
    /// `path` is either a plain index directory or a `.zip` snapshot produced
    /// by [`package_index`](crate::snapshot::package_index); snapshots are
    /// loaded into memory first.
    pub fn open_path(path: &Path) -> Result<Self, SearchError> {
        let index = if is_snapshot_path(path) {
            load_snapshot(path)?
        } else if path.join(META_FILE).exists() {
            Index::open_in_dir(path)?
        } else {
            return Err(SearchError::IndexNotFound(path.display().to_string()));
        };
        info!(path = ?path, "Opened search index for reading");
        Self::from_index(index, READ_ONLY_WRITER_MEMORY_MB)
    }

    pub fn create_in_ram() -> Result<Self, SearchError> {
        let index = Index::create_in_ram(build_record_schema().schema().clone());
        Self::from_index(index, READ_ONLY_WRITER_MEMORY_MB)
    }

    fn from_index(index: Index, writer_memory_mb: usize) -> Result<Self, SearchError> {
        let schema = SearchSchema::from_schema(index.schema())?;
        SearchSchema::register_tokenizers(&index);
        Ok(Self {
            index,
            schema,
            writer_memory_mb,
        })
    }

    pub fn schema(&self) -> &SearchSchema {
        &self.schema
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    pub fn writer(&self) -> Result<IndexWriter, SearchError> {
        let writer = self.index.writer(self.writer_memory_mb * 1024 * 1024)?;
        debug!(memory_mb = self.writer_memory_mb, "Created index writer");
        Ok(writer)
    }

    /// Reader pinned to the commit visible when it was created.
    pub fn reader(&self) -> Result<IndexReader, SearchError> {
        Ok(self
            .index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()?)
    }
}
