//! Search indexer for adding file records to the Tantivy index.
//!
//! Records are not visible until commit() is called. finish() makes the
//! index files final and closes the writer.

use tantivy::IndexWriter;
use tracing::{debug, info};

use archiver_types::FileRecord;

use crate::document::record_to_doc;
use crate::error::SearchError;
use crate::index::SearchIndex;
use crate::schema::SearchSchema;

/// Write handle on the record index.
///
/// Records are appended, never upserted: the same relative path may
/// legitimately appear once per partition.
pub struct SearchIndexer {
    /// `None` once finished
    writer: Option<IndexWriter>,
    schema: SearchSchema,
    uncommitted: usize,
}

impl SearchIndexer {
    /// Create a new indexer from a SearchIndex.
    pub fn new(index: &SearchIndex) -> Result<Self, SearchError> {
        Ok(Self {
            writer: Some(index.writer()?),
            schema: index.schema().clone(),
            uncommitted: 0,
        })
    }

    fn writer(&mut self) -> Result<&mut IndexWriter, SearchError> {
        self.writer.as_mut().ok_or(SearchError::WriterClosed)
    }

    /// Stage a file record.
    pub fn add_record(&mut self, record: &FileRecord) -> Result<(), SearchError> {
        let doc = record_to_doc(&self.schema, record);
        self.writer()?.add_document(doc)?;
        self.uncommitted += 1;

        debug!(path = %record.path, archive = ?record.container_ref, "Indexed record");
        Ok(())
    }

    /// Number of records staged since the last commit.
    pub fn uncommitted(&self) -> usize {
        self.uncommitted
    }

    /// Commit pending records to make them searchable.
    ///
    /// This is expensive - batch record adds and commit periodically.
    pub fn commit(&mut self) -> Result<u64, SearchError> {
        let opstamp = self.writer()?.commit()?;
        info!(opstamp, records = self.uncommitted, "Committed index changes");
        self.uncommitted = 0;
        Ok(opstamp)
    }

    /// Commit and wait for background merges, leaving the index files final.
    ///
    /// The writer is released; later writes fail with
    /// [`SearchError::WriterClosed`].
    pub fn finish(&mut self) -> Result<u64, SearchError> {
        let opstamp = self.commit()?;
        if let Some(writer) = self.writer.take() {
            writer.wait_merging_threads()?;
        }
        debug!(opstamp, "Index writer finished");
        Ok(opstamp)
    }

    pub fn is_finished(&self) -> bool {
        self.writer.is_none()
    }
}

impl std::fmt::Debug for SearchIndexer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchIndexer")
            .field("uncommitted", &self.uncommitted)
            .field("finished", &self.is_finished())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_record(path: &str) -> FileRecord {
        FileRecord::new(path, 10)
            .with_content("Test content")
            .with_container("docs")
    }

    fn setup_index() -> (TempDir, SearchIndex) {
        let temp_dir = TempDir::new().unwrap();
        let index = SearchIndex::open_or_create(temp_dir.path(), 50).unwrap();
        (temp_dir, index)
    }

    #[test]
    fn test_add_and_commit() {
        let (_temp_dir, index) = setup_index();
        let mut indexer = SearchIndexer::new(&index).unwrap();

        indexer.add_record(&sample_record("docs/a.md")).unwrap();
        assert_eq!(indexer.uncommitted(), 1);

        indexer.commit().unwrap();
        assert_eq!(indexer.uncommitted(), 0);

        let reader = index.reader().unwrap();
        assert_eq!(reader.searcher().num_docs(), 1);
    }

    #[test]
    fn test_same_path_is_appended() {
        let (_temp_dir, index) = setup_index();
        let mut indexer = SearchIndexer::new(&index).unwrap();

        indexer.add_record(&sample_record("x.txt")).unwrap();
        indexer.add_record(&sample_record("x.txt")).unwrap();
        indexer.commit().unwrap();

        let reader = index.reader().unwrap();
        assert_eq!(reader.searcher().num_docs(), 2);
    }

    #[test]
    fn test_finish_commits() {
        let (_temp_dir, index) = setup_index();
        let mut indexer = SearchIndexer::new(&index).unwrap();

        for i in 0..5 {
            indexer
                .add_record(&sample_record(&format!("docs/{i}.md")))
                .unwrap();
        }
        indexer.finish().unwrap();
        assert!(indexer.is_finished());

        let reader = index.reader().unwrap();
        assert_eq!(reader.searcher().num_docs(), 5);
    }

    #[test]
    fn test_writes_after_finish_fail() {
        let (_temp_dir, index) = setup_index();
        let mut indexer = SearchIndexer::new(&index).unwrap();
        indexer.finish().unwrap();

        let result = indexer.add_record(&sample_record("late.md"));
        assert!(matches!(result, Err(SearchError::WriterClosed)));
        assert!(matches!(indexer.finish(), Err(SearchError::WriterClosed)));
    }
}
