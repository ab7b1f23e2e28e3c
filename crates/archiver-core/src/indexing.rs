//! Record building and submission shared by both traversal variants.
//!
//! [`RecordIndexer`] turns files into [`FileRecord`]s and feeds them to an
//! [`IndexSink`], flushing every `bulk_size` submissions. [`IndexVisitor`] is
//! the plain variant: it indexes without archiving anything.

use std::path::{Path, PathBuf};

use archiver_types::FileRecord;
use tracing::{debug, info, warn};

use crate::classifier::{Outcome, RecordClassifier};
use crate::error::ArchiveError;
use crate::paths::{has_utf8_name, lossy_name, relative_entry};
use crate::sink::IndexSink;
use crate::walker::{VisitHandler, VisitState};

/// Submits records to a sink with periodic non-durable flushes.
pub struct RecordIndexer<'a> {
    sink: &'a mut dyn IndexSink,
    bulk_size: usize,
    pending: usize,
    submitted: usize,
}

impl<'a> RecordIndexer<'a> {
    pub fn new(sink: &'a mut dyn IndexSink, bulk_size: usize) -> Self {
        Self {
            sink,
            bulk_size: bulk_size.max(1),
            pending: 0,
            submitted: 0,
        }
    }

    /// Build the record for `file`, with its path relative to `root`.
    ///
    /// Content is read as UTF-8 text when `include_content` is set; a file that
    /// cannot be read that way fails the record.
    pub fn build_record(
        root: &Path,
        file: &Path,
        include_content: bool,
    ) -> Result<FileRecord, ArchiveError> {
        let path = relative_entry(root, file)?;
        let size = std::fs::metadata(file)?.len();
        let record = FileRecord::new(path, size);

        if !include_content {
            return Ok(record);
        }
        let content = std::fs::read_to_string(file).map_err(|source| ArchiveError::Content {
            path: file.display().to_string(),
            source,
        })?;
        Ok(record.with_content(content))
    }

    /// Submit a record, flushing once `bulk_size` records are pending.
    pub fn submit(&mut self, record: &FileRecord) -> Result<(), ArchiveError> {
        self.sink.submit(record)?;
        self.pending += 1;
        self.submitted += 1;
        debug!(path = %record.path, archive = ?record.container_ref, "Indexing");

        if self.pending >= self.bulk_size {
            self.flush(false)?;
        }
        Ok(())
    }

    pub fn flush(&mut self, durable: bool) -> Result<(), ArchiveError> {
        debug!(sink = self.sink.name(), pending = self.pending, durable, "Flushing");
        self.sink.flush(durable)?;
        self.pending = 0;
        Ok(())
    }

    /// Records submitted through this indexer.
    pub fn submitted(&self) -> usize {
        self.submitted
    }

    /// Reborrow the sink for a nested pass.
    pub fn sink(&mut self) -> &mut dyn IndexSink {
        &mut *self.sink
    }
}

/// Counters of a plain indexing pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IndexStats {
    pub indexed: usize,
    /// Files classified as anything but index-and-archive, or with no usable
    /// name
    pub skipped: usize,
    /// Forbidden directories, plus directories with no usable name
    pub pruned_directories: usize,
}

/// Visitor indexing every qualifying file, archiving nothing.
pub struct IndexVisitor<'a> {
    root: PathBuf,
    classifier: &'a RecordClassifier,
    indexer: RecordIndexer<'a>,
    stats: IndexStats,
}

impl<'a> IndexVisitor<'a> {
    pub fn new(
        root: impl Into<PathBuf>,
        classifier: &'a RecordClassifier,
        sink: &'a mut dyn IndexSink,
        bulk_size: usize,
    ) -> Self {
        Self {
            root: root.into(),
            classifier,
            indexer: RecordIndexer::new(sink, bulk_size),
            stats: IndexStats::default(),
        }
    }

    pub fn stats(&self) -> &IndexStats {
        &self.stats
    }

    /// Flush the sink durably and return the pass counters.
    pub fn finish(mut self) -> Result<IndexStats, ArchiveError> {
        self.indexer.flush(true)?;
        info!(
            root = ?self.root,
            indexed = self.stats.indexed,
            skipped = self.stats.skipped,
            "Indexing pass complete"
        );
        Ok(self.stats)
    }
}

impl VisitHandler for IndexVisitor<'_> {
    fn on_directory(&mut self, dir: &Path) -> Result<VisitState, ArchiveError> {
        if dir == self.root {
            return Ok(VisitState::Continue);
        }
        if self.classifier.is_forbidden_directory(&lossy_name(dir)) {
            self.stats.pruned_directories += 1;
            return Ok(VisitState::SkipSubtree);
        }
        if !has_utf8_name(dir) {
            warn!(dir = ?dir, "Skipping directory with a non UTF-8 name");
            self.stats.pruned_directories += 1;
            return Ok(VisitState::SkipSubtree);
        }
        Ok(VisitState::Continue)
    }

    fn on_directory_exit(&mut self, _dir: &Path) -> Result<(), ArchiveError> {
        Ok(())
    }

    fn on_file(&mut self, file: &Path) -> Result<(), ArchiveError> {
        let classification = self.classifier.classify_name(&lossy_name(file));
        if classification.outcome != Outcome::IndexAndArchive {
            debug!(file = ?file, outcome = ?classification.outcome, "Not indexed");
            self.stats.skipped += 1;
            return Ok(());
        }
        if !has_utf8_name(file) {
            warn!(file = ?file, "Skipping file with a non UTF-8 name");
            self.stats.skipped += 1;
            return Ok(());
        }

        let record =
            RecordIndexer::build_record(&self.root, file, classification.include_content)?;
        self.indexer.submit(&record)?;
        self.stats.indexed += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::RecordingSink;
    use crate::walker::TreeWalker;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_build_record_with_content() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("docs")).unwrap();
        let file = temp_dir.path().join("docs/readme.md");
        fs::write(&file, "borrow checker").unwrap();

        let record = RecordIndexer::build_record(temp_dir.path(), &file, true).unwrap();
        assert_eq!(record.path, "docs/readme.md");
        assert_eq!(record.size_bytes, 14);
        assert_eq!(record.content.as_deref(), Some("borrow checker"));
        assert!(record.container_ref.is_none());
    }

    #[test]
    fn test_build_record_invalid_utf8_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("bad.txt");
        fs::write(&file, [0xff, 0xfe, 0x00]).unwrap();

        let result = RecordIndexer::build_record(temp_dir.path(), &file, true);
        assert!(matches!(result, Err(ArchiveError::Content { .. })));

        let record = RecordIndexer::build_record(temp_dir.path(), &file, false).unwrap();
        assert!(record.content.is_none());
    }

    #[test]
    fn test_bulk_flush() {
        let mut sink = RecordingSink::new();
        {
            let mut indexer = RecordIndexer::new(&mut sink, 2);
            for i in 0..5 {
                indexer
                    .submit(&FileRecord::new(format!("{i}.txt"), 1))
                    .unwrap();
            }
            assert_eq!(indexer.submitted(), 5);
        }
        assert_eq!(sink.records.len(), 5);
        assert_eq!(sink.flushes, vec![false, false]);
    }

    #[test]
    fn test_index_visitor() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("a.txt"), "alpha").unwrap();
        fs::write(root.join("photo.jpg"), [0u8; 4]).unwrap();
        fs::write(root.join("secret.p12"), "key").unwrap();
        fs::create_dir_all(root.join("docs/deep")).unwrap();
        fs::write(root.join("docs/deep/notes.md"), "notes").unwrap();
        fs::write(root.join("docs/data.bin"), [1u8, 2, 3]).unwrap();
        fs::create_dir_all(root.join(".git")).unwrap();
        fs::write(root.join(".git/config"), "x").unwrap();

        let classifier = RecordClassifier::default();
        let mut sink = RecordingSink::new();
        let stats = {
            let mut visitor = IndexVisitor::new(root, &classifier, &mut sink, 100);
            TreeWalker::new(root).visit(&mut visitor).unwrap();
            visitor.finish().unwrap()
        };

        assert_eq!(sink.paths(), vec!["a.txt", "docs/data.bin", "docs/deep/notes.md"]);
        assert_eq!(
            sink.record("docs/deep/notes.md").and_then(|r| r.content.as_deref()),
            Some("notes")
        );
        assert!(sink.record("docs/data.bin").unwrap().content.is_none());
        assert_eq!(stats.indexed, 3);
        assert_eq!(stats.skipped, 2);
        assert_eq!(stats.pruned_directories, 1);
        assert_eq!(sink.flushes, vec![true]);
    }

    #[test]
    fn test_index_visitor_never_prunes_root() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("target");
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join("x.txt"), "x").unwrap();

        let classifier = RecordClassifier::default();
        let mut sink = RecordingSink::new();
        {
            let mut visitor = IndexVisitor::new(&root, &classifier, &mut sink, 100);
            TreeWalker::new(&root).visit(&mut visitor).unwrap();
        }

        assert_eq!(sink.paths(), vec!["x.txt"]);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_index_visitor_skips_non_utf8_names() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("a.txt"), "alpha").unwrap();
        fs::write(root.join(OsStr::from_bytes(b"caf\xe9.txt")), "text").unwrap();
        let odd = root.join(OsStr::from_bytes(b"d\xe9j\xe0"));
        fs::create_dir_all(&odd).unwrap();
        fs::write(odd.join("inner.txt"), "inner").unwrap();

        let classifier = RecordClassifier::default();
        let mut sink = RecordingSink::new();
        let stats = {
            let mut visitor = IndexVisitor::new(root, &classifier, &mut sink, 100);
            TreeWalker::new(root).visit(&mut visitor).unwrap();
            visitor.finish().unwrap()
        };

        assert_eq!(sink.paths(), vec!["a.txt"]);
        assert_eq!(stats.indexed, 1);
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.pruned_directories, 1);
    }
}
