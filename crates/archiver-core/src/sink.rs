//! Index sink trait: the write side of the full-text index.
//!
//! A sink is shared by a top-level pass and all of its nested passes through
//! an exclusive reborrow, so implementations need no locking.

use archiver_search::SearchIndexer;
use archiver_types::FileRecord;
use tracing::debug;

use crate::error::ArchiveError;

/// Write handle accepting file records.
pub trait IndexSink {
    /// Stage one record.
    fn submit(&mut self, record: &FileRecord) -> Result<(), ArchiveError>;

    /// Make staged records visible.
    ///
    /// A durable flush additionally waits until the on-disk representation is
    /// final and ends the sink's write side; it is requested once, at the end
    /// of a top-level pass.
    fn flush(&mut self, durable: bool) -> Result<(), ArchiveError>;

    /// Get the name of this sink for logging.
    fn name(&self) -> &str;
}

impl IndexSink for SearchIndexer {
    fn submit(&mut self, record: &FileRecord) -> Result<(), ArchiveError> {
        self.add_record(record)?;
        Ok(())
    }

    fn flush(&mut self, durable: bool) -> Result<(), ArchiveError> {
        debug!(durable, pending = self.uncommitted(), "Flushing index");
        if durable {
            self.finish()?;
        } else {
            self.commit()?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "tantivy"
    }
}

/// In-memory sink keeping every submitted record and flush request.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub records: Vec<FileRecord>,
    /// `durable` flag of every flush, in order
    pub flushes: Vec<bool>,
}

#[cfg(test)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Find a record by its path.
    pub fn record(&self, path: &str) -> Option<&FileRecord> {
        self.records.iter().find(|r| r.path == path)
    }

    pub fn paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self.records.iter().map(|r| r.path.as_str()).collect();
        paths.sort_unstable();
        paths
    }
}

#[cfg(test)]
impl IndexSink for RecordingSink {
    fn submit(&mut self, record: &FileRecord) -> Result<(), ArchiveError> {
        self.records.push(record.clone());
        Ok(())
    }

    fn flush(&mut self, durable: bool) -> Result<(), ArchiveError> {
        self.flushes.push(durable);
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}
