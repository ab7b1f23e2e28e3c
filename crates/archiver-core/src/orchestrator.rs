//! Command-level wiring: one walk, one index, final packaging.

use std::path::{Path, PathBuf};

use archiver_search::{package_index, SearchIndex, SearchIndexer, SNAPSHOT_EXTENSION};
use archiver_types::Settings;
use tracing::info;

use crate::classifier::RecordClassifier;
use crate::error::ArchiveError;
use crate::indexing::{IndexStats, IndexVisitor};
use crate::partitioner::{ArchivePartitioner, PartitionStats};
use crate::walker::TreeWalker;

/// Working index directory name inside the output directory.
pub const INDEX_DIR_NAME: &str = "_index";

/// Result of [`compress_directory`].
#[derive(Debug, Clone)]
pub struct CompressReport {
    pub stats: PartitionStats,
    /// Packaged index location
    pub snapshot: PathBuf,
    /// Index files in the snapshot
    pub snapshot_files: usize,
}

/// Result of [`index_directory`].
#[derive(Debug, Clone)]
pub struct IndexReport {
    pub stats: IndexStats,
    pub index_dir: PathBuf,
}

/// Partition `input` into containers below `output` and package the index
/// of every archived file as `<output>/_index.zip`.
pub fn compress_directory(
    input: &Path,
    output: &Path,
    settings: &Settings,
) -> Result<CompressReport, ArchiveError> {
    let input = existing_directory(input)?;
    std::fs::create_dir_all(output)?;
    let output = output.canonicalize()?;
    reject_nested_output(&input, &output)?;

    let index_dir = output.join(INDEX_DIR_NAME);
    let snapshot = output.join(format!("{INDEX_DIR_NAME}.{SNAPSHOT_EXTENSION}"));
    for leftover in [&index_dir, &snapshot] {
        if leftover.exists() {
            return Err(ArchiveError::AlreadyExists(leftover.display().to_string()));
        }
    }

    info!(input = ?input, output = ?output, "Compressing directory");
    let classifier = RecordClassifier::new(&settings.rules);
    let index = SearchIndex::open_or_create(&index_dir, settings.writer_memory_mb)?;
    let mut indexer = SearchIndexer::new(&index)?;

    // Ends with the durable flush, leaving the index files final
    let stats =
        ArchivePartitioner::new(&input, &output, "", settings, &classifier, &mut indexer)?
            .run()?;
    drop(indexer);
    drop(index);

    let snapshot_files = package_index(&index_dir, &snapshot)?;
    std::fs::remove_dir_all(&index_dir)?;

    info!(
        indexed = stats.indexed,
        archived = stats.archived(),
        containers = stats.containers,
        snapshot = ?snapshot,
        "Compression complete"
    );
    Ok(CompressReport {
        stats,
        snapshot,
        snapshot_files,
    })
}

/// Index `source` into a plain on-disk index at `index_dir`, archiving nothing.
///
/// Records are appended when `index_dir` already holds an index.
pub fn index_directory(
    source: &Path,
    index_dir: &Path,
    settings: &Settings,
) -> Result<IndexReport, ArchiveError> {
    let source = existing_directory(source)?;
    std::fs::create_dir_all(index_dir)?;
    let index_dir = index_dir.canonicalize()?;
    reject_nested_output(&source, &index_dir)?;

    info!(source = ?source, index = ?index_dir, "Indexing directory");
    let classifier = RecordClassifier::new(&settings.rules);
    let index = SearchIndex::open_or_create(&index_dir, settings.writer_memory_mb)?;
    let mut indexer = SearchIndexer::new(&index)?;

    let mut visitor = IndexVisitor::new(&source, &classifier, &mut indexer, settings.bulk_size);
    TreeWalker::new(&source).visit(&mut visitor)?;
    let stats = visitor.finish()?;

    Ok(IndexReport { stats, index_dir })
}

fn existing_directory(path: &Path) -> Result<PathBuf, ArchiveError> {
    if !path.is_dir() {
        return Err(ArchiveError::InvalidPath(format!(
            "'{}' is not a directory",
            path.display()
        )));
    }
    Ok(path.canonicalize()?)
}

fn reject_nested_output(input: &Path, output: &Path) -> Result<(), ArchiveError> {
    if output.starts_with(input) {
        return Err(ArchiveError::OutputInsideInput {
            input: input.display().to_string(),
            output: output.display().to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use archiver_search::ArchiveSearcher;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn input_tree(temp_dir: &TempDir) -> PathBuf {
        let input = temp_dir.path().join("input");
        fs::create_dir_all(input.join("docs")).unwrap();
        fs::write(input.join("a.txt"), "alpha release notes").unwrap();
        fs::write(input.join("docs/readme.md"), "ownership and borrowing").unwrap();
        fs::write(input.join("docs/photo.jpg"), [0u8; 8]).unwrap();
        input
    }

    #[test]
    fn test_compress_packages_index() {
        let temp_dir = TempDir::new().unwrap();
        let input = input_tree(&temp_dir);
        let output = temp_dir.path().join("out");

        let report = compress_directory(&input, &output, &Settings::default()).unwrap();

        assert_eq!(report.stats.indexed, 2);
        assert_eq!(report.stats.archived_only, 1);
        assert!(report.snapshot_files > 0);
        assert!(output.join("input.zip").is_file());
        assert!(output.join("docs.zip").is_file());
        assert!(output.join("_index.zip").is_file());
        assert!(!output.join(INDEX_DIR_NAME).exists());

        let index = SearchIndex::open_path(&report.snapshot).unwrap();
        let searcher = ArchiveSearcher::new(&index).unwrap();
        let outcome = searcher
            .search(&["borrowing".to_string()], None)
            .unwrap();
        assert_eq!(outcome.total_docs, 2);
        assert_eq!(outcome.hits.len(), 1);
        assert_eq!(outcome.hits[0].path, "docs/readme.md");
        assert_eq!(outcome.hits[0].archive.as_deref(), Some("docs"));
    }

    #[test]
    fn test_compress_rejects_output_inside_input() {
        let temp_dir = TempDir::new().unwrap();
        let input = input_tree(&temp_dir);

        let result = compress_directory(&input, &input.join("out"), &Settings::default());
        assert!(matches!(result, Err(ArchiveError::OutputInsideInput { .. })));
    }

    #[test]
    fn test_compress_refuses_leftover_snapshot() {
        let temp_dir = TempDir::new().unwrap();
        let input = input_tree(&temp_dir);
        let output = temp_dir.path().join("out");
        fs::create_dir_all(&output).unwrap();
        fs::write(output.join("_index.zip"), "old").unwrap();

        let result = compress_directory(&input, &output, &Settings::default());
        assert!(matches!(result, Err(ArchiveError::AlreadyExists(_))));
    }

    #[test]
    fn test_missing_input_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let result = compress_directory(
            &temp_dir.path().join("missing"),
            &temp_dir.path().join("out"),
            &Settings::default(),
        );
        assert!(matches!(result, Err(ArchiveError::InvalidPath(_))));
    }

    #[test]
    fn test_index_directory() {
        let temp_dir = TempDir::new().unwrap();
        let input = input_tree(&temp_dir);
        let index_dir = temp_dir.path().join("idx");

        let report = index_directory(&input, &index_dir, &Settings::default()).unwrap();
        assert_eq!(report.stats.indexed, 2);

        let index = SearchIndex::open_path(&report.index_dir).unwrap();
        let searcher = ArchiveSearcher::new(&index).unwrap();
        let outcome = searcher.search(&["alpha".to_string()], None).unwrap();
        assert_eq!(outcome.hits.len(), 1);
        assert_eq!(outcome.hits[0].path, "a.txt");
        assert!(outcome.hits[0].archive.is_none());
        // Nothing archived
        assert!(!temp_dir.path().join("idx/input.zip").exists());
    }
}
