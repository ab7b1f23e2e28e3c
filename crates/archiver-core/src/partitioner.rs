//! Directory-partitioning archive builder.
//!
//! One [`ArchivePartitioner`] drives one partition: a root directory whose
//! direct files go to a root archive named after it, and whose every direct
//! subdirectory becomes its own container holding the whole subtree.
//! Directories with a promoted name start a nested partition wherever they
//! appear, with their own root, output location and partitioner.
//!
//! Container layout for a root `input` with promoted name `0_dev`:
//!
//! ```text
//! input/a.txt                  -> <out>/input.zip            a.txt
//! input/docs/readme.md         -> <out>/docs.zip             readme.md
//! input/docs/deep/x.md         -> <out>/docs.zip             deep/x.md
//! input/proj/sub/0_dev/y.txt   -> <out>/proj/sub/0_dev/0_dev.zip   y.txt
//! ```

use std::path::{Path, PathBuf};

use archiver_types::Settings;
use tracing::{debug, info, warn};

use crate::classifier::{Outcome, RecordClassifier};
use crate::container::{ArchiveUnit, CONTAINER_EXTENSION};
use crate::error::ArchiveError;
use crate::indexing::RecordIndexer;
use crate::paths::{file_name, has_utf8_name, join_ref, lossy_name, relative_entry};
use crate::sink::IndexSink;
use crate::walker::{TreeWalker, VisitHandler, VisitState};

/// Counters of one partition, nested partitions included.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PartitionStats {
    /// Files indexed and archived
    pub indexed: usize,
    /// Files archived without a record
    pub archived_only: usize,
    /// Files neither indexed nor archived by classification
    pub dropped: usize,
    /// Files with no container to go to, or no usable entry name
    pub ignored: usize,
    /// Directories skipped for having no usable entry name
    pub skipped_directories: usize,
    /// Containers created, root archives included
    pub containers: usize,
    pub folder_markers: usize,
    /// Promoted folders partitioned independently
    pub sub_partitions: usize,
}

impl PartitionStats {
    /// Add a nested partition's counters to this one.
    pub fn merge(&mut self, other: &PartitionStats) {
        self.indexed += other.indexed;
        self.archived_only += other.archived_only;
        self.dropped += other.dropped;
        self.ignored += other.ignored;
        self.skipped_directories += other.skipped_directories;
        self.containers += other.containers;
        self.folder_markers += other.folder_markers;
        self.sub_partitions += other.sub_partitions;
    }

    /// Files placed in a container.
    pub fn archived(&self) -> usize {
        self.indexed + self.archived_only
    }
}

/// The currently open container and the directory it was opened for.
struct OpenUnit {
    directory: PathBuf,
    unit: ArchiveUnit,
}

/// Visitor placing files into containers and submitting their records.
pub struct ArchivePartitioner<'a> {
    root: PathBuf,
    output: PathBuf,
    container_prefix: String,
    settings: &'a Settings,
    classifier: &'a RecordClassifier,
    indexer: RecordIndexer<'a>,
    root_archive: Option<ArchiveUnit>,
    current: Option<OpenUnit>,
    stats: PartitionStats,
}

impl<'a> ArchivePartitioner<'a> {
    /// Start a partition at `root`, writing containers below `output`.
    ///
    /// `container_prefix` is the output-relative location of `output`, empty
    /// for the top-level partition. The root archive is created immediately.
    pub fn new(
        root: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
        container_prefix: impl Into<String>,
        settings: &'a Settings,
        classifier: &'a RecordClassifier,
        sink: &'a mut dyn IndexSink,
    ) -> Result<Self, ArchiveError> {
        let root = root.into();
        let output = output.into();
        let container_prefix = container_prefix.into();

        std::fs::create_dir_all(&output)?;
        let root_name = file_name(&root)?;
        let root_archive = ArchiveUnit::create(
            &output.join(format!("{root_name}.{CONTAINER_EXTENSION}")),
            join_ref(&container_prefix, root_name),
            settings.compression_level,
        )?;

        Ok(Self {
            indexer: RecordIndexer::new(sink, settings.bulk_size),
            root,
            output,
            container_prefix,
            settings,
            classifier,
            root_archive: Some(root_archive),
            current: None,
            stats: PartitionStats {
                containers: 1,
                ..Default::default()
            },
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn stats(&self) -> &PartitionStats {
        &self.stats
    }

    /// Walk the partition root to completion, flush the sink durably and
    /// close every container.
    ///
    /// This is the top-level entry point; promoted folders reached during the
    /// walk are partitioned without a durable flush of their own.
    pub fn run(mut self) -> Result<PartitionStats, ArchiveError> {
        self.walk()?;
        self.indexer.flush(true)?;
        self.finish()
    }

    fn walk(&mut self) -> Result<(), ArchiveError> {
        let walker = TreeWalker::new(self.root.clone());
        walker.visit(self)
    }

    /// Close whatever is still open and return the counters.
    pub fn finish(mut self) -> Result<PartitionStats, ArchiveError> {
        if let Some(open) = self.current.take() {
            open.unit.close()?;
        }
        if let Some(unit) = self.root_archive.take() {
            unit.close()?;
        }

        info!(
            root = ?self.root,
            indexed = self.stats.indexed,
            archived_only = self.stats.archived_only,
            dropped = self.stats.dropped,
            containers = self.stats.containers,
            "Partition complete"
        );
        Ok(self.stats)
    }

    /// Partition a promoted folder independently, then flush the sink.
    fn run_nested(&mut self, dir: &Path) -> Result<(), ArchiveError> {
        let relative = relative_entry(&self.root, dir)?;
        let target = self.output.join(&relative);
        let prefix = join_ref(&self.container_prefix, &relative);
        info!(dir = ?dir, target = ?target, "Partitioning promoted folder");

        let settings = self.settings;
        let classifier = self.classifier;
        let mut nested = ArchivePartitioner::new(
            dir,
            target,
            prefix,
            settings,
            classifier,
            self.indexer.sink(),
        )?;
        nested.walk()?;
        let nested_stats = nested.finish()?;

        self.indexer.flush(false)?;
        self.stats.merge(&nested_stats);
        self.stats.sub_partitions += 1;
        Ok(())
    }

    /// Put `file` into the active container.
    ///
    /// Returns the container reference, or `None` when there is no container
    /// for the file and it was ignored.
    fn place(&mut self, file: &Path) -> Result<Option<String>, ArchiveError> {
        if let Some(open) = self.current.as_mut() {
            let entry = relative_entry(&open.directory, file)?;
            open.unit.add_file(file, &entry)?;
            return Ok(Some(open.unit.name().to_string()));
        }

        if file.parent() == Some(self.root.as_path()) {
            if let Some(unit) = self.root_archive.as_mut() {
                unit.add_file(file, file_name(file)?)?;
                return Ok(Some(unit.name().to_string()));
            }
        }

        warn!(file = ?file, "Ignoring file outside any open archive");
        self.stats.ignored += 1;
        Ok(None)
    }
}

impl VisitHandler for ArchivePartitioner<'_> {
    fn on_directory(&mut self, dir: &Path) -> Result<VisitState, ArchiveError> {
        if dir == self.root {
            return Ok(VisitState::Continue);
        }

        let name = lossy_name(dir);
        if self.classifier.is_forbidden_directory(&name) {
            debug!(dir = ?dir, "Pruning forbidden directory");
            return Ok(VisitState::SkipSubtree);
        }

        if !has_utf8_name(dir) {
            warn!(dir = ?dir, "Skipping directory with a non UTF-8 name");
            self.stats.skipped_directories += 1;
            return Ok(VisitState::SkipSubtree);
        }

        if self.settings.is_promoted(&name) {
            self.run_nested(dir)?;
            return Ok(VisitState::SkipSubtree);
        }

        if let Some(open) = self.current.as_mut() {
            let marker = relative_entry(&open.directory, dir)?;
            open.unit.add_folder_marker(&marker)?;
            self.stats.folder_markers += 1;
            return Ok(VisitState::Continue);
        }

        let relative = relative_entry(&self.root, dir)?;
        let unit = ArchiveUnit::create(
            &self
                .output
                .join(format!("{relative}.{CONTAINER_EXTENSION}")),
            join_ref(&self.container_prefix, &relative),
            self.settings.compression_level,
        )?;
        self.current = Some(OpenUnit {
            directory: dir.to_path_buf(),
            unit,
        });
        self.stats.containers += 1;
        Ok(VisitState::Continue)
    }

    fn on_directory_exit(&mut self, dir: &Path) -> Result<(), ArchiveError> {
        if self.current.as_ref().is_some_and(|open| open.directory == dir) {
            if let Some(open) = self.current.take() {
                open.unit.close()?;
            }
        } else if dir == self.root {
            if let Some(unit) = self.root_archive.take() {
                unit.close()?;
            }
        }
        Ok(())
    }

    fn on_file(&mut self, file: &Path) -> Result<(), ArchiveError> {
        let classification = self.classifier.classify_name(&lossy_name(file));
        if classification.outcome != Outcome::Drop && !has_utf8_name(file) {
            warn!(file = ?file, "Skipping file with a non UTF-8 name");
            self.stats.ignored += 1;
            return Ok(());
        }

        match classification.outcome {
            Outcome::IndexAndArchive => {
                let Some(container) = self.place(file)? else {
                    return Ok(());
                };
                let record =
                    RecordIndexer::build_record(&self.root, file, classification.include_content)?
                        .with_container(container);
                self.indexer.submit(&record)?;
                self.stats.indexed += 1;
            }
            Outcome::ArchiveOnly => {
                if self.place(file)?.is_some() {
                    self.stats.archived_only += 1;
                }
            }
            Outcome::Drop => {
                debug!(file = ?file, "Dropping");
                self.stats.dropped += 1;
            }
        }
        Ok(())
    }
}
