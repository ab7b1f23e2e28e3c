//! Archive containers: one zip file per partition boundary.

use std::fs::File;
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::ArchiveError;

/// Container extension.
pub const CONTAINER_EXTENSION: &str = "zip";

/// Entries at or above this size need zip64 headers.
const LARGE_FILE_THRESHOLD: u64 = u32::MAX as u64;

/// An open, append-only archive container.
///
/// Created with create-new semantics, so an existing container is never
/// overwritten or reopened. Closing consumes the unit.
pub struct ArchiveUnit {
    name: String,
    path: PathBuf,
    writer: ZipWriter<File>,
    options: SimpleFileOptions,
    entries: usize,
}

impl ArchiveUnit {
    /// Create a new container at `path`.
    ///
    /// `name` is the container reference recorded in the index.
    pub fn create(
        path: &Path,
        name: impl Into<String>,
        compression_level: i64,
    ) -> Result<Self, ArchiveError> {
        let container_error = |source| ArchiveError::Container {
            path: path.display().to_string(),
            source,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(container_error)?;
        }
        let file = File::options()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(container_error)?;

        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(compression_level));

        let name = name.into();
        info!(container = %name, path = ?path, "Creating archive");

        Ok(Self {
            name,
            path: path.to_path_buf(),
            writer: ZipWriter::new(file),
            options,
            entries: 0,
        })
    }

    /// Container reference, without extension.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of entries written so far (files and folder markers).
    pub fn entries(&self) -> usize {
        self.entries
    }

    /// Copy `source` into the container under `entry_name`.
    pub fn add_file(&mut self, source: &Path, entry_name: &str) -> Result<u64, ArchiveError> {
        let mut input = File::open(source).map_err(|e| self.io_error(e))?;
        let size = input.metadata().map_err(|e| self.io_error(e))?.len();
        let options = self.options.large_file(size >= LARGE_FILE_THRESHOLD);

        self.writer
            .start_file(entry_name, options)
            .map_err(|e| self.zip_error(e))?;
        let written = std::io::copy(&mut input, &mut self.writer).map_err(|e| self.io_error(e))?;
        self.entries += 1;

        debug!(container = %self.name, entry = %entry_name, bytes = written, "Added file");
        Ok(written)
    }

    /// Add an empty directory entry. A trailing `/` is appended when missing.
    pub fn add_folder_marker(&mut self, entry_name: &str) -> Result<(), ArchiveError> {
        let marker = if entry_name.ends_with('/') {
            entry_name.to_string()
        } else {
            format!("{entry_name}/")
        };
        self.writer
            .add_directory(marker.as_str(), self.options)
            .map_err(|e| self.zip_error(e))?;
        self.entries += 1;

        debug!(container = %self.name, entry = %marker, "Added folder marker");
        Ok(())
    }

    /// Write the central directory and close the container.
    pub fn close(self) -> Result<usize, ArchiveError> {
        let Self {
            name,
            path,
            writer,
            entries,
            ..
        } = self;

        writer.finish().map_err(|source| ArchiveError::Zip {
            path: path.display().to_string(),
            source,
        })?;

        info!(container = %name, entries, "Archived");
        Ok(entries)
    }

    fn io_error(&self, source: std::io::Error) -> ArchiveError {
        ArchiveError::Container {
            path: self.path.display().to_string(),
            source,
        }
    }

    fn zip_error(&self, source: zip::result::ZipError) -> ArchiveError {
        ArchiveError::Zip {
            path: self.path.display().to_string(),
            source,
        }
    }
}

impl std::fmt::Debug for ArchiveUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveUnit")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("entries", &self.entries)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Read;
    use tempfile::TempDir;
    use zip::ZipArchive;

    fn entry_names(path: &Path) -> Vec<String> {
        let mut archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
        let mut names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_create_add_close() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("readme.md");
        std::fs::write(&source, "hello archive").unwrap();

        let zip_path = temp_dir.path().join("out/docs.zip");
        let mut unit = ArchiveUnit::create(&zip_path, "docs", 9).unwrap();
        assert_eq!(unit.name(), "docs");

        unit.add_file(&source, "readme.md").unwrap();
        unit.add_folder_marker("deep").unwrap();
        assert_eq!(unit.entries(), 2);
        assert_eq!(unit.close().unwrap(), 2);

        assert_eq!(entry_names(&zip_path), vec!["deep/", "readme.md"]);

        let mut archive = ZipArchive::new(File::open(&zip_path).unwrap()).unwrap();
        let mut entry = archive.by_name("readme.md").unwrap();
        let mut content = String::new();
        entry.read_to_string(&mut content).unwrap();
        assert_eq!(content, "hello archive");
    }

    #[test]
    fn test_folder_marker_is_empty_dir_entry() {
        let temp_dir = TempDir::new().unwrap();
        let zip_path = temp_dir.path().join("a.zip");
        let mut unit = ArchiveUnit::create(&zip_path, "a", 9).unwrap();
        unit.add_folder_marker("x/y/").unwrap();
        unit.close().unwrap();

        let mut archive = ZipArchive::new(File::open(&zip_path).unwrap()).unwrap();
        let entry = archive.by_index(0).unwrap();
        assert_eq!(entry.name(), "x/y/");
        assert!(entry.is_dir());
        assert_eq!(entry.size(), 0);
    }

    #[test]
    fn test_existing_container_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let zip_path = temp_dir.path().join("docs.zip");
        std::fs::write(&zip_path, b"occupied").unwrap();

        let result = ArchiveUnit::create(&zip_path, "docs", 9);
        assert!(matches!(result, Err(ArchiveError::Container { .. })));
    }

    #[test]
    fn test_missing_source_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let mut unit = ArchiveUnit::create(&temp_dir.path().join("a.zip"), "a", 9).unwrap();
        let result = unit.add_file(&temp_dir.path().join("gone.txt"), "gone.txt");
        assert!(matches!(result, Err(ArchiveError::Container { .. })));
    }
}
