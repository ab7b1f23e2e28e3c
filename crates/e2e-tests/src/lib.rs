//! End-to-end test infrastructure for dir-archiver.
//!
//! Provides a shared TestHarness that lays out an input tree in a temp
//! directory, runs the archiver over it, and reads the produced containers
//! and index back.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use archiver_core::{compress_directory, CompressReport};
use archiver_search::{ArchiveSearcher, SearchIndex, SearchOutcome};
use archiver_types::Settings;
use zip::ZipArchive;

/// Shared test harness for E2E tests.
pub struct TestHarness {
    /// Keeps temp dir alive for the lifetime of the harness
    pub _temp_dir: tempfile::TempDir,
    /// Tree to archive, named `input`
    pub input: PathBuf,
    /// Output root of the first run
    pub output: PathBuf,
    pub settings: Settings,
}

impl TestHarness {
    /// Create a harness with an empty input tree.
    pub fn new() -> Self {
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let input = temp_dir.path().join("input");
        let output = temp_dir.path().join("output");
        fs::create_dir_all(&input).expect("Failed to create input dir");

        Self {
            _temp_dir: temp_dir,
            input,
            output,
            settings: Settings::default(),
        }
    }

    /// Write a file below the input root, creating parent directories.
    pub fn file(&self, relative: &str, content: &str) -> &Self {
        let path = self.input.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        fs::write(&path, content).expect("Failed to write fixture file");
        self
    }

    /// Create an empty directory below the input root.
    pub fn dir(&self, relative: &str) -> &Self {
        fs::create_dir_all(self.input.join(relative)).expect("Failed to create fixture dir");
        self
    }

    /// Another output location inside the harness temp dir.
    pub fn output_path(&self, name: &str) -> PathBuf {
        self._temp_dir.path().join(name)
    }

    /// Compress the input tree into the default output.
    pub fn compress(&self) -> CompressReport {
        self.compress_into(&self.output)
    }

    pub fn compress_into(&self, output: &Path) -> CompressReport {
        compress_directory(&self.input, output, &self.settings).expect("Compression failed")
    }

    /// Search the snapshot written into the default output.
    pub fn search(&self, terms: &[&str]) -> SearchOutcome {
        let index = SearchIndex::open_path(&self.output.join("_index.zip"))
            .expect("Failed to open snapshot");
        let searcher = ArchiveSearcher::new(&index).expect("Failed to create searcher");
        let terms: Vec<String> = terms.iter().map(|t| t.to_string()).collect();
        searcher.search(&terms, None).expect("Search failed")
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Every container below `output` (relative path without `.zip`) mapped to
/// its sorted entry names. The packaged index is excluded.
pub fn containers(output: &Path) -> BTreeMap<String, Vec<String>> {
    let mut found = BTreeMap::new();
    collect_containers(output, output, &mut found);
    found
}

fn collect_containers(output: &Path, dir: &Path, found: &mut BTreeMap<String, Vec<String>>) {
    for entry in fs::read_dir(dir).expect("Failed to read output dir") {
        let path = entry.expect("Failed to read output entry").path();
        if path.is_dir() {
            collect_containers(output, &path, found);
            continue;
        }
        let relative = path
            .strip_prefix(output)
            .expect("Container outside output")
            .to_string_lossy()
            .replace('\\', "/");
        let Some(name) = relative.strip_suffix(".zip") else {
            continue;
        };
        if name == "_index" {
            continue;
        }
        found.insert(name.to_string(), entry_names(&path));
    }
}

/// Sorted entry names of one container.
pub fn entry_names(container: &Path) -> Vec<String> {
    let file = File::open(container).expect("Failed to open container");
    let mut archive = ZipArchive::new(file).expect("Failed to read container");
    let mut names: Vec<String> = (0..archive.len())
        .map(|i| {
            archive
                .by_index(i)
                .expect("Failed to read entry")
                .name()
                .to_string()
        })
        .collect();
    names.sort();
    names
}

/// Read one entry of the container `<output>/<container_ref>.zip`.
pub fn read_entry(output: &Path, container_ref: &str, entry: &str) -> String {
    let path = output.join(format!("{container_ref}.zip"));
    let file = File::open(&path).expect("Failed to open container");
    let mut archive = ZipArchive::new(file).expect("Failed to read container");
    let mut entry = archive.by_name(entry).expect("Entry not found");
    let mut content = String::new();
    entry
        .read_to_string(&mut content)
        .expect("Failed to read entry");
    content
}
