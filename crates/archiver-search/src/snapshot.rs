//! Packaging an on-disk index into a single zip snapshot, and loading it back.
//!
//! A snapshot holds every index file as a top-level entry. Loading copies the
//! entries into a `RamDirectory` so the archive never has to be extracted.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use tantivy::directory::{Directory, RamDirectory};
use tantivy::Index;
use tracing::{debug, info};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::SearchError;

/// Snapshot archive extension.
pub const SNAPSHOT_EXTENSION: &str = "zip";

/// Whether `path` names a packaged snapshot rather than an index directory.
pub fn is_snapshot_path(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(SNAPSHOT_EXTENSION))
}

/// Tantivy lock files are process-local and never packaged.
fn is_lock_file(name: &str) -> bool {
    name.starts_with(".tantivy-") && name.ends_with(".lock")
}

/// Package every file of `index_dir` into a new snapshot at `snapshot_path`.
///
/// Fails if the snapshot already exists. Returns the number of packaged files.
pub fn package_index(index_dir: &Path, snapshot_path: &Path) -> Result<usize, SearchError> {
    let file = File::options()
        .write(true)
        .create_new(true)
        .open(snapshot_path)?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut count = 0;
    for entry in std::fs::read_dir(index_dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if is_lock_file(&name) {
            continue;
        }

        zip.start_file(name.as_str(), options)?;
        let mut source = File::open(entry.path())?;
        std::io::copy(&mut source, &mut zip)?;
        debug!(file = %name, "Packaged index file");
        count += 1;
    }

    zip.finish()?;
    info!(files = count, snapshot = ?snapshot_path, "Packaged index snapshot");
    Ok(count)
}

/// Load a snapshot into an in-memory index.
pub fn load_snapshot(snapshot_path: &Path) -> Result<Index, SearchError> {
    let file = File::open(snapshot_path)?;
    let mut archive = ZipArchive::new(BufReader::new(file))?;
    let directory = RamDirectory::create();

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        if entry.is_dir() {
            continue;
        }
        let name = entry.name().to_string();
        let mut data = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut data)?;
        directory.atomic_write(Path::new(&name), &data)?;
    }

    debug!(entries = archive.len(), snapshot = ?snapshot_path, "Loaded index snapshot");
    Ok(Index::open(directory)?)
}
