//! Command implementations for dir-archiver.
//!
//! Handles:
//! - index: index a directory into a plain on-disk index
//! - compress: partition a directory into archives and package the index
//! - search: query a plain index or a packaged snapshot

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use archiver_core::{compress_directory, index_directory};
use archiver_search::{ArchiveSearcher, SearchIndex, SearchOutcome};
use archiver_types::Settings;

/// Load configuration and apply CLI overrides (highest precedence).
pub fn load_settings(config_path: Option<&str>, log_level: Option<&str>) -> Result<Settings> {
    let mut settings = Settings::load(config_path).context("Failed to load configuration")?;
    if let Some(level) = log_level {
        settings.log_level = level.to_string();
    }
    Ok(settings)
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level. Logs go to stderr so search
/// results on stdout stay machine-readable.
pub fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;
    Ok(())
}

/// Index `source` into `index_dir`.
pub fn handle_index(settings: &Settings, source: &Path, index_dir: &Path) -> Result<()> {
    let report = index_directory(source, index_dir, settings)
        .with_context(|| format!("Failed to index {}", source.display()))?;

    println!(
        "Indexed {} files into {}",
        report.stats.indexed,
        report.index_dir.display()
    );
    Ok(())
}

/// Compress `input` into archives below `output`.
pub fn handle_compress(settings: &Settings, input: &Path, output: &Path) -> Result<()> {
    let report = compress_directory(input, output, settings)
        .with_context(|| format!("Failed to compress {}", input.display()))?;

    let stats = &report.stats;
    println!(
        "Archived {} files ({} indexed) into {} archives, {} dropped",
        stats.archived(),
        stats.indexed,
        stats.containers,
        stats.dropped
    );
    if stats.ignored > 0 {
        println!("Ignored {} files outside any archive", stats.ignored);
    }
    println!("Index: {}", report.snapshot.display());
    Ok(())
}

/// Run a query against a plain index directory or a `.zip` snapshot.
pub fn run_search(index: &Path, query: &[String], limit: Option<usize>) -> Result<SearchOutcome> {
    let index = SearchIndex::open_path(index)
        .with_context(|| format!("Failed to open index {}", index.display()))?;
    let searcher = ArchiveSearcher::new(&index).context("Failed to create searcher")?;
    let outcome = searcher.search(query, limit).context("Search failed")?;
    Ok(outcome)
}

/// Render search results for the terminal.
pub fn format_outcome(outcome: &SearchOutcome) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Matched {}/{} documents:",
        outcome.total_matched, outcome.total_docs
    );
    for hit in &outcome.hits {
        let _ = writeln!(
            out,
            "Path: '{}' > '{}' (score={})",
            hit.archive.as_deref().unwrap_or(""),
            hit.path,
            hit.score
        );
    }
    out
}

/// Search and print results.
pub fn handle_search(index: &Path, query: &[String], limit: Option<usize>, json: bool) -> Result<()> {
    let outcome = run_search(index, query, limit)?;
    info!(matched = outcome.total_matched, "Search finished");

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print!("{}", format_outcome(&outcome));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use archiver_search::SearchHit;

    #[test]
    fn test_format_outcome() {
        let outcome = SearchOutcome {
            hits: vec![
                SearchHit {
                    path: "docs/readme.md".to_string(),
                    archive: Some("docs".to_string()),
                    score: 1.5,
                },
                SearchHit {
                    path: "a.txt".to_string(),
                    archive: None,
                    score: 0.25,
                },
            ],
            total_matched: 2,
            total_docs: 10,
        };

        assert_eq!(
            format_outcome(&outcome),
            "Matched 2/10 documents:\n\
             Path: 'docs' > 'docs/readme.md' (score=1.5)\n\
             Path: '' > 'a.txt' (score=0.25)\n"
        );
    }

    #[test]
    fn test_format_empty_outcome() {
        let outcome = SearchOutcome {
            hits: Vec::new(),
            total_matched: 0,
            total_docs: 3,
        };
        assert_eq!(format_outcome(&outcome), "Matched 0/3 documents:\n");
    }

    #[test]
    fn test_load_settings_log_level_override() {
        let settings = load_settings(None, Some("trace")).unwrap();
        assert_eq!(settings.log_level, "trace");
    }
}
