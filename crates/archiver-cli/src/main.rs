//! dir-archiver
//!
//! Splits a directory tree into small zip archives while indexing every file,
//! so a file can later be located without extracting the archives.
//!
//! # Usage
//!
//! ```bash
//! dir-archiver compress -s <input-directory> -t <output-directory>
//! dir-archiver index -s <source-directory> -i <index-directory>
//! dir-archiver search -i <index-directory|_index.zip> [--limit N] [--json] <query>...
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded in order (later sources override earlier):
//! 1. Built-in defaults
//! 2. Config file (~/.config/dir-archiver/config.toml)
//! 3. `--config` file
//! 4. Environment variables (ARCHIVER_*)
//! 5. CLI flags

use anyhow::Result;

use archiver_cli::{
    handle_compress, handle_index, handle_search, init_logging, load_settings, Cli, Commands,
};

fn main() -> Result<()> {
    let cli = Cli::parse_args();

    let settings = load_settings(cli.config.as_deref(), cli.log_level.as_deref())?;
    init_logging(&settings.log_level)?;

    match cli.command {
        Commands::Index { source, index } => {
            handle_index(&settings, &source, &index)?;
        }
        Commands::Compress { input, output } => {
            handle_compress(&settings, &input, &output)?;
        }
        Commands::Search {
            index,
            limit,
            json,
            query,
        } => {
            handle_search(&index, &query, limit, json)?;
        }
    }

    Ok(())
}
