//! CLI argument parsing for dir-archiver.
//!
//! CLI flags override all other config sources.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Directory archiver
///
/// Splits a directory tree into small zip archives and indexes their files
/// so they can be found later without extracting anything.
#[derive(Parser, Debug)]
#[command(name = "dir-archiver")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default ~/.config/dir-archiver/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Archiver commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Index a directory without archiving it
    Index {
        /// Directory to index
        #[arg(short = 's', long = "source-directory")]
        source: PathBuf,

        /// Directory holding the index
        #[arg(short = 'i', long = "index-directory")]
        index: PathBuf,
    },

    /// Compress a directory into small archives and index their files
    Compress {
        /// Directory to compress and index
        #[arg(short = 's', long = "input-directory")]
        input: PathBuf,

        /// Output root directory
        #[arg(short = 't', long = "output-directory")]
        output: PathBuf,
    },

    /// Search an index
    Search {
        /// Index directory, or the _index.zip written by compress
        #[arg(short = 'i', long = "index")]
        index: PathBuf,

        /// Maximum number of hits to print (default: all)
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,

        /// Query terms, all of which must match; `*` and `?` are wildcards
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
