//! dir-archiver library exports.
//!
//! # Modules
//!
//! - `cli`: Command-line argument parsing with clap
//! - `commands`: Command implementations (index, compress, search)

pub mod cli;
pub mod commands;

pub use cli::{Cli, Commands};
pub use commands::{
    format_outcome, handle_compress, handle_index, handle_search, init_logging, load_settings,
    run_search,
};
