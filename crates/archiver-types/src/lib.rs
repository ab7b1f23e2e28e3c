//! # archiver-types
//!
//! Shared domain types for dir-archiver.
//!
//! - [`FileRecord`]: metadata submitted to the full-text index for one file
//! - [`ClassificationRules`]: name/extension sets used to classify files
//! - [`Settings`]: layered configuration

pub mod config;
pub mod error;
pub mod record;

pub use config::{default_config_path, ClassificationRules, Settings};
pub use error::ConfigError;
pub use record::FileRecord;
