//! Configuration loading for dir-archiver.
//!
//! Layered config: defaults -> config file -> `--config` file -> env vars -> CLI flags.
//! The default config file lives at `<config dir>/dir-archiver/config.toml`.

use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::ConfigError;

/// Smallest writer budget tantivy accepts for a single indexing thread.
const MIN_WRITER_MEMORY_MB: usize = 15;

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

/// Name and extension sets driving file classification and directory pruning.
///
/// Extensions carry their leading dot (`.md`). Matching against
/// `forbidden_extensions` and `archive_only_extensions` is case-sensitive,
/// matching against `text_extensions` is not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationRules {
    /// Directory names pruned from traversal, wherever they appear.
    pub forbidden_directories: Vec<String>,
    /// Exact file names neither indexed nor archived.
    pub forbidden_files: Vec<String>,
    /// Extensions excluded from indexing.
    pub forbidden_extensions: Vec<String>,
    /// Extensions archived without being indexed (subset of `forbidden_extensions`).
    pub archive_only_extensions: Vec<String>,
    /// Extensions whose content is read into the index record.
    pub text_extensions: Vec<String>,
    /// File name prefixes whose content is read into the index record.
    pub text_prefixes: Vec<String>,
    /// File name suffixes whose content is read into the index record.
    pub text_suffixes: Vec<String>,
}

impl Default for ClassificationRules {
    fn default() -> Self {
        Self {
            forbidden_directories: strings(&[
                ".env",
                ".git",
                ".idea",
                ".settings",
                ".vscode",
                "target",
            ]),
            forbidden_files: strings(&[
                "package-lock.json",
                ".project",
                ".classpath",
                ".yemrc",
                ".sdkman",
                ".gitignore",
            ]),
            forbidden_extensions: strings(&[
                ".p12", ".pem", ".jks", ".map", ".jpg", ".jpeg", ".png", ".bmp", ".tiff", ".giff",
                ".exe", ".cache", ".svg", ".iml", ".ipr", ".iws",
            ]),
            archive_only_extensions: strings(&[
                ".pem", ".jpg", ".jpeg", ".png", ".bmp", ".tiff", ".giff", ".svg",
            ]),
            text_extensions: strings(&[
                ".txt",
                ".adoc",
                ".asciidoc",
                ".md",
                ".markdown",
                ".rst",
                ".java",
                ".cs",
                ".h",
                ".c",
                ".hpp",
                ".cpp",
                ".hxx",
                ".cxx",
                ".rb",
                ".csx",
                ".js",
                ".jsx",
                ".ts",
                ".html",
                ".scala",
                ".rs",
                ".py",
                ".properties",
                ".csproj",
                ".xml",
                ".xsd",
                ".xslt",
                ".json",
                ".yaml",
                ".yml",
                ".rc",
                ".sh",
                ".csv",
            ]),
            text_prefixes: strings(&["Dockerfile", "Makefile"]),
            text_suffixes: strings(&["rc"]),
        }
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Records submitted between two non-durable index flushes
    #[serde(default = "default_bulk_size")]
    pub bulk_size: usize,

    /// Memory budget for the index writer in MB
    #[serde(default = "default_writer_memory_mb")]
    pub writer_memory_mb: usize,

    /// Deflate level for archive entries (9 = smallest output)
    #[serde(default = "default_compression_level")]
    pub compression_level: i64,

    /// Directory names partitioned as independent roots wherever they are nested
    #[serde(default = "default_promoted_folders")]
    pub promoted_folders: Vec<String>,

    /// File classification sets
    #[serde(default)]
    pub rules: ClassificationRules,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_bulk_size() -> usize {
    100
}

fn default_writer_memory_mb() -> usize {
    50
}

fn default_compression_level() -> i64 {
    9
}

fn default_promoted_folders() -> Vec<String> {
    strings(&["0_dev"])
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            bulk_size: default_bulk_size(),
            writer_memory_mb: default_writer_memory_mb(),
            compression_level: default_compression_level(),
            promoted_folders: default_promoted_folders(),
            rules: ClassificationRules::default(),
        }
    }
}

impl Settings {
    /// Load settings with layered precedence:
    /// 1. Built-in defaults
    /// 2. Config file (`<config dir>/dir-archiver/config.toml`)
    /// 3. CLI-specified config file (optional)
    /// 4. Environment variables (`ARCHIVER_*`)
    ///
    /// CLI flags should be applied by the caller after this returns.
    pub fn load(cli_config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("log_level", default_log_level())?
            .set_default("bulk_size", default_bulk_size() as i64)?
            .set_default("writer_memory_mb", default_writer_memory_mb() as i64)?
            .set_default("compression_level", default_compression_level())?;

        if let Some(path) = default_config_path() {
            builder =
                builder.add_source(File::with_name(&path.to_string_lossy()).required(false));
        }

        if let Some(path) = cli_config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // ARCHIVER_LOG_LEVEL, ARCHIVER_BULK_SIZE, ...
        builder = builder.add_source(
            Environment::with_prefix("ARCHIVER")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject values the archiver cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bulk_size == 0 {
            return Err(ConfigError::Invalid("bulk_size must be > 0".to_string()));
        }
        if !(0..=9).contains(&self.compression_level) {
            return Err(ConfigError::Invalid(format!(
                "compression_level must be 0-9, got {}",
                self.compression_level
            )));
        }
        if self.writer_memory_mb < MIN_WRITER_MEMORY_MB {
            return Err(ConfigError::Invalid(format!(
                "writer_memory_mb must be >= {}, got {}",
                MIN_WRITER_MEMORY_MB, self.writer_memory_mb
            )));
        }
        Ok(())
    }

    /// Whether `name` is one of the promoted folder names.
    pub fn is_promoted(&self, name: &str) -> bool {
        self.promoted_folders.iter().any(|p| p == name)
    }
}

/// Location of the per-user config file, without extension.
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "dir-archiver").map(|p| p.config_dir().join("config"))
}
