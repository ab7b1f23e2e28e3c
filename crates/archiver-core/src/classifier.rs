//! File classification: index and archive, archive only, or drop.

use std::collections::HashSet;

use archiver_types::ClassificationRules;

/// What happens to a visited file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Record submitted to the index and file placed in a container
    IndexAndArchive,
    /// File placed in a container, no record
    ArchiveOnly,
    /// Neither indexed nor archived
    Drop,
}

/// Classification result for one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub outcome: Outcome,
    /// Whether the file's text is read into its record
    pub include_content: bool,
}

impl Classification {
    fn without_content(outcome: Outcome) -> Self {
        Self {
            outcome,
            include_content: false,
        }
    }
}

/// Extension of a file name: the substring from its last `.`, inclusive.
///
/// `.bashrc` has extension `.bashrc`; `Makefile` and `name.` have none.
pub fn extension_of(name: &str) -> &str {
    match name.rfind('.') {
        Some(idx) if idx + 1 < name.len() => &name[idx..],
        _ => "",
    }
}

/// Pure classifier built from a [`ClassificationRules`] value.
#[derive(Debug, Clone)]
pub struct RecordClassifier {
    forbidden_directories: HashSet<String>,
    forbidden_files: HashSet<String>,
    forbidden_extensions: HashSet<String>,
    archive_only_extensions: HashSet<String>,
    text_extensions: HashSet<String>,
    text_prefixes: Vec<String>,
    text_suffixes: Vec<String>,
}

impl RecordClassifier {
    pub fn new(rules: &ClassificationRules) -> Self {
        Self {
            forbidden_directories: rules.forbidden_directories.iter().cloned().collect(),
            forbidden_files: rules.forbidden_files.iter().cloned().collect(),
            forbidden_extensions: rules.forbidden_extensions.iter().cloned().collect(),
            archive_only_extensions: rules.archive_only_extensions.iter().cloned().collect(),
            text_extensions: rules
                .text_extensions
                .iter()
                .map(|e| e.to_lowercase())
                .collect(),
            text_prefixes: rules.text_prefixes.clone(),
            text_suffixes: rules.text_suffixes.clone(),
        }
    }

    /// Classify a file from its name and extension.
    pub fn classify(&self, name: &str, extension: &str) -> Classification {
        if self.forbidden_files.contains(name) {
            return Classification::without_content(Outcome::Drop);
        }
        if self.archive_only_extensions.contains(extension) {
            return Classification::without_content(Outcome::ArchiveOnly);
        }
        if self.forbidden_extensions.contains(extension) {
            return Classification::without_content(Outcome::Drop);
        }

        Classification {
            outcome: Outcome::IndexAndArchive,
            include_content: self.is_text(name, extension),
        }
    }

    /// Classify a file from its name alone.
    pub fn classify_name(&self, name: &str) -> Classification {
        self.classify(name, extension_of(name))
    }

    /// Whether a directory with this name is pruned from traversal.
    pub fn is_forbidden_directory(&self, name: &str) -> bool {
        self.forbidden_directories.contains(name)
    }

    fn is_text(&self, name: &str, extension: &str) -> bool {
        self.text_extensions.contains(&extension.to_lowercase())
            || self.text_prefixes.iter().any(|p| name.starts_with(p.as_str()))
            || self.text_suffixes.iter().any(|s| name.ends_with(s.as_str()))
    }
}

impl Default for RecordClassifier {
    fn default() -> Self {
        Self::new(&ClassificationRules::default())
    }
}
