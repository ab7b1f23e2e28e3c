//! Index record emitted for every indexed file.

use serde::{Deserialize, Serialize};

/// Metadata submitted to the full-text index for one file.
///
/// `path` is `/`-separated and relative to the partition root the file was
/// visited from. `container_ref` names the archive container holding the file
/// (without extension, relative to the top-level output directory); it is
/// `None` when the file was indexed without being archived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub path: String,
    pub size_bytes: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_ref: Option<String>,
}

impl FileRecord {
    pub fn new(path: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            path: path.into(),
            size_bytes,
            content: None,
            container_ref: None,
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_container(mut self, container_ref: impl Into<String>) -> Self {
        self.container_ref = Some(container_ref.into());
        self
    }
}
