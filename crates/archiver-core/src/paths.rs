//! Path helpers for entry names and record paths.

use std::borrow::Cow;
use std::path::{Component, Path};

use crate::error::ArchiveError;

/// `path` relative to `base`, `/`-separated.
///
/// Fails when `path` is not below `base` or is not valid UTF-8.
pub fn relative_entry(base: &Path, path: &Path) -> Result<String, ArchiveError> {
    let relative = path.strip_prefix(base).map_err(|_| {
        ArchiveError::InvalidPath(format!(
            "'{}' is not under '{}'",
            path.display(),
            base.display()
        ))
    })?;

    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_str().ok_or_else(|| {
                ArchiveError::InvalidPath(format!("non UTF-8 name in '{}'", path.display()))
            })?),
            _ => {
                return Err(ArchiveError::InvalidPath(format!(
                    "unexpected component in '{}'",
                    path.display()
                )))
            }
        }
    }
    Ok(parts.join("/"))
}

/// Final component of `path` as UTF-8.
pub fn file_name(path: &Path) -> Result<&str, ArchiveError> {
    path.file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| ArchiveError::InvalidPath(format!("no usable name: '{}'", path.display())))
}

/// Final component of `path` for classification, invalid UTF-8 replaced.
pub fn lossy_name(path: &Path) -> Cow<'_, str> {
    path.file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default()
}

/// Whether the final component of `path` can be used as an entry name.
pub fn has_utf8_name(path: &Path) -> bool {
    path.file_name().is_some_and(|n| n.to_str().is_some())
}

/// Join a container reference prefix and a name.
pub fn join_ref(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}/{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_entry() {
        let base = Path::new("/data/root");
        assert_eq!(
            relative_entry(base, Path::new("/data/root/docs/readme.md")).unwrap(),
            "docs/readme.md"
        );
        assert_eq!(relative_entry(base, base).unwrap(), "");
    }

    #[test]
    fn test_relative_entry_outside_base() {
        let result = relative_entry(Path::new("/data/root"), Path::new("/elsewhere/x"));
        assert!(matches!(result, Err(ArchiveError::InvalidPath(_))));
    }

    #[test]
    fn test_file_name() {
        assert_eq!(file_name(Path::new("/a/b/c.txt")).unwrap(), "c.txt");
        assert!(file_name(Path::new("/")).is_err());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_non_utf8_name() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let path = Path::new("/data").join(OsStr::from_bytes(b"caf\xe9.p12"));
        assert!(!has_utf8_name(&path));
        assert_eq!(lossy_name(&path), "caf\u{fffd}.p12");
        assert!(file_name(&path).is_err());

        assert!(has_utf8_name(Path::new("/data/readme.md")));
        assert_eq!(lossy_name(Path::new("/")), "");
    }

    #[test]
    fn test_join_ref() {
        assert_eq!(join_ref("", "docs"), "docs");
        assert_eq!(join_ref("proj/sub/0_dev", "0_dev"), "proj/sub/0_dev/0_dev");
    }
}
