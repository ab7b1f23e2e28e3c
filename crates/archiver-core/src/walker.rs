//! Depth-first filesystem traversal with enter/exit callbacks.
//!
//! Children are visited in native enumeration order. A directory whose
//! `on_directory` returns [`VisitState::SkipSubtree`] has no children visited
//! and receives no `on_directory_exit`; every other directory receives exactly
//! one exit callback, after all of its children.

use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::error::ArchiveError;

/// Decision returned when entering a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitState {
    Continue,
    SkipSubtree,
}

/// Callbacks driven by [`TreeWalker`].
pub trait VisitHandler {
    /// Called for every directory, root included, before its children.
    fn on_directory(&mut self, dir: &Path) -> Result<VisitState, ArchiveError>;

    /// Called once all children of a non-skipped directory were visited.
    fn on_directory_exit(&mut self, dir: &Path) -> Result<(), ArchiveError>;

    /// Called for every regular file.
    fn on_file(&mut self, file: &Path) -> Result<(), ArchiveError>;
}

/// Depth-first walker over one root directory.
///
/// Symbolic links are followed; loops and dangling links fail the walk.
#[derive(Debug, Clone)]
pub struct TreeWalker {
    root: PathBuf,
}

impl TreeWalker {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Walk the tree, driving `handler`.
    ///
    /// A missing root is not an error: nothing is visited.
    pub fn visit<H: VisitHandler + ?Sized>(&self, handler: &mut H) -> Result<(), ArchiveError> {
        if !self.root.is_dir() {
            debug!(root = ?self.root, "Walk root does not exist, nothing to visit");
            return Ok(());
        }

        // Directories entered but not yet exited, with their depth
        let mut open: Vec<(usize, PathBuf)> = Vec::new();
        let mut entries = WalkDir::new(&self.root).follow_links(true).into_iter();

        while let Some(entry) = entries.next() {
            let entry = entry?;
            let depth = entry.depth();

            while open.last().is_some_and(|(d, _)| *d >= depth) {
                if let Some((_, dir)) = open.pop() {
                    handler.on_directory_exit(&dir)?;
                }
            }

            let file_type = entry.file_type();
            if file_type.is_dir() {
                match handler.on_directory(entry.path())? {
                    VisitState::Continue => open.push((depth, entry.into_path())),
                    VisitState::SkipSubtree => {
                        debug!(dir = ?entry.path(), "Skipping subtree");
                        entries.skip_current_dir();
                    }
                }
            } else if file_type.is_file() {
                handler.on_file(entry.path())?;
            } else {
                return Err(ArchiveError::UnsupportedEntry(
                    entry.path().display().to_string(),
                ));
            }
        }

        while let Some((_, dir)) = open.pop() {
            handler.on_directory_exit(&dir)?;
        }

        Ok(())
    }
}
