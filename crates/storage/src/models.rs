//! Storage models.

use std::path::PathBuf;

/// What kind of filesystem object an [`EntryInfo`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryType {
    File,
    Directory,
}

/// A filesystem object returned by storage backends.
///
/// Symlinks and special files are never reported; backends drop them while
/// walking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInfo {
    /// Absolute path of the entry
    pub path: PathBuf,
    pub kind: EntryType,
}
impl EntryInfo {
    pub fn new(path: impl Into<PathBuf>, kind: EntryType) -> Self {
        Self { path: path.into(), kind }
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryType::Directory
    }

    /// Final component of the path, lossily converted to UTF-8.
    pub fn file_name(&self) -> Option<String> {
        self.path.file_name().map(|n| n.to_string_lossy().into_owned())
    }
}
