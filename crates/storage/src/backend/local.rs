//! Local filesystem storage backend.
//!
//! Plain `tokio::fs` underneath. Moves are a single `rename(2)` and refuse to
//! cross filesystems: a copy interrupted halfway would leave a partial file
//! occupying the destination.

use crate::StorageBackend;
use crate::backend::EntryStream;
use crate::error::{ErrorKind, Result};
use crate::models::{EntryInfo, EntryType};
use async_stream::stream;
use async_trait::async_trait;
use exn::ResultExt;
use std::collections::VecDeque;
use std::fs::FileType;
use std::io;
use std::path::Path;
use tokio::fs;

/// Local filesystem storage backend.
///
/// # Examples
///
/// ```no_run
/// use dlren_storage::backend::{LocalBackend, StorageBackend};
/// use std::path::Path;
///
/// # async fn example() -> dlren_storage::error::Result<()> {
/// let backend = LocalBackend::new("local");
/// let entries = backend.list(Path::new("/downloads"), false).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct LocalBackend {
    name: String,
}
impl LocalBackend {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Symlinks and special files map to `None`; the pipeline never touches them.
    fn entry_type(file_type: FileType) -> Option<EntryType> {
        if file_type.is_dir() {
            Some(EntryType::Directory)
        } else if file_type.is_file() {
            Some(EntryType::File)
        } else {
            None
        }
    }

    fn map_io_error(e: io::Error, path: &Path) -> ErrorKind {
        match e.kind() {
            io::ErrorKind::NotFound => ErrorKind::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied(path.to_path_buf()),
            io::ErrorKind::AlreadyExists => ErrorKind::AlreadyExists(path.to_path_buf()),
            io::ErrorKind::NotADirectory => ErrorKind::NotADirectory(path.to_path_buf()),
            io::ErrorKind::CrossesDevices => ErrorKind::CrossesDevices(path.to_path_buf()),
            _ => ErrorKind::Io(e),
        }
    }

    /// Type of whatever is at `path`, without following symlinks.
    async fn source_type(path: &Path) -> Result<Option<EntryType>> {
        let metadata = fs::symlink_metadata(path).await.map_err(|e| Self::map_io_error(e, path))?;
        Ok(Self::entry_type(metadata.file_type()))
    }

    async fn ensure_vacant(&self, path: &Path) -> Result<()> {
        if self.exists(path).await? {
            exn::bail!(ErrorKind::AlreadyExists(path.to_path_buf()));
        }
        Ok(())
    }
}

#[async_trait]
impl StorageBackend for LocalBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn walk<'a>(&'a self, root: &'a Path, recursive: bool) -> EntryStream<'a> {
        let mut queue = VecDeque::from([root.to_path_buf()]);

        Box::pin(stream! {
            'dirs: while let Some(current) = queue.pop_front() {
                let mut entries = match fs::read_dir(&current).await {
                    Ok(entries) => entries,
                    Err(e) => {
                        yield Err::<EntryInfo, _>(e).or_raise(|| ErrorKind::Unreadable(current.clone()));
                        continue 'dirs;
                    },
                };

                'entries: loop {
                    let entry = match entries.next_entry().await {
                        Ok(Some(entry)) => entry,
                        Ok(None) => break 'entries,
                        // A failing directory handle tends to keep failing;
                        // give up on this directory rather than spin.
                        Err(e) => {
                            yield Err::<EntryInfo, _>(e).or_raise(|| ErrorKind::Unreadable(current.clone()));
                            break 'entries;
                        },
                    };
                    let path = entry.path();
                    let file_type = match entry.file_type().await {
                        Ok(file_type) => file_type,
                        Err(e) => {
                            yield Err(exn::Exn::from(Self::map_io_error(e, &path)));
                            continue 'entries;
                        },
                    };
                    match Self::entry_type(file_type) {
                        Some(EntryType::Directory) => {
                            if recursive {
                                queue.push_back(path.clone());
                            }
                            yield Ok(EntryInfo::new(path, EntryType::Directory));
                        },
                        Some(EntryType::File) => yield Ok(EntryInfo::new(path, EntryType::File)),
                        None => tracing::debug!(path = %path.display(), "skipping symlink or special file"),
                    }
                }
            }
        })
    }

    async fn exists(&self, path: &Path) -> Result<bool> {
        // `try_exists` follows symlinks; a dangling symlink still occupies the name.
        match fs::symlink_metadata(path).await {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Self::map_io_error(e, path).into()),
        }
    }

    async fn stat(&self, path: &Path) -> Result<EntryInfo> {
        let metadata = fs::metadata(path).await.map_err(|e| Self::map_io_error(e, path))?;
        match Self::entry_type(metadata.file_type()) {
            Some(kind) => Ok(EntryInfo::new(path, kind)),
            None => exn::bail!(ErrorKind::NotAFile(path.to_path_buf())),
        }
    }

    async fn rename_file(&self, from: &Path, to: &Path) -> Result<()> {
        if Self::source_type(from).await? != Some(EntryType::File) {
            exn::bail!(ErrorKind::NotAFile(from.to_path_buf()));
        }
        self.ensure_vacant(to).await?;
        fs::rename(from, to).await.map_err(|e| Self::map_io_error(e, from))?;
        Ok(())
    }

    async fn rename_dir(&self, from: &Path, to: &Path) -> Result<()> {
        if Self::source_type(from).await? != Some(EntryType::Directory) {
            exn::bail!(ErrorKind::NotADirectory(from.to_path_buf()));
        }
        self.ensure_vacant(to).await?;
        fs::rename(from, to).await.map_err(|e| Self::map_io_error(e, from))?;
        Ok(())
    }
}
