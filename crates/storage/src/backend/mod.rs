//! Storage backend trait and implementations.
//!
//! This module defines the `StorageBackend` trait: the handful of filesystem
//! operations the renaming pipeline needs (walk, stat, exists, move), behind
//! a trait so the pipeline can be driven against an in-memory tree in tests.

mod local;
#[cfg(feature = "mock")]
mod mock;

pub use self::local::LocalBackend;
#[cfg(feature = "mock")]
pub use self::mock::MockBackend;
use crate::error::Result;
use crate::models::EntryInfo;
use async_trait::async_trait;
use futures::{Stream, TryStreamExt};
use std::path::Path;
use std::pin::Pin;

pub(crate) type EntryStream<'a> = Pin<Box<dyn Stream<Item = Result<EntryInfo>> + Send + 'a>>;

/// Unified interface for filesystem access.
///
/// All paths are absolute. Moves never overwrite: if the destination is
/// occupied they fail with [`AlreadyExists`](crate::error::ErrorKind::AlreadyExists).
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use dlren_storage::{backend::StorageBackend, error::Result};
///
/// async fn move_if_free(backend: &dyn StorageBackend, from: &Path, to: &Path) -> Result<bool> {
///     if backend.exists(to).await? {
///         return Ok(false);
///     }
///     backend.rename_file(from, to).await?;
///     Ok(true)
/// }
/// ```
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Name of the backend, used for logging only.
    fn name(&self) -> &str;

    /// List every entry below `root`.
    ///
    /// Default implementation of this method is to collect all the results
    /// from [`walk()`](Self::walk) into a [`Vec`] before returning, which
    /// means the first error aborts the listing.
    async fn list(&self, root: &Path, recursive: bool) -> Result<Vec<EntryInfo>> {
        self.walk(root, recursive).try_collect().await
    }

    /// Stream the files and directories below `root`.
    ///
    /// Entries of `root` come first, in the order the filesystem lists them;
    /// when `recursive` is set, subdirectories are then visited breadth-first.
    /// `root` itself is not yielded.
    ///
    /// A directory that cannot be listed yields an
    /// [`Unreadable`](crate::error::ErrorKind::Unreadable) error item and the
    /// walk carries on with the next directory, so callers decide whether a
    /// failure is fatal.
    fn walk<'a>(&'a self, root: &'a Path, recursive: bool) -> EntryStream<'a>;

    /// Check if anything (file, directory, ...) exists at `path`.
    async fn exists(&self, path: &Path) -> Result<bool>;

    /// Get the type of the entry at `path`.
    ///
    /// Returns [`NotFound`](crate::error::ErrorKind::NotFound) if nothing
    /// exists there.
    async fn stat(&self, path: &Path) -> Result<EntryInfo>;

    /// Move a regular file.
    ///
    /// # Notes
    /// - Fails with [`AlreadyExists`](crate::error::ErrorKind::AlreadyExists)
    ///   if the destination is occupied.
    /// - Only moves within one filesystem; otherwise fails with
    ///   [`CrossesDevices`](crate::error::ErrorKind::CrossesDevices).
    async fn rename_file(&self, from: &Path, to: &Path) -> Result<()>;

    /// Move a directory, with everything in it.
    ///
    /// # Notes
    /// - Fails with [`AlreadyExists`](crate::error::ErrorKind::AlreadyExists)
    ///   if the destination is occupied.
    /// - Only moves within one filesystem; otherwise fails with
    ///   [`CrossesDevices`](crate::error::ErrorKind::CrossesDevices).
    async fn rename_dir(&self, from: &Path, to: &Path) -> Result<()>;
}
