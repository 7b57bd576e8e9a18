//! Discovery of candidate entries.
//!
//! Finds the `.zip` archives, `.rar` archives and folders below a root
//! directory whose names carry a product identifier. Split archive volumes
//! (anything with `.part` in its name) are never candidates: renaming one
//! volume would break the set.

pub mod error;

use self::error::{ErrorKind, Result};
use crate::entry::{CandidateEntry, EntryKind};
use dlren_storage::BackendHandle;
use dlren_storage::error::ErrorKind as StorageErrorKind;
use exn::ResultExt;
use futures::StreamExt;
use std::path::Path;
use tracing::instrument;

/// Returns the candidate entries below `root`: all zip archives, then all rar
/// archives, then all folders, each group in the order the walk found them.
///
/// With `recursive` unset only the immediate children of `root` are looked
/// at. Entries without an identifier are dropped silently.
///
/// Fails if `root` is missing, isn't a directory, or can't be listed.
/// Subdirectories that can't be listed are skipped with a warning.
#[instrument(skip_all, fields(backend = backend.name(), root = %root.display(), recursive))]
pub async fn scan(backend: &BackendHandle, root: &Path, recursive: bool) -> Result<Vec<CandidateEntry>> {
    match backend.stat(root).await {
        Ok(info) if info.is_dir() => {},
        Ok(_) => exn::bail!(ErrorKind::NotADirectory(root.to_path_buf())),
        Err(e) => {
            let kind = match &*e {
                StorageErrorKind::NotFound(_) => ErrorKind::NotFound(root.to_path_buf()),
                StorageErrorKind::NotADirectory(_) => ErrorKind::NotADirectory(root.to_path_buf()),
                _ => ErrorKind::Unreadable(root.to_path_buf()),
            };
            return Err(e).or_raise(|| kind);
        },
    }

    let mut zips = Vec::new();
    let mut rars = Vec::new();
    let mut folders = Vec::new();

    let mut walk = backend.walk(root, recursive);
    while let Some(item) = walk.next().await {
        let info = match item {
            Ok(info) => info,
            Err(e) => {
                let failed = &*e;
                if matches!(failed, StorageErrorKind::Unreadable(path) if path == root) {
                    return Err(e).or_raise(|| ErrorKind::Unreadable(root.to_path_buf()));
                }
                tracing::warn!(error = %failed, "skipping entry that could not be read");
                continue;
            },
        };
        let Some(name) = info.file_name() else {
            continue;
        };

        if info.is_dir() {
            folders.extend(CandidateEntry::from_path(info.path, EntryKind::Folder));
            continue;
        }
        if name.to_ascii_lowercase().contains(".part") {
            tracing::debug!(name = %name, "skipping split archive volume");
            continue;
        }
        match EntryKind::of_archive(&info.path) {
            Some(EntryKind::Zip) => zips.extend(CandidateEntry::from_path(info.path, EntryKind::Zip)),
            Some(EntryKind::Rar) => rars.extend(CandidateEntry::from_path(info.path, EntryKind::Rar)),
            Some(EntryKind::Folder) | None => {},
        }
    }

    tracing::info!(zips = zips.len(), rars = rars.len(), folders = folders.len(), "scan complete");
    zips.append(&mut rars);
    zips.append(&mut folders);
    Ok(zips)
}
