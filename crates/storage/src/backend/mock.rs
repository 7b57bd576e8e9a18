//! In-memory storage backend for testing.

use super::EntryStream;
use crate::StorageBackend;
use crate::error::{ErrorKind, Result};
use crate::models::{EntryInfo, EntryType};
use async_stream::stream;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

/// In-memory storage backend for testing.
///
/// The tree is a sorted map of absolute paths behind a [`RwLock`], so walks
/// are deterministic (children in byte order of their paths). Parent
/// directories of every inserted path are created implicitly.
///
/// Failures can be injected per path: [`fail_moves_of`](Self::fail_moves_of)
/// makes moving that source fail, [`unreadable`](Self::unreadable) makes
/// listing that directory fail.
///
/// # Examples
///
/// ```
/// use dlren_storage::backend::{MockBackend, StorageBackend};
/// use std::path::Path;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = MockBackend::with_files(["/lib/RJ123456.zip"]).with_dirs(["/lib/RJ654321"]);
/// assert!(backend.exists(Path::new("/lib/RJ123456.zip")).await?);
/// assert_eq!(backend.list(Path::new("/lib"), false).await?.len(), 2);
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct MockBackend {
    tree: RwLock<BTreeMap<PathBuf, EntryType>>,
    failing_moves: HashSet<PathBuf>,
    unreadable: HashSet<PathBuf>,
}

impl MockBackend {
    /// Create a mock backend pre-populated with files.
    ///
    /// Panics if any path is relative. If test setup is wrong, then test
    /// should not pass.
    pub fn with_files(files: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self::default().insert_all(files, EntryType::File)
    }

    /// Add (empty) directories.
    pub fn with_dirs(self, dirs: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        self.insert_all(dirs, EntryType::Directory)
    }

    /// Every move whose source is `path` fails with a backend error.
    pub fn fail_moves_of(mut self, path: impl Into<PathBuf>) -> Self {
        self.failing_moves.insert(path.into());
        self
    }

    /// Listing `path` fails with [`ErrorKind::Unreadable`].
    pub fn unreadable(mut self, path: impl Into<PathBuf>) -> Self {
        self.unreadable.insert(path.into());
        self
    }

    /// Snapshot of every path in the tree, in order.
    pub async fn paths(&self) -> Vec<PathBuf> {
        self.tree.read().await.keys().cloned().collect()
    }

    fn insert_all(mut self, paths: impl IntoIterator<Item = impl Into<PathBuf>>, kind: EntryType) -> Self {
        {
            let tree = self.tree.get_mut();
            for path in paths {
                let path = path.into();
                if !path.is_absolute() {
                    panic!("MockBackend: path must be absolute: {}", path.display());
                }
                for ancestor in path.ancestors().skip(1) {
                    if ancestor.parent().is_some() {
                        tree.insert(ancestor.to_path_buf(), EntryType::Directory);
                    }
                }
                tree.insert(path, kind);
            }
        }
        self
    }

    async fn check_move(&self, from: &Path, to: &Path, expected: EntryType) -> Result<()> {
        let tree = self.tree.read().await;
        match tree.get(from) {
            None => exn::bail!(ErrorKind::NotFound(from.to_path_buf())),
            Some(kind) if *kind != expected => match expected {
                EntryType::File => exn::bail!(ErrorKind::NotAFile(from.to_path_buf())),
                EntryType::Directory => exn::bail!(ErrorKind::NotADirectory(from.to_path_buf())),
            },
            Some(_) => {},
        }
        if tree.contains_key(to) {
            exn::bail!(ErrorKind::AlreadyExists(to.to_path_buf()));
        }
        if let Some(parent) = to.parent()
            && parent.parent().is_some()
            && tree.get(parent) != Some(&EntryType::Directory)
        {
            exn::bail!(ErrorKind::NotFound(parent.to_path_buf()));
        }
        if self.failing_moves.contains(from) {
            exn::bail!(ErrorKind::BackendError(format!("simulated failure moving {}", from.display())));
        }
        Ok(())
    }
}

#[async_trait]
impl StorageBackend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    fn walk<'a>(&'a self, root: &'a Path, recursive: bool) -> EntryStream<'a> {
        let mut queue = VecDeque::from([root.to_path_buf()]);

        Box::pin(stream! {
            while let Some(current) = queue.pop_front() {
                // Snapshot children under the read lock, then drop it before
                // yielding to avoid holding the lock across yield points.
                let children: Option<Vec<(PathBuf, EntryType)>> = {
                    let tree = self.tree.read().await;
                    let is_dir = tree.get(&current) == Some(&EntryType::Directory);
                    is_dir.then(|| {
                        tree.iter()
                            .filter(|(path, _)| path.parent() == Some(current.as_path()))
                            .map(|(path, kind)| (path.clone(), *kind))
                            .collect()
                    })
                };
                let Some(children) = children.filter(|_| !self.unreadable.contains(&current)) else {
                    yield Err(exn::Exn::from(ErrorKind::Unreadable(current)));
                    continue;
                };
                for (path, kind) in children {
                    if recursive && kind == EntryType::Directory {
                        queue.push_back(path.clone());
                    }
                    yield Ok(EntryInfo::new(path, kind));
                }
            }
        })
    }

    async fn exists(&self, path: &Path) -> Result<bool> {
        Ok(self.tree.read().await.contains_key(path))
    }

    async fn stat(&self, path: &Path) -> Result<EntryInfo> {
        let tree = self.tree.read().await;
        let kind = tree.get(path).copied().ok_or_else(|| exn::Exn::from(ErrorKind::NotFound(path.to_path_buf())))?;
        Ok(EntryInfo::new(path, kind))
    }

    async fn rename_file(&self, from: &Path, to: &Path) -> Result<()> {
        self.check_move(from, to, EntryType::File).await?;
        let mut tree = self.tree.write().await;
        tree.remove(from);
        tree.insert(to.to_path_buf(), EntryType::File);
        Ok(())
    }

    async fn rename_dir(&self, from: &Path, to: &Path) -> Result<()> {
        self.check_move(from, to, EntryType::Directory).await?;
        let mut tree = self.tree.write().await;
        let moved: Vec<PathBuf> = tree.keys().filter(|p| p.starts_with(from)).cloned().collect();
        for old in moved {
            if let Some(kind) = tree.remove(&old)
                && let Ok(rest) = old.strip_prefix(from)
            {
                let new = if rest.as_os_str().is_empty() { to.to_path_buf() } else { to.join(rest) };
                tree.insert(new, kind);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_parents_are_created() {
        let backend = MockBackend::with_files(["/lib/a/b/RJ123456.zip"]);
        assert_eq!(
            backend.paths().await,
            vec![
                PathBuf::from("/lib"),
                PathBuf::from("/lib/a"),
                PathBuf::from("/lib/a/b"),
                PathBuf::from("/lib/a/b/RJ123456.zip"),
            ]
        );
        assert!(backend.stat(Path::new("/lib/a")).await.unwrap().is_dir());
    }

    #[tokio::test]
    async fn test_walk_order() {
        let backend = MockBackend::with_files(["/lib/b.zip", "/lib/a.zip", "/lib/sub/c.rar"]);
        let paths: Vec<_> = backend.list(Path::new("/lib"), true).await.unwrap().into_iter().map(|e| e.path).collect();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("/lib/a.zip"),
                PathBuf::from("/lib/b.zip"),
                PathBuf::from("/lib/sub"),
                PathBuf::from("/lib/sub/c.rar"),
            ]
        );
    }

    #[tokio::test]
    async fn test_walk_unreadable() {
        let backend = MockBackend::with_files(["/lib/sub/c.rar"]).unreadable("/lib/sub");
        let err = backend.list(Path::new("/lib"), true).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Unreadable(p) if p == Path::new("/lib/sub")));
        // Non-recursive walks never look inside.
        assert_eq!(backend.list(Path::new("/lib"), false).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_rename_dir_moves_descendants() {
        let backend = MockBackend::with_files(["/lib/RJ123456/track.mp3"]);
        backend.rename_dir(Path::new("/lib/RJ123456"), Path::new("/lib/Title")).await.unwrap();
        assert_eq!(
            backend.paths().await,
            vec![PathBuf::from("/lib"), PathBuf::from("/lib/Title"), PathBuf::from("/lib/Title/track.mp3")]
        );
    }

    #[tokio::test]
    async fn test_moves_never_overwrite() {
        let backend = MockBackend::with_files(["/lib/a.zip", "/lib/b.zip"]);
        let err = backend.rename_file(Path::new("/lib/a.zip"), Path::new("/lib/b.zip")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::AlreadyExists(_)));
        assert!(backend.exists(Path::new("/lib/a.zip")).await.unwrap());
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let backend = MockBackend::with_files(["/lib/a.zip"]).fail_moves_of("/lib/a.zip");
        let err = backend.rename_file(Path::new("/lib/a.zip"), Path::new("/lib/b.zip")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::BackendError(_)));
        assert!(backend.exists(Path::new("/lib/a.zip")).await.unwrap());
    }
}
