//! repo::handle
//!
//! Exclusive owner of the native libgit2 repository.
//!
//! `RepoHandle` is the only type in the crate holding a `git2::Repository`.
//! It is `Send` but deliberately not shared: after construction it moves
//! onto the repository's queue worker thread and every method below runs
//! inside a queued work item. No other module may import `git2`'s repository
//! object.

use std::path::{Path, PathBuf};

use super::error::RepoError;

/// Git's index filemode for a gitlink (submodule) entry.
const FILEMODE_COMMIT: u32 = 0o160000;
const FILEMODE_MASK: u32 = 0o170000;

/// The native repository handle.
///
/// At most one operation may be in flight at a time; the
/// [`crate::exec::OpQueue`] enforces this by owning the handle on a single
/// worker thread.
pub struct RepoHandle {
    repo: git2::Repository,
}

impl std::fmt::Debug for RepoHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepoHandle")
            .field("path", &self.repo.path())
            .finish()
    }
}

impl RepoHandle {
    // =========================================================================
    // Opening and Info
    // =========================================================================

    /// Open the repository containing `path`.
    ///
    /// With `search_ancestors` set, `path` and its ancestors are searched
    /// for repository metadata; otherwise only `path` itself is checked.
    /// Returns `None` when no repository is found; "not a repository" is a
    /// signal, never an error. Bare repositories open normally and serve
    /// reads; operations needing a working tree degrade per their contract.
    pub fn open(path: &Path, search_ancestors: bool) -> Option<Self> {
        let flags = if search_ancestors {
            git2::RepositoryOpenFlags::empty()
        } else {
            git2::RepositoryOpenFlags::NO_SEARCH
        };
        let repo =
            git2::Repository::open_ext(path, flags, std::iter::empty::<&std::ffi::OsStr>()).ok()?;
        Some(Self { repo })
    }

    /// Path to the repository metadata (`.git`) directory.
    pub fn git_dir(&self) -> &Path {
        self.repo.path()
    }

    /// Path to the working directory.
    pub fn workdir(&self) -> Option<&Path> {
        self.repo.workdir()
    }

    /// Borrow the underlying repository. Crate-internal: only the engine
    /// `impl` blocks in this module tree use it.
    pub(super) fn repo(&self) -> &git2::Repository {
        &self.repo
    }

    // =========================================================================
    // Blob Access
    // =========================================================================

    /// The tree of the HEAD commit, or `None` when HEAD is unborn or broken.
    pub(super) fn head_tree(&self) -> Result<Option<git2::Tree<'_>>, RepoError> {
        let head = match self.repo.head() {
            Ok(head) => head,
            Err(_) => return Ok(None),
        };
        let commit = match head.peel_to_commit() {
            Ok(commit) => commit,
            Err(_) => return Ok(None),
        };
        Ok(Some(commit.tree()?))
    }

    /// Look up the blob stored for `path`, from the index when `use_index`
    /// is set and from the HEAD tree otherwise.
    pub(super) fn blob_for(
        &self,
        path: &str,
        use_index: bool,
    ) -> Result<Option<git2::Blob<'_>>, RepoError> {
        if use_index {
            let index = self.repo.index()?;
            let Some(entry) = index.get_path(Path::new(path), 0) else {
                return Ok(None);
            };
            return Ok(self.repo.find_blob(entry.id).ok());
        }

        let Some(tree) = self.head_tree()? else {
            return Ok(None);
        };
        let Ok(entry) = tree.get_path(Path::new(path)) else {
            return Ok(None);
        };
        let object = entry.to_object(&self.repo)?;
        Ok(object.into_blob().ok())
    }

    fn blob_text(&self, path: &str, use_index: bool) -> Result<Option<String>, RepoError> {
        let Some(blob) = self.blob_for(path, use_index)? else {
            return Ok(None);
        };
        Ok(String::from_utf8(blob.content().to_vec()).ok())
    }

    /// UTF-8 contents of the blob for `path` in the HEAD tree.
    pub fn head_blob(&self, path: &str) -> Result<Option<String>, RepoError> {
        self.blob_text(path, false)
    }

    /// UTF-8 contents of the blob for `path` in the index.
    pub fn index_blob(&self, path: &str) -> Result<Option<String>, RepoError> {
        self.blob_text(path, true)
    }

    // =========================================================================
    // Index Mutation
    // =========================================================================

    /// Stage the current on-disk contents of `path` into the index.
    ///
    /// # Errors
    ///
    /// - [`RepoError::PathNotFound`] if `path` does not exist on disk
    pub fn add(&self, path: &str) -> Result<(), RepoError> {
        let workdir = self.repo.workdir().ok_or(RepoError::Bare)?;
        if !workdir.join(path).exists() {
            return Err(RepoError::PathNotFound {
                path: path.to_string(),
            });
        }
        let mut index = self.repo.index()?;
        index.add_path(Path::new(path))?;
        index.write()?;
        Ok(())
    }

    /// Re-read the index from disk, discarding in-memory state.
    ///
    /// Needed after an external process (e.g. a `git` invocation) has
    /// rewritten the index behind this handle's back.
    pub fn refresh_index(&self) -> Result<(), RepoError> {
        let mut index = self.repo.index()?;
        index.read(false)?;
        Ok(())
    }

    // =========================================================================
    // Submodules
    // =========================================================================

    /// Whether the index records `path` as a gitlink (submodule) entry.
    pub fn is_submodule(&self, path: &str) -> Result<bool, RepoError> {
        let index = self.repo.index()?;
        Ok(index
            .get_path(Path::new(path), 0)
            .is_some_and(|entry| entry.mode & FILEMODE_MASK == FILEMODE_COMMIT))
    }

    /// Working-directory-relative paths of all registered submodules,
    /// forward-slash separated.
    pub fn submodule_paths(&self) -> Result<Vec<String>, RepoError> {
        let submodules = self.repo.submodules()?;
        Ok(submodules
            .iter()
            .map(|submodule| submodule.path().to_string_lossy().replace('\\', "/"))
            .collect())
    }
}

/// Owned path metadata captured at open time, before the handle moves onto
/// its worker thread.
#[derive(Debug, Clone)]
pub struct RepoInfo {
    /// Path to the `.git` directory.
    pub git_dir: PathBuf,
    /// Path to the working directory; `None` for a bare repository.
    pub work_dir: Option<PathBuf>,
}

impl RepoInfo {
    pub(super) fn of(handle: &RepoHandle) -> Self {
        Self {
            git_dir: handle.git_dir().to_path_buf(),
            work_dir: handle.workdir().map(Path::to_path_buf),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_rejects_non_repository() {
        assert!(RepoHandle::open(Path::new("/tmp/path/does/not/exist"), true).is_none());
    }

    #[test]
    fn gitlink_filemode_detection() {
        assert_eq!(0o160000 & FILEMODE_MASK, FILEMODE_COMMIT);
        // Regular file and symlink modes are not gitlinks.
        assert_ne!(0o100644 & FILEMODE_MASK, FILEMODE_COMMIT);
        assert_ne!(0o120000 & FILEMODE_MASK, FILEMODE_COMMIT);
    }
}
