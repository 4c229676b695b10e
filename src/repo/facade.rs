//! repo::facade
//!
//! The public repository facade.
//!
//! [`Repository`] is a cheap-to-clone handle (an `Arc` over shared state)
//! whose every git-touching method forwards onto the repository's operation
//! queue. The native handle lives on the worker thread from the moment
//! `open` returns, so no caller can reach it directly and no two operations
//! ever overlap.
//!
//! Queries flatten failures into absent values: a closed queue, a missing
//! reference, or an internal libgit2 error all surface as `None`, an empty
//! collection, a zeroed count, or `false`. Only [`Repository::add`] reports
//! an error, because a nonexistent path there is a caller bug rather than
//! an ordinary repository state.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::exec::OpQueue;
use crate::repo::diff::{DiffOptions, DiffStats, Hunk, LineDiff};
use crate::repo::error::RepoError;
use crate::repo::handle::{RepoHandle, RepoInfo};
use crate::repo::paths::WorkdirPaths;
use crate::repo::refs::{AheadBehind, References};
use crate::repo::status::{
    is_status_deleted, is_status_modified, is_status_new, is_status_staged, Status,
};

// ============================================================
// Repository
// ============================================================

/// A concurrency-safe facade over one local git repository.
///
/// Clones share the same worker and queue. The worker shuts down when
/// [`release`](Self::release) is called or when the last clone is dropped;
/// after that, queries return absent values and fallible operations return
/// [`RepoError::Released`].
pub struct Repository {
    inner: Arc<Inner>,
}

struct Inner {
    queue: OpQueue<RepoHandle>,
    info: RepoInfo,
    paths: Option<WorkdirPaths>,
    case_insensitive_fs: AtomicBool,
    submodules: Mutex<BTreeMap<String, Repository>>,
}

impl Clone for Repository {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("git_dir", &self.inner.info.git_dir)
            .field("work_dir", &self.inner.info.work_dir)
            .finish_non_exhaustive()
    }
}

impl Repository {
    // ============================================================
    // Lifecycle
    // ============================================================

    /// Open the repository containing `path`, searching ancestor
    /// directories. `None` when no repository is found. Bare repositories
    /// open and serve reads; working-tree operations degrade to absent
    /// values on them.
    pub fn open(path: impl AsRef<Path>) -> Option<Self> {
        Self::open_with(path, true)
    }

    /// Open with explicit control over ancestor searching.
    pub fn open_with(path: impl AsRef<Path>, search_ancestors: bool) -> Option<Self> {
        let handle = RepoHandle::open(path.as_ref(), search_ancestors)?;
        let info = RepoInfo::of(&handle);
        let paths = info.work_dir.as_deref().map(WorkdirPaths::new);
        let (queue, _worker) = OpQueue::spawn("gitgate-repo", handle).ok()?;
        tracing::debug!(git_dir = %info.git_dir.display(), "repository opened");
        Some(Self {
            inner: Arc::new(Inner {
                queue,
                info,
                paths,
                case_insensitive_fs: AtomicBool::new(cfg!(any(
                    windows,
                    target_os = "macos"
                ))),
                submodules: Mutex::new(BTreeMap::new()),
            }),
        })
    }

    /// Shut the worker down and free the native handle.
    ///
    /// Cached submodule repositories are released as well. Idempotent;
    /// operations submitted after release fail as described on the type.
    pub fn release(&self) {
        if let Ok(submodules) = self.inner.submodules.lock() {
            for submodule in submodules.values() {
                submodule.release();
            }
        }
        self.inner.queue.close();
        tracing::debug!(git_dir = %self.inner.info.git_dir.display(), "repository released");
    }

    /// Path to the `.git` directory.
    pub fn path(&self) -> &Path {
        &self.inner.info.git_dir
    }

    /// Path to the working directory; `None` for a bare repository.
    pub fn working_directory(&self) -> Option<&Path> {
        self.inner.info.work_dir.as_deref()
    }

    // Forward a fallible operation onto the queue, mapping a closed queue
    // to `Released`.
    fn run<T, F>(&self, op: F) -> Result<T, RepoError>
    where
        T: Send + 'static,
        F: FnOnce(&RepoHandle) -> Result<T, RepoError> + Send + 'static,
    {
        self.inner.queue.run(move |handle| op(handle))?
    }

    async fn run_async<T, F>(&self, op: F) -> Result<T, RepoError>
    where
        T: Send + 'static,
        F: FnOnce(&RepoHandle) -> Result<T, RepoError> + Send + 'static,
    {
        self.inner.queue.run_async(move |handle| op(handle)).await?
    }

    // ============================================================
    // References
    // ============================================================

    /// Symbolic HEAD name, or the full commit SHA when detached. `None` for
    /// an unborn HEAD or a released repository.
    pub fn head(&self) -> Option<String> {
        self.run(|handle| handle.head()).ok().flatten()
    }

    /// Asynchronous [`head`](Self::head).
    pub async fn head_async(&self) -> Option<String> {
        self.run_async(|handle| handle.head()).await.ok().flatten()
    }

    /// Short branch name, or an abbreviated SHA when detached.
    pub fn short_head(&self) -> Option<String> {
        self.run(|handle| handle.short_head()).ok().flatten()
    }

    /// All references, partitioned into heads, remotes, and tags.
    pub fn references(&self) -> References {
        self.run(|handle| handle.references()).unwrap_or_default()
    }

    /// Full SHA the named reference points at, resolving short names.
    pub fn reference_target(&self, name: &str) -> Option<String> {
        let name = name.to_string();
        self.run(move |handle| handle.reference_target(&name))
            .ok()
            .flatten()
    }

    /// Long name of the current branch's remote-tracking branch.
    pub fn upstream_branch(&self) -> Option<String> {
        self.run(|handle| handle.upstream_branch()).ok().flatten()
    }

    /// Commits unique to `reference` (or HEAD's branch when `None`) vs. its
    /// upstream. Zeroes when the branch is unknown or has no upstream.
    pub fn ahead_behind_count(&self, reference: Option<&str>) -> AheadBehind {
        let reference = reference.map(str::to_string);
        self.run(move |handle| handle.ahead_behind(reference.as_deref()))
            .unwrap_or_default()
    }

    /// Asynchronous [`ahead_behind_count`](Self::ahead_behind_count).
    pub async fn ahead_behind_count_async(&self, reference: Option<&str>) -> AheadBehind {
        let reference = reference.map(str::to_string);
        self.run_async(move |handle| handle.ahead_behind(reference.as_deref()))
            .await
            .unwrap_or_default()
    }

    /// Number of commits reachable from `from` but not from `to`. Zero for
    /// malformed SHAs or unknown commits.
    pub fn commit_count(&self, from: &str, to: &str) -> usize {
        let from = from.to_string();
        let to = to.to_string();
        self.run(move |handle| handle.commit_count(&from, &to))
            .unwrap_or(0)
    }

    /// SHA of the nearest common ancestor of two commits.
    pub fn merge_base(&self, one: &str, two: &str) -> Option<String> {
        let one = one.to_string();
        let two = two.to_string();
        self.run(move |handle| handle.merge_base(&one, &two))
            .ok()
            .flatten()
    }

    // ============================================================
    // Status
    // ============================================================

    /// Status bitmask per changed path, untracked files included and
    /// untracked directories recursed into.
    pub fn status(&self) -> BTreeMap<String, Status> {
        self.run(|handle| handle.status_all()).unwrap_or_default()
    }

    /// Asynchronous [`status`](Self::status).
    pub async fn status_async(&self) -> BTreeMap<String, Status> {
        self.run_async(|handle| handle.status_all())
            .await
            .unwrap_or_default()
    }

    /// Statuses restricted to the given pathspecs. An empty slice yields an
    /// empty map; a single empty pathspec matches the whole tree.
    pub fn status_for_paths<S: AsRef<str>>(&self, paths: &[S]) -> BTreeMap<String, Status> {
        let paths: Vec<String> = paths.iter().map(|p| p.as_ref().to_string()).collect();
        self.run(move |handle| handle.status_for_pathspecs(&paths))
            .unwrap_or_default()
    }

    /// Asynchronous [`status_for_paths`](Self::status_for_paths).
    pub async fn status_for_paths_async<S: AsRef<str>>(
        &self,
        paths: &[S],
    ) -> BTreeMap<String, Status> {
        let paths: Vec<String> = paths.iter().map(|p| p.as_ref().to_string()).collect();
        self.run_async(move |handle| handle.status_for_pathspecs(&paths))
            .await
            .unwrap_or_default()
    }

    /// Status of a single path; the empty bitmask when the path is clean
    /// or unknown.
    pub fn status_of(&self, path: &str) -> Status {
        let path = path.to_string();
        self.run(move |handle| handle.status_file(&path))
            .unwrap_or(Status::empty())
    }

    /// Whether `path` is modified in the index or working tree.
    pub fn is_path_modified(&self, path: &str) -> bool {
        is_status_modified(self.status_of(path))
    }

    /// Whether `path` is newly added or untracked.
    pub fn is_path_new(&self, path: &str) -> bool {
        is_status_new(self.status_of(path))
    }

    /// Whether `path` is deleted in the index or working tree.
    pub fn is_path_deleted(&self, path: &str) -> bool {
        is_status_deleted(self.status_of(path))
    }

    /// Whether `path` has any staged change.
    pub fn is_path_staged(&self, path: &str) -> bool {
        is_status_staged(self.status_of(path))
    }

    /// Whether ignore rules exclude `path`.
    pub fn is_ignored(&self, path: &str) -> bool {
        let path = path.to_string();
        self.run(move |handle| handle.is_ignored(&path))
            .unwrap_or(false)
    }

    // ============================================================
    // Blobs & diffs
    // ============================================================

    /// UTF-8 content of the blob for `path` in the HEAD tree.
    pub fn head_blob(&self, path: &str) -> Option<String> {
        let path = path.to_string();
        self.run(move |handle| handle.head_blob(&path))
            .ok()
            .flatten()
    }

    /// UTF-8 content of the blob for `path` in the index.
    pub fn index_blob(&self, path: &str) -> Option<String> {
        let path = path.to_string();
        self.run(move |handle| handle.index_blob(&path))
            .ok()
            .flatten()
    }

    /// Added/deleted line counts for `path` against the HEAD tree. Zeroes
    /// when HEAD is missing, the path is untracked, or the diff does not
    /// collapse to a single delta.
    pub fn diff_stats(&self, path: &str) -> DiffStats {
        let path = path.to_string();
        self.run(move |handle| handle.diff_stats(&path))
            .unwrap_or_default()
    }

    /// Hunks between the stored blob for `path` and `text`. `None` when the
    /// compared source has no blob for the path.
    pub fn line_diffs(&self, path: &str, text: &str, options: &DiffOptions) -> Option<Vec<Hunk>> {
        let path = path.to_string();
        let text = text.to_string();
        let options = *options;
        self.run(move |handle| handle.line_diffs(&path, &text, &options))
            .ok()
            .flatten()
    }

    /// Per-line detail variant of [`line_diffs`](Self::line_diffs).
    pub fn line_diff_details(
        &self,
        path: &str,
        text: &str,
        options: &DiffOptions,
    ) -> Option<Vec<LineDiff>> {
        let path = path.to_string();
        let text = text.to_string();
        let options = *options;
        self.run(move |handle| handle.line_diff_details(&path, &text, &options))
            .ok()
            .flatten()
    }

    // ============================================================
    // Mutations
    // ============================================================

    /// Stage `path` into the index.
    ///
    /// The one fatal-input operation: a path absent from disk is an error
    /// rather than a quiet `false`.
    pub fn add(&self, path: &str) -> Result<(), RepoError> {
        let path = path.to_string();
        self.run(move |handle| handle.add(&path))
    }

    /// Check out the named reference, optionally creating it at HEAD when
    /// it does not exist. `false` on any failure, with HEAD unchanged.
    pub fn checkout_reference(&self, name: &str, create: bool) -> bool {
        let name = name.to_string();
        self.run(move |handle| Ok(handle.checkout_reference(&name, create)))
            .unwrap_or(false)
    }

    /// Force-restore a single path to its HEAD content. `false` when the
    /// path is empty or HEAD has no blob for it; no side effects then.
    pub fn checkout_head(&self, path: &str) -> bool {
        let path = path.to_string();
        self.run(move |handle| Ok(handle.checkout_head_path(&path)))
            .unwrap_or(false)
    }

    /// Re-read the on-disk index, so statuses reflect changes made by an
    /// external `git` invocation.
    pub fn refresh_index(&self) {
        let _ = self.run(|handle| handle.refresh_index());
    }

    // ============================================================
    // Configuration
    // ============================================================

    /// Value of a configuration key, if set.
    pub fn config_value(&self, key: &str) -> Option<String> {
        let key = key.to_string();
        self.run(move |handle| handle.config_value(&key))
            .ok()
            .flatten()
    }

    /// Set a configuration key in the repository-local configuration.
    pub fn set_config_value(&self, key: &str, value: &str) -> bool {
        let key = key.to_string();
        let value = value.to_string();
        self.run(move |handle| handle.set_config_value(&key, &value))
            .unwrap_or(false)
    }

    // ============================================================
    // Paths & submodules
    // ============================================================

    /// Relativize `path` against the working directory. Idempotent; the
    /// working directory itself relativizes to the empty string and paths
    /// outside it come back unchanged. On a bare repository every path is
    /// outside the (absent) working directory.
    pub fn relativize(&self, path: &str) -> String {
        match &self.inner.paths {
            Some(paths) => paths.relativize(path, self.case_insensitive_fs()),
            None => path.to_string(),
        }
    }

    /// Whether `path` names exactly the working directory. Always `false`
    /// on a bare repository.
    pub fn is_working_directory(&self, path: &str) -> bool {
        self.inner
            .paths
            .as_ref()
            .is_some_and(|paths| paths.is_working_directory(path, self.case_insensitive_fs()))
    }

    /// Whether path comparisons ignore ASCII case. Defaults to the
    /// conventional behavior of the build target's filesystem.
    pub fn case_insensitive_fs(&self) -> bool {
        self.inner.case_insensitive_fs.load(Ordering::Relaxed)
    }

    /// Override case sensitivity for path comparisons.
    pub fn set_case_insensitive_fs(&self, case_insensitive: bool) {
        self.inner
            .case_insensitive_fs
            .store(case_insensitive, Ordering::Relaxed);
    }

    /// Whether the index records `path` as a submodule (gitlink filemode).
    pub fn is_submodule(&self, path: &str) -> bool {
        let path = path.to_string();
        self.run(move |handle| handle.is_submodule(&path))
            .unwrap_or(false)
    }

    /// The submodule repository containing `path`, if any.
    ///
    /// Matches the longest registered submodule path that prefixes the
    /// relativized input. Opened submodules are cached and released
    /// together with this repository.
    pub fn submodule_for_path(&self, path: &str) -> Option<Repository> {
        let relative = self.relativize(path);
        let registered = self
            .run(|handle| handle.submodule_paths())
            .unwrap_or_default();
        let best = registered
            .into_iter()
            .filter(|sub| {
                relative == *sub
                    || (relative.len() > sub.len()
                        && relative.starts_with(sub.as_str())
                        && relative.as_bytes()[sub.len()] == b'/')
            })
            .max_by_key(String::len)?;

        let mut cache = self.inner.submodules.lock().ok()?;
        if let Some(cached) = cache.get(&best) {
            return Some(cached.clone());
        }
        let workdir = self.inner.info.work_dir.as_deref()?.join(&best);
        let submodule = Repository::open_with(&workdir, false)?;
        cache.insert(best, submodule.clone());
        Some(submodule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_fails_outside_any_repository() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Repository::open_with(dir.path(), false).is_none());
    }

    #[test]
    fn case_sensitivity_flag_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        git2::Repository::init(dir.path()).unwrap();
        let repo = Repository::open(dir.path()).unwrap();
        repo.set_case_insensitive_fs(true);
        assert!(repo.case_insensitive_fs());
        repo.set_case_insensitive_fs(false);
        assert!(!repo.case_insensitive_fs());
        repo.release();
    }

    #[test]
    fn queries_after_release_return_absent_values() {
        let dir = tempfile::tempdir().unwrap();
        git2::Repository::init(dir.path()).unwrap();
        let repo = Repository::open(dir.path()).unwrap();
        repo.release();
        assert_eq!(repo.head(), None);
        assert!(repo.status().is_empty());
        assert_eq!(repo.ahead_behind_count(None), AheadBehind::default());
        assert!(!repo.checkout_reference("refs/heads/master", false));
        assert!(matches!(repo.add("a.txt"), Err(RepoError::Released)));
    }
}
