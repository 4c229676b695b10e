//! repo::status
//!
//! Per-path status bitmasks and ignore-rule evaluation.
//!
//! # Bit assignment
//!
//! The public bitmask is [`git2::Status`], i.e. libgit2's enumeration:
//!
//! - `INDEX_NEW = 1<<0`, `INDEX_MODIFIED = 1<<1`, `INDEX_DELETED = 1<<2`,
//!   `INDEX_RENAMED = 1<<3`, `INDEX_TYPECHANGE = 1<<4`
//! - `WT_NEW = 1<<7`, `WT_MODIFIED = 1<<8`, `WT_DELETED = 1<<9`,
//!   `WT_TYPECHANGE = 1<<10`, `WT_RENAMED = 1<<11`
//! - `IGNORED = 1<<14`, `CONFLICTED = 1<<15`
//!
//! Bits combine freely: a path can be staged-new and unstaged-modified at
//! once. Callers test membership through the named predicates below, never
//! raw bit literals.

use std::collections::BTreeMap;
use std::path::Path;

use super::error::RepoError;
use super::handle::RepoHandle;

pub use git2::Status;

fn modified_mask() -> Status {
    Status::INDEX_MODIFIED
        | Status::INDEX_DELETED
        | Status::INDEX_TYPECHANGE
        | Status::WT_MODIFIED
        | Status::WT_DELETED
        | Status::WT_TYPECHANGE
}

fn new_mask() -> Status {
    Status::INDEX_NEW | Status::WT_NEW
}

fn deleted_mask() -> Status {
    Status::INDEX_DELETED | Status::WT_DELETED
}

fn staged_mask() -> Status {
    Status::INDEX_NEW
        | Status::INDEX_MODIFIED
        | Status::INDEX_DELETED
        | Status::INDEX_RENAMED
        | Status::INDEX_TYPECHANGE
}

/// Whether the status signals a content change (modified, deleted, or
/// type-changed, staged or not).
pub fn is_status_modified(status: Status) -> bool {
    status.intersects(modified_mask())
}

/// Whether the status signals a path absent from HEAD (staged or not).
pub fn is_status_new(status: Status) -> bool {
    status.intersects(new_mask())
}

/// Whether the status signals a deletion (staged or not).
pub fn is_status_deleted(status: Status) -> bool {
    status.intersects(deleted_mask())
}

/// Whether any change for the path has been staged into the index.
pub fn is_status_staged(status: Status) -> bool {
    status.intersects(staged_mask())
}

/// Whether the path is ignored by the repository's ignore rules.
pub fn is_status_ignored(status: Status) -> bool {
    status.intersects(Status::IGNORED)
}

impl RepoHandle {
    /// Status of every modified path, untracked files included (and
    /// untracked directories recursed into).
    pub fn status_all(&self) -> Result<BTreeMap<String, Status>, RepoError> {
        let mut options = git2::StatusOptions::new();
        options.include_untracked(true).recurse_untracked_dirs(true);
        self.collect_statuses(&mut options)
    }

    /// Status restricted to paths matching the given pathspecs.
    ///
    /// An empty pathspec list yields an empty result, not "all paths". A
    /// single empty-string pathspec matches the working-directory root and
    /// therefore everything beneath it.
    pub fn status_for_pathspecs(
        &self,
        pathspecs: &[String],
    ) -> Result<BTreeMap<String, Status>, RepoError> {
        if pathspecs.is_empty() {
            return Ok(BTreeMap::new());
        }
        let mut options = git2::StatusOptions::new();
        options.include_untracked(true).recurse_untracked_dirs(true);
        for pathspec in pathspecs {
            options.pathspec(pathspec);
        }
        self.collect_statuses(&mut options)
    }

    fn collect_statuses(
        &self,
        options: &mut git2::StatusOptions,
    ) -> Result<BTreeMap<String, Status>, RepoError> {
        let statuses = self.repo().statuses(Some(options))?;
        let mut result = BTreeMap::new();
        for entry in statuses.iter() {
            let Some(path) = entry.path() else {
                continue; // Skip non-UTF8 paths
            };
            result.insert(path.to_string(), entry.status());
        }
        Ok(result)
    }

    /// Status bitmask of a single path; empty when the path is unchanged
    /// or unknown.
    pub fn status_file(&self, path: &str) -> Result<Status, RepoError> {
        match self.repo().status_file(Path::new(path)) {
            Ok(status) => Ok(status),
            Err(_) => Ok(Status::empty()),
        }
    }

    /// Whether `path` matches the repository's ignore rules (including
    /// nested ignore files and `.git/info/exclude`).
    pub fn is_ignored(&self, path: &str) -> Result<bool, RepoError> {
        Ok(self.repo().is_path_ignored(Path::new(path)).unwrap_or(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bit_positions_match_documented_enumeration() {
        assert_eq!(Status::INDEX_NEW.bits(), 1 << 0);
        assert_eq!(Status::WT_NEW.bits(), 1 << 7);
        assert_eq!(Status::WT_MODIFIED.bits(), 1 << 8);
        assert_eq!(Status::WT_DELETED.bits(), 1 << 9);
        assert_eq!(Status::IGNORED.bits(), 1 << 14);
        assert_eq!(Status::CONFLICTED.bits(), 1 << 15);
    }

    #[test]
    fn deleted_counts_as_modified() {
        assert!(is_status_modified(Status::WT_DELETED));
        assert!(is_status_deleted(Status::WT_DELETED));
        assert!(!is_status_new(Status::WT_DELETED));
    }

    #[test]
    fn untracked_is_new_not_modified() {
        assert!(is_status_new(Status::WT_NEW));
        assert!(!is_status_modified(Status::WT_NEW));
        assert!(!is_status_staged(Status::WT_NEW));
    }

    #[test]
    fn staged_variants() {
        assert!(is_status_staged(Status::INDEX_NEW));
        assert!(is_status_staged(Status::INDEX_DELETED));
        assert!(!is_status_staged(Status::WT_MODIFIED));
    }

    #[test]
    fn bits_are_not_mutually_exclusive() {
        let status = Status::INDEX_NEW | Status::WT_MODIFIED;
        assert!(is_status_new(status));
        assert!(is_status_modified(status));
        assert!(is_status_staged(status));
    }

    #[test]
    fn ignored_predicate() {
        assert!(is_status_ignored(Status::IGNORED));
        assert!(!is_status_ignored(Status::empty()));
    }
}
