//! repo::refs
//!
//! Reference resolution: HEAD, enumeration, targets, upstream tracking, and
//! ahead/behind counts.
//!
//! # Invariants
//!
//! - HEAD is either symbolic (a branch name) or detached (a full SHA-1)
//! - Reference enumeration preserves the reference database's observed
//!   order within each category
//! - Ahead/behind is `{0, 0}` for unknown refs or a missing upstream,
//!   never an error

use serde::{Deserialize, Serialize};

use super::error::RepoError;
use super::handle::RepoHandle;

/// All references, partitioned by namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct References {
    /// `refs/heads/...`
    pub heads: Vec<String>,
    /// `refs/remotes/...`
    pub remotes: Vec<String>,
    /// `refs/tags/...`
    pub tags: Vec<String>,
}

/// Commit counts unique to a branch vs. its upstream, in each direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AheadBehind {
    /// Commits reachable from the local branch but not its upstream.
    pub ahead: usize,
    /// Commits reachable from the upstream but not the local branch.
    pub behind: usize,
}

impl RepoHandle {
    /// The checked-out reference name, or the full SHA-1 when HEAD is
    /// detached, or `None` when the repository has no commits.
    pub fn head(&self) -> Result<Option<String>, RepoError> {
        let head = match self.repo().head() {
            Ok(head) => head,
            Err(_) => return Ok(None),
        };
        if self.repo().head_detached()? {
            if let Some(oid) = head.target() {
                return Ok(Some(oid.to_string()));
            }
        }
        Ok(head.name().map(String::from))
    }

    /// The branch's short name, or a uniquely-abbreviated SHA-1 (at least
    /// seven characters) when HEAD is detached.
    pub fn short_head(&self) -> Result<Option<String>, RepoError> {
        let head = match self.repo().head() {
            Ok(head) => head,
            Err(_) => return Ok(None),
        };
        if self.repo().head_detached()? {
            if let Some(oid) = head.target() {
                let abbreviated = self
                    .repo()
                    .find_object(oid, None)
                    .and_then(|object| object.short_id())
                    .ok()
                    .and_then(|buf| buf.as_str().map(String::from))
                    .unwrap_or_else(|| {
                        let mut full = oid.to_string();
                        full.truncate(7);
                        full
                    });
                return Ok(Some(abbreviated));
            }
        }
        Ok(head.shorthand().map(String::from))
    }

    /// Every reference, partitioned into heads, remotes, and tags.
    pub fn references(&self) -> Result<References, RepoError> {
        let mut result = References::default();
        for reference in self.repo().references()? {
            let reference = reference?;
            let Some(name) = reference.name() else {
                continue; // Skip refs with non-UTF8 names
            };
            if name.starts_with("refs/heads/") {
                result.heads.push(name.to_string());
            } else if name.starts_with("refs/remotes/") {
                result.remotes.push(name.to_string());
            } else if name.starts_with("refs/tags/") {
                result.tags.push(name.to_string());
            }
        }
        Ok(result)
    }

    /// Resolve a short or long reference name (including `HEAD`) to its
    /// target SHA-1.
    pub fn reference_target(&self, name: &str) -> Result<Option<String>, RepoError> {
        if let Ok(oid) = self.repo().refname_to_id(name) {
            return Ok(Some(oid.to_string()));
        }
        match self.repo().resolve_reference_from_short_name(name) {
            Ok(reference) => Ok(reference.target().map(|oid| oid.to_string())),
            Err(_) => Ok(None),
        }
    }

    /// The long name of the current branch's configured upstream tracking
    /// branch, or `None` when HEAD is detached or no upstream is set.
    pub fn upstream_branch(&self) -> Result<Option<String>, RepoError> {
        let head = match self.repo().head() {
            Ok(head) => head,
            Err(_) => return Ok(None),
        };
        if !head.is_branch() {
            return Ok(None);
        }
        let Some(short) = head.shorthand() else {
            return Ok(None);
        };
        let Ok(branch) = self.repo().find_branch(short, git2::BranchType::Local) else {
            return Ok(None);
        };
        match branch.upstream() {
            Ok(upstream) => Ok(upstream.get().name().map(String::from)),
            Err(_) => Ok(None),
        }
    }

    /// Commits unique to `reference` (default: the current branch) and to
    /// its configured upstream. Unknown or empty references and branches
    /// without an upstream count as `{0, 0}`.
    pub fn ahead_behind(&self, reference: Option<&str>) -> Result<AheadBehind, RepoError> {
        let short = match reference {
            Some("") => return Ok(AheadBehind::default()),
            Some(name) => name.strip_prefix("refs/heads/").unwrap_or(name).to_string(),
            None => {
                let head = match self.repo().head() {
                    Ok(head) => head,
                    Err(_) => return Ok(AheadBehind::default()),
                };
                match head.shorthand() {
                    Some(short) if head.is_branch() => short.to_string(),
                    _ => return Ok(AheadBehind::default()),
                }
            }
        };

        let Ok(branch) = self.repo().find_branch(&short, git2::BranchType::Local) else {
            return Ok(AheadBehind::default());
        };
        let Ok(upstream) = branch.upstream() else {
            return Ok(AheadBehind::default());
        };
        let (Some(local_oid), Some(upstream_oid)) =
            (branch.get().target(), upstream.get().target())
        else {
            return Ok(AheadBehind::default());
        };

        let (ahead, behind) = self.repo().graph_ahead_behind(local_oid, upstream_oid)?;
        Ok(AheadBehind { ahead, behind })
    }

    /// Number of commits reachable from `from` but not from `to`.
    ///
    /// Malformed SHAs and unknown commits count as zero.
    pub fn commit_count(&self, from: &str, to: &str) -> Result<usize, RepoError> {
        let (Ok(from), Ok(to)) = (git2::Oid::from_str(from), git2::Oid::from_str(to)) else {
            return Ok(0);
        };
        let mut walk = self.repo().revwalk()?;
        if walk.push(from).is_err() {
            return Ok(0);
        }
        let _ = walk.hide(to);
        Ok(walk.take_while(Result::is_ok).count())
    }

    /// SHA-1 of the nearest common ancestor of two commits, or `None` when
    /// either SHA is malformed or no common ancestor exists.
    pub fn merge_base(&self, one: &str, two: &str) -> Result<Option<String>, RepoError> {
        let (Ok(one), Ok(two)) = (git2::Oid::from_str(one), git2::Oid::from_str(two)) else {
            return Ok(None);
        };
        Ok(self
            .repo()
            .merge_base(one, two)
            .ok()
            .map(|oid| oid.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ahead_behind_default_is_zero() {
        let counts = AheadBehind::default();
        assert_eq!(counts.ahead, 0);
        assert_eq!(counts.behind, 0);
    }

    #[test]
    fn references_default_is_empty() {
        let refs = References::default();
        assert!(refs.heads.is_empty());
        assert!(refs.remotes.is_empty());
        assert!(refs.tags.is_empty());
    }
}
