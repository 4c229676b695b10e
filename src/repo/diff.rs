//! repo::diff
//!
//! Line-level diffs between a candidate text buffer and a stored blob, plus
//! aggregate diff stats against the HEAD tree.
//!
//! All diffs run with zero context lines, so every hunk covers exactly one
//! contiguous change region and every reported line is a change (or an
//! end-of-file terminator marker, which libgit2 emits alongside the last
//! line when one side lacks a trailing newline).

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::RepoError;
use super::handle::RepoHandle;

/// One contiguous change region between two text versions.
///
/// Hunks are ordered by ascending `old_start`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hunk {
    /// First line of the region on the old side (1-based).
    pub old_start: u32,
    /// Number of old-side lines in the region.
    pub old_lines: u32,
    /// First line of the region on the new side (1-based).
    pub new_start: u32,
    /// Number of new-side lines in the region.
    pub new_lines: u32,
}

/// A single changed line.
///
/// A line that exists only on the old side carries a valid
/// `old_line_number` and `-1` for `new_line_number`, and vice versa.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineDiff {
    /// 1-based old-side line number, or -1 when absent on that side.
    pub old_line_number: i32,
    /// 1-based new-side line number, or -1 when absent on that side.
    pub new_line_number: i32,
    /// Line content, including its original terminator.
    pub line: String,
}

/// Aggregate added/deleted line counts for one path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffStats {
    /// Lines present in the working tree but not in HEAD.
    pub added: usize,
    /// Lines present in HEAD but not in the working tree.
    pub deleted: usize,
}

/// Options for line-level diffs.
///
/// The whitespace flags are independent and combine freely;
/// `ignore_all_space` is strictly more permissive than
/// `ignore_space_change`, which is strictly more permissive than
/// `ignore_eol_whitespace`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffOptions {
    /// Ignore whitespace differences at end of line.
    pub ignore_eol_whitespace: bool,
    /// Collapse whitespace runs before comparing.
    pub ignore_space_change: bool,
    /// Ignore all whitespace, including leading.
    pub ignore_all_space: bool,
    /// Compare against the index blob instead of the HEAD blob.
    pub use_index: bool,
}

impl DiffOptions {
    fn to_git2(self) -> git2::DiffOptions {
        let mut options = git2::DiffOptions::new();
        options.context_lines(0);
        if self.ignore_eol_whitespace {
            options.ignore_whitespace_eol(true);
        }
        if self.ignore_space_change {
            options.ignore_whitespace_change(true);
        }
        if self.ignore_all_space {
            options.ignore_whitespace(true);
        }
        options
    }
}

impl RepoHandle {
    /// Hunks between the stored blob for `path` and `text`.
    ///
    /// Returns `Ok(None)` when the compared source (HEAD tree, or the index
    /// with `use_index`) has no blob for `path`; an unchanged buffer yields
    /// `Ok(Some(vec![]))`.
    pub fn line_diffs(
        &self,
        path: &str,
        text: &str,
        options: &DiffOptions,
    ) -> Result<Option<Vec<Hunk>>, RepoError> {
        let Some(blob) = self.blob_for(path, options.use_index)? else {
            return Ok(None);
        };
        let mut git_options = options.to_git2();
        let mut hunks = Vec::new();
        let patch = git2::Patch::from_blob_and_buffer(
            &blob,
            Some(Path::new(path)),
            text.as_bytes(),
            Some(Path::new(path)),
            Some(&mut git_options),
        )?;
        for index in 0..patch.num_hunks() {
            let (hunk, _lines) = patch.hunk(index)?;
            hunks.push(Hunk {
                old_start: hunk.old_start(),
                old_lines: hunk.old_lines(),
                new_start: hunk.new_start(),
                new_lines: hunk.new_lines(),
            });
        }
        Ok(Some(hunks))
    }

    /// Every individual changed line between the stored blob for `path`
    /// and `text`, in diff order.
    pub fn line_diff_details(
        &self,
        path: &str,
        text: &str,
        options: &DiffOptions,
    ) -> Result<Option<Vec<LineDiff>>, RepoError> {
        let Some(blob) = self.blob_for(path, options.use_index)? else {
            return Ok(None);
        };
        let mut git_options = options.to_git2();
        let mut lines = Vec::new();
        let patch = git2::Patch::from_blob_and_buffer(
            &blob,
            Some(Path::new(path)),
            text.as_bytes(),
            Some(Path::new(path)),
            Some(&mut git_options),
        )?;
        for hunk_index in 0..patch.num_hunks() {
            for line_index in 0..patch.num_lines_in_hunk(hunk_index)? {
                let line = patch.line_in_hunk(hunk_index, line_index)?;
                if line.origin() != '+' && line.origin() != '-' {
                    continue;
                }
                lines.push(LineDiff {
                    old_line_number: line.old_lineno().map_or(-1, |n| n as i32),
                    new_line_number: line.new_lineno().map_or(-1, |n| n as i32),
                    line: String::from_utf8_lossy(line.content()).into_owned(),
                });
            }
        }
        Ok(Some(lines))
    }

    /// Aggregate added/deleted counts for `path` between the HEAD tree and
    /// the working tree.
    ///
    /// `{0, 0}` when HEAD has no commits, the path is new (no prior version
    /// to compare), or the diff does not resolve to exactly one delta.
    pub fn diff_stats(&self, path: &str) -> Result<DiffStats, RepoError> {
        let Some(tree) = self.head_tree()? else {
            return Ok(DiffStats::default());
        };
        let mut options = git2::DiffOptions::new();
        options
            .pathspec(path)
            .disable_pathspec_match(true)
            .context_lines(0);
        let diff = self
            .repo()
            .diff_tree_to_workdir(Some(&tree), Some(&mut options))?;
        if diff.deltas().len() != 1 {
            return Ok(DiffStats::default());
        }
        let Some(patch) = git2::Patch::from_diff(&diff, 0)? else {
            return Ok(DiffStats::default());
        };
        let (_context, added, deleted) = patch.line_stats()?;
        Ok(DiffStats { added, deleted })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_default_to_plain_comparison() {
        let options = DiffOptions::default();
        assert!(!options.ignore_eol_whitespace);
        assert!(!options.ignore_space_change);
        assert!(!options.ignore_all_space);
        assert!(!options.use_index);
    }

    #[test]
    fn stats_default_to_zero() {
        let stats = DiffStats::default();
        assert_eq!(stats, DiffStats { added: 0, deleted: 0 });
    }
}
