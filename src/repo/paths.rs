//! repo::paths
//!
//! Working-directory path normalization.
//!
//! Filesystem-reported paths may be differently cased than the working
//! directory the caller knows, or reach it through a symlink. Relativization
//! therefore compares against both the configured working directory and its
//! symlink-resolved real path, with case sensitivity controlled by an
//! explicit caller-set flag, never runtime auto-detection.
//!
//! All comparisons run on forward-slash-normalized strings. Relativized
//! results are forward-slash separated with no leading separator; paths
//! that do not match keep the caller's original spelling.

use std::path::Path;

/// Path normalization context for one repository's working directory.
///
/// Pure string/path logic: this type never touches the native handle and
/// runs on the caller's thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkdirPaths {
    working_directory: String,
    real_working_directory: Option<String>,
}

fn slashify(path: &str) -> String {
    path.replace('\\', "/")
}

fn trim_trailing_slash(path: &str) -> &str {
    if path.len() > 1 {
        path.trim_end_matches('/')
    } else {
        path
    }
}

fn segments_equal(a: &str, b: &str, case_insensitive: bool) -> bool {
    if case_insensitive {
        a.eq_ignore_ascii_case(b)
    } else {
        a == b
    }
}

/// Strip `prefix` (a directory path) from `path`; `None` when `path` is
/// neither `prefix` itself nor beneath it.
fn strip_dir_prefix(path: &str, prefix: &str, case_insensitive: bool) -> Option<String> {
    if segments_equal(path, prefix, case_insensitive) {
        return Some(String::new());
    }
    if path.len() > prefix.len()
        && segments_equal(&path[..prefix.len()], prefix, case_insensitive)
        && path.as_bytes()[prefix.len()] == b'/'
    {
        return Some(path[prefix.len() + 1..].to_string());
    }
    None
}

impl WorkdirPaths {
    /// Capture the working directory and, when it differs, its
    /// symlink-resolved real path.
    pub fn new(working_directory: &Path) -> Self {
        let configured = slashify(&working_directory.to_string_lossy());
        let configured = trim_trailing_slash(&configured).to_string();
        let real = std::fs::canonicalize(working_directory)
            .ok()
            .map(|real| trim_trailing_slash(&slashify(&real.to_string_lossy())).to_string())
            .filter(|real| *real != configured);
        Self {
            working_directory: configured,
            real_working_directory: real,
        }
    }

    /// The configured working directory, forward-slash separated.
    pub fn working_directory(&self) -> &str {
        &self.working_directory
    }

    /// Relativize `path` against the working directory.
    ///
    /// Tries the configured working directory first, then its real path.
    /// Paths outside both (and already-relative paths) come back exactly as
    /// given, which makes relativization idempotent; the working directory
    /// itself and the empty string relativize to the empty string.
    pub fn relativize(&self, path: &str, case_insensitive: bool) -> String {
        if path.is_empty() {
            return String::new();
        }
        let normalized = slashify(path);
        let normalized = trim_trailing_slash(&normalized);
        if let Some(relative) =
            strip_dir_prefix(normalized, &self.working_directory, case_insensitive)
        {
            return relative;
        }
        if let Some(real) = &self.real_working_directory {
            if let Some(relative) = strip_dir_prefix(normalized, real, case_insensitive) {
                return relative;
            }
        }
        // Normalization is only for prefix matching; a path that is not
        // under the working directory is the caller's string, untouched.
        path.to_string()
    }

    /// Whether `path` names exactly the working directory.
    ///
    /// The empty string is never the working directory.
    pub fn is_working_directory(&self, path: &str, case_insensitive: bool) -> bool {
        if path.is_empty() {
            return false;
        }
        let normalized = slashify(path);
        let normalized = trim_trailing_slash(&normalized);
        segments_equal(normalized, &self.working_directory, case_insensitive)
    }
}
