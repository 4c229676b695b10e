//! repo::error
//!
//! Typed failure categories for repository operations.
//!
//! The facade flattens most of these into absent values (`None`, empty maps)
//! or `false` per its contract; only staging ([`crate::Repository::add`])
//! and released-repository submissions surface an error to the caller.

use thiserror::Error;

/// Errors from repository operations.
#[derive(Debug, Error)]
pub enum RepoError {
    /// The repository has been released; its queue no longer services work.
    #[error("repository has been released")]
    Released,

    /// The operation needs a working tree and the repository is bare.
    #[error("repository has no working tree")]
    Bare,

    /// A path that must exist on disk does not.
    #[error("path does not exist on disk: {path}")]
    PathNotFound {
        /// The working-directory-relative path
        path: String,
    },

    /// Internal libgit2 error.
    #[error("git error: {0}")]
    Git(#[from] git2::Error),
}

impl From<crate::exec::QueueClosed> for RepoError {
    fn from(_: crate::exec::QueueClosed) -> Self {
        RepoError::Released
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formatting() {
        assert_eq!(RepoError::Released.to_string(), "repository has been released");
        let err = RepoError::PathNotFound {
            path: "missing.txt".to_string(),
        };
        assert!(err.to_string().contains("missing.txt"));
    }

    #[test]
    fn queue_closed_maps_to_released() {
        let err: RepoError = crate::exec::QueueClosed.into();
        assert!(matches!(err, RepoError::Released));
    }
}
