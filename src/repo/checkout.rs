//! repo::checkout
//!
//! Reference checkout (with optional branch creation) and single-path
//! restore from HEAD.
//!
//! Reference checkout uses the safe strategy: it refuses to overwrite
//! tracked-but-uncommitted working-tree changes and reports the refusal as
//! `false` with HEAD left unchanged. Untracked files never block. Path
//! restore uses the force strategy with pathspec matching disabled, so the
//! argument names exactly one path rather than a pattern.

use super::handle::RepoHandle;

fn long_ref_name(name: &str) -> String {
    if name.starts_with("refs/") {
        name.to_string()
    } else {
        format!("refs/heads/{name}")
    }
}

impl RepoHandle {
    /// Check out `name` (short or fully qualified).
    ///
    /// When the reference does not exist locally and `create` is set, the
    /// branch is created at the current HEAD first, unless `name` is not a
    /// well-formed reference name, in which case nothing happens. Returns
    /// `false` on any refusal, leaving HEAD unchanged.
    pub fn checkout_reference(&self, name: &str, create: bool) -> bool {
        let long = long_ref_name(name);
        if self.checkout_existing(&long) {
            return true;
        }
        if !create {
            return false;
        }
        if !git2::Reference::is_valid_name(&long) {
            return false;
        }
        let Ok(head) = self.repo().head() else {
            return false;
        };
        let Ok(commit) = head.peel_to_commit() else {
            return false;
        };
        let Some(short) = long.strip_prefix("refs/heads/") else {
            return false;
        };
        if self.repo().branch(short, &commit, false).is_err() {
            return false;
        }
        self.checkout_existing(&long)
    }

    /// Look up an existing reference, check its tree out safely, and move
    /// HEAD. Any failure (missing ref, dirty-tree conflict) is a refusal.
    fn checkout_existing(&self, long: &str) -> bool {
        let Ok(reference) = self.repo().find_reference(long) else {
            return false;
        };
        let Ok(tree) = reference.peel(git2::ObjectType::Tree) else {
            return false;
        };
        let mut builder = git2::build::CheckoutBuilder::new();
        builder.safe();
        if self.repo().checkout_tree(&tree, Some(&mut builder)).is_err() {
            return false;
        }
        self.repo().set_head(long).is_ok()
    }

    /// Restore one path's working-tree contents to its HEAD-blob contents.
    ///
    /// Returns `false` without side effects for an empty path or a path
    /// with no blob in the HEAD tree.
    pub fn checkout_head_path(&self, path: &str) -> bool {
        if path.is_empty() {
            return false;
        }
        // A path absent from HEAD must be a no-op, not a tree-wide restore.
        match self.blob_for(path, false) {
            Ok(Some(_)) => {}
            _ => return false,
        }
        let mut builder = git2::build::CheckoutBuilder::new();
        builder.force().disable_pathspec_match(true).path(path);
        self.repo().checkout_head(Some(&mut builder)).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_names_qualify_under_heads() {
        assert_eq!(long_ref_name("feature"), "refs/heads/feature");
        assert_eq!(long_ref_name("refs/heads/feature"), "refs/heads/feature");
        assert_eq!(long_ref_name("refs/tags/v1.0"), "refs/tags/v1.0");
    }

    #[test]
    fn malformed_names_are_rejected_by_validation() {
        assert!(!git2::Reference::is_valid_name("refs/heads/inv@{id"));
        assert!(!git2::Reference::is_valid_name("refs/heads/a..b"));
        assert!(git2::Reference::is_valid_name("refs/heads/bananas"));
    }
}
