//! gitgate - a concurrency-safe facade over a local git repository
//!
//! gitgate opens a repository, resolves references, computes
//! working-tree/index/HEAD status, produces line-level diffs, and performs a
//! narrow set of local mutations (staging, checkout), while serializing all
//! access to the underlying libgit2 handle, which is not safe for concurrent
//! use.
//!
//! # Architecture
//!
//! The codebase follows a strict layered architecture:
//!
//! - [`exec`] - The per-repository operation queue. One worker thread owns
//!   the native handle; synchronous and asynchronous callers feed the same
//!   FIFO queue.
//! - [`repo`] - The repository handle and its engines (references, status,
//!   diff, checkout, config, path normalization), plus the public
//!   [`Repository`] facade.
//!
//! # Correctness Invariants
//!
//! 1. No two operations ever touch the native handle concurrently
//! 2. Operations against one repository execute in strict submission order
//! 3. Distinct repositories share no state and never block each other
//! 4. Mutations either fully apply or fully no-op
//!
//! # Example
//!
//! ```ignore
//! use gitgate::Repository;
//!
//! let repo = Repository::open(".").expect("not a repository");
//! println!("HEAD: {:?}", repo.head());
//! for (path, status) in repo.status() {
//!     if gitgate::is_status_modified(status) {
//!         println!("modified: {path}");
//!     }
//! }
//! repo.release();
//! ```

pub mod exec;
pub mod repo;

pub use repo::diff::{DiffOptions, DiffStats, Hunk, LineDiff};
pub use repo::error::RepoError;
pub use repo::facade::Repository;
pub use repo::refs::{AheadBehind, References};
pub use repo::status::{
    is_status_deleted, is_status_ignored, is_status_modified, is_status_new, is_status_staged,
    Status,
};
