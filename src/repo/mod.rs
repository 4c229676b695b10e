//! repo
//!
//! The repository handle, its engines, and the public facade.
//!
//! # Architecture
//!
//! [`handle::RepoHandle`] is the **single doorway** to libgit2. It owns the
//! `git2::Repository` and is only ever driven from inside a queued work item
//! (see [`crate::exec`]). The engines are `impl RepoHandle` blocks split by
//! concern:
//!
//! - [`refs`] - HEAD, reference enumeration, targets, upstream, ahead/behind
//! - [`status`] - per-path status bitmasks and ignore rules
//! - [`diff`] - line-level diffs and aggregate diff stats
//! - [`checkout`] - reference checkout and single-path restore
//! - [`config`] - scalar configuration reads and writes
//!
//! [`paths::WorkdirPaths`] is pure path logic and runs on the caller's
//! thread; it never touches the handle. [`facade::Repository`] composes all
//! of the above and is the only type callers interact with.

pub mod checkout;
pub mod config;
pub mod diff;
pub mod error;
pub mod facade;
pub mod handle;
pub mod paths;
pub mod refs;
pub mod status;
