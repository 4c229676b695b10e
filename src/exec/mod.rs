//! exec
//!
//! The per-repository operation queue.
//!
//! # Architecture
//!
//! Every repository owns exactly one [`OpQueue`]: a worker thread holding the
//! native handle, fed by an unbounded FIFO channel. All repository reads and
//! writes flow through this queue; no other component may touch the handle.
//!
//! Two submission modes exist over the single queue:
//!
//! - [`OpQueue::run`] blocks the calling thread until its turn completes
//! - [`OpQueue::run_async`] returns immediately; the result is awaited
//!
//! Both modes enqueue the same kind of work item, so ordering is strict
//! submission order regardless of how the caller waits.
//!
//! # Invariants
//!
//! - Work items execute one at a time, in submission order
//! - Items are never cancelled: once enqueued, an item runs unless the
//!   queue is closed before its turn (in which case the submitter observes
//!   [`QueueClosed`])
//! - Queues of distinct repositories are fully independent

mod queue;

pub use queue::{OpQueue, QueueClosed};
