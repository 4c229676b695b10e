//! exec::queue
//!
//! FIFO execution queue wrapping a non-reentrant state value.
//!
//! The queue spawns one worker thread that takes exclusive ownership of the
//! state. Callers submit `FnOnce(&mut S)` closures; the worker runs them in
//! strict submission order. Completion is delivered through a per-item
//! channel: a blocking rendezvous for [`OpQueue::run`], a oneshot future for
//! [`OpQueue::run_async`].

use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender};
use thiserror::Error;

/// The queue has been closed and can no longer service work.
///
/// Returned when submitting to a closed queue, or when an item was still
/// pending at the moment the queue shut down.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("operation queue is closed")]
pub struct QueueClosed;

type Job<S> = Box<dyn FnOnce(&mut S) + Send>;

enum Command<S> {
    Run(Job<S>),
    Shutdown,
}

/// A FIFO execution queue owning a state value on a dedicated thread.
///
/// Cloning the queue yields another submission handle onto the same worker;
/// all clones share one strict submission order.
pub struct OpQueue<S> {
    tx: Sender<Command<S>>,
}

impl<S> Clone for OpQueue<S> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<S> std::fmt::Debug for OpQueue<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpQueue")
            .field("pending", &self.tx.len())
            .finish()
    }
}

impl<S: Send + 'static> OpQueue<S> {
    /// Spawn the worker thread and hand it ownership of `state`.
    ///
    /// Returns the submission handle and the worker's join handle, or the
    /// OS error if the thread could not be spawned. The worker runs until
    /// [`OpQueue::close`] is processed or every submission handle is
    /// dropped.
    pub fn spawn(name: &str, state: S) -> std::io::Result<(Self, JoinHandle<()>)> {
        let (tx, rx) = crossbeam_channel::unbounded::<Command<S>>();
        let builder = thread::Builder::new().name(name.to_string());
        let handle = builder.spawn(move || Self::worker(rx, state))?;
        Ok((Self { tx }, handle))
    }

    fn worker(rx: Receiver<Command<S>>, mut state: S) {
        tracing::debug!(thread = ?thread::current().name(), "operation queue started");
        let mut served = 0usize;
        while let Ok(command) = rx.recv() {
            match command {
                Command::Run(job) => {
                    job(&mut state);
                    served += 1;
                }
                Command::Shutdown => break,
            }
        }
        // Dropping the receiver drops any still-queued jobs; their
        // completion channels close and submitters observe QueueClosed.
        drop(rx);
        drop(state);
        tracing::debug!(served, "operation queue stopped");
    }

    /// Enqueue `op` and block the calling thread until it has run.
    ///
    /// Equivalent to immediate execution when the queue is empty, but
    /// strictly ordered after every earlier-submitted item.
    pub fn run<T, F>(&self, op: F) -> Result<T, QueueClosed>
    where
        T: Send + 'static,
        F: FnOnce(&mut S) -> T + Send + 'static,
    {
        let (done_tx, done_rx) = std::sync::mpsc::sync_channel(1);
        let job: Job<S> = Box::new(move |state| {
            let _ = done_tx.send(op(state));
        });
        self.tx.send(Command::Run(job)).map_err(|_| QueueClosed)?;
        done_rx.recv().map_err(|_| QueueClosed)
    }

    /// Enqueue `op` and resolve the result once its turn completes.
    ///
    /// Never blocks the caller; the returned future is pending until the
    /// worker reaches this item.
    pub async fn run_async<T, F>(&self, op: F) -> Result<T, QueueClosed>
    where
        T: Send + 'static,
        F: FnOnce(&mut S) -> T + Send + 'static,
    {
        let (done_tx, done_rx) = tokio::sync::oneshot::channel();
        let job: Job<S> = Box::new(move |state| {
            let _ = done_tx.send(op(state));
        });
        self.tx.send(Command::Run(job)).map_err(|_| QueueClosed)?;
        done_rx.await.map_err(|_| QueueClosed)
    }

    /// Close the queue.
    ///
    /// Items submitted before the close still run; items submitted after it
    /// fail with [`QueueClosed`]. Idempotent.
    pub fn close(&self) {
        let _ = self.tx.send(Command::Shutdown);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runs_in_submission_order() {
        let (queue, worker) = OpQueue::spawn("test-order", Vec::<usize>::new()).unwrap();

        for i in 0..100 {
            queue.run(move |log| log.push(i)).unwrap();
        }
        let log = queue.run(|log| log.clone()).unwrap();
        assert_eq!(log, (0..100).collect::<Vec<_>>());

        queue.close();
        worker.join().unwrap();
    }

    #[test]
    fn sync_result_round_trips() {
        let (queue, worker) = OpQueue::spawn("test-sync", 41u32).unwrap();
        let value = queue.run(|n| {
            *n += 1;
            *n
        });
        assert_eq!(value, Ok(42));
        queue.close();
        worker.join().unwrap();
    }

    #[test]
    fn submission_after_close_fails() {
        let (queue, worker) = OpQueue::spawn("test-closed", ()).unwrap();
        queue.close();
        worker.join().unwrap();
        assert_eq!(queue.run(|_| 1), Err(QueueClosed));
    }

    #[test]
    fn items_before_close_still_run() {
        let (queue, worker) = OpQueue::spawn("test-drain", 0u32).unwrap();
        for _ in 0..10 {
            // Fire-and-forget submissions: hold no completion receiver.
            let q = queue.clone();
            std::thread::spawn(move || {
                let _ = q.run(|n| *n += 1);
            });
        }
        // The blocking run below is ordered after anything already queued.
        let _ = queue.run(|n| *n);
        queue.close();
        worker.join().unwrap();
    }

    #[tokio::test]
    async fn async_result_round_trips() {
        let (queue, worker) = OpQueue::spawn("test-async", 0u32).unwrap();
        let value = queue
            .run_async(|n| {
                *n += 7;
                *n
            })
            .await;
        assert_eq!(value, Ok(7));
        queue.close();
        worker.join().unwrap();
    }

    #[tokio::test]
    async fn async_submissions_observe_prior_effects() {
        let (queue, worker) = OpQueue::spawn("test-effects", Vec::<u32>::new()).unwrap();

        let mut handles = Vec::new();
        for i in 0..50u32 {
            let q = queue.clone();
            handles.push(tokio::spawn(async move {
                q.run_async(move |log| {
                    log.push(i);
                    log.len()
                })
                .await
            }));
        }
        let mut lengths = Vec::new();
        for handle in handles {
            lengths.push(handle.await.unwrap().unwrap());
        }
        // Every item saw a strictly growing log: lengths are a permutation
        // of 1..=50 with no duplicates (no tearing, no lost updates).
        lengths.sort_unstable();
        assert_eq!(lengths, (1..=50).map(|n| n as usize).collect::<Vec<_>>());

        queue.close();
        worker.join().unwrap();
    }
}
