//! Worker pool and serialized result delivery.
//!
//! Computations run on a small pool of reusable threads that grows on
//! demand: a finished worker parks on its channel and is handed the next
//! job instead of being torn down. Results funnel through one consumer
//! thread, so delivery to the keyboard is serialized even though
//! computation is parallel, and an expired request is dropped at the sink
//! without ever invoking its listener.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{unbounded, Sender};
use parking_lot::Mutex;
use tracing::{error, trace};

use super::{FinalSuggestions, SuggestionsListener};
use crate::suggest::CancelToken;

enum Message {
    Run(Box<dyn FnOnce() + Send + 'static>),
    Quit,
}

struct PoolShared {
    idle: Mutex<Vec<Sender<Message>>>,
    spawned: AtomicUsize,
    shutdown: AtomicBool,
}

/// Grow-on-demand pool of parked, reusable worker threads.
pub(crate) struct WorkerPool {
    shared: Arc<PoolShared>,
}

impl WorkerPool {
    pub(crate) fn new() -> Self {
        WorkerPool {
            shared: Arc::new(PoolShared {
                idle: Mutex::new(Vec::new()),
                spawned: AtomicUsize::new(0),
                shutdown: AtomicBool::new(false),
            }),
        }
    }

    /// Run `job` on an idle worker, spawning a new one if none is parked.
    ///
    /// A panicking job is caught and logged; it never takes the worker or
    /// the process down.
    pub(crate) fn run(&self, job: impl FnOnce() + Send + 'static) {
        if self.shared.shutdown.load(Ordering::Acquire) {
            trace!("pool shut down; dropping job");
            return;
        }
        let sender = self
            .shared
            .idle
            .lock()
            .pop()
            .unwrap_or_else(|| spawn_worker(&self.shared));
        if sender.send(Message::Run(Box::new(job))).is_err() {
            error!("suggestion worker disappeared; job dropped");
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shared.shutdown.store(true, Ordering::Release);
        let mut idle = self.shared.idle.lock();
        for sender in idle.drain(..) {
            let _ = sender.send(Message::Quit);
        }
    }
}

fn spawn_worker(shared: &Arc<PoolShared>) -> Sender<Message> {
    let index = shared.spawned.fetch_add(1, Ordering::Relaxed);
    let (sender, receiver) = unbounded::<Message>();
    let own_sender = sender.clone();
    let shared = Arc::clone(shared);
    trace!(worker = index, "spawning suggestion worker");

    let spawned = thread::Builder::new()
        .name(format!("suggestor-worker-{index}"))
        .spawn(move || {
            for message in receiver.iter() {
                match message {
                    Message::Run(job) => {
                        if catch_unwind(AssertUnwindSafe(job)).is_err() {
                            error!(worker = index, "suggestion computation panicked");
                        }
                        // Re-register as idle, unless the pool is closing.
                        let mut idle = shared.idle.lock();
                        if shared.shutdown.load(Ordering::Acquire) {
                            break;
                        }
                        idle.push(own_sender.clone());
                    }
                    Message::Quit => break,
                }
            }
        });
    if let Err(error) = spawned {
        error!(%error, "failed to spawn suggestion worker");
    }
    sender
}

/// One computed result on its way to the listener.
pub(crate) struct Delivery {
    pub(crate) token: CancelToken,
    pub(crate) listener: SuggestionsListener,
    pub(crate) suggestions: FinalSuggestions,
}

/// Single-consumer sink that hands results to listeners, in order.
pub(crate) struct DeliverySink {
    sender: Sender<Delivery>,
}

impl DeliverySink {
    pub(crate) fn new() -> Self {
        let (sender, receiver) = unbounded::<Delivery>();
        let spawned = thread::Builder::new()
            .name("suggestor-delivery".to_string())
            .spawn(move || {
                for delivery in receiver.iter() {
                    if delivery.token.is_expired() {
                        trace!("dropping result of expired request");
                        continue;
                    }
                    let listener = delivery.listener;
                    let suggestions = delivery.suggestions;
                    if catch_unwind(AssertUnwindSafe(move || listener(suggestions))).is_err() {
                        error!("suggestion listener panicked");
                    }
                }
            });
        if let Err(error) = spawned {
            error!(%error, "failed to spawn delivery thread");
        }
        DeliverySink { sender }
    }

    pub(crate) fn deliver(&self, delivery: Delivery) {
        if self.sender.send(delivery).is_err() {
            error!("delivery sink closed; result dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;

    #[test]
    fn pool_runs_jobs_and_reuses_workers() {
        let pool = WorkerPool::new();
        let (tx, rx) = mpsc::channel();
        for i in 0..4 {
            let tx = tx.clone();
            pool.run(move || tx.send(i).unwrap());
        }
        let mut seen: Vec<i32> = (0..4)
            .map(|_| rx.recv_timeout(Duration::from_secs(5)).unwrap())
            .collect();
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2, 3]);
    }

    #[test]
    fn panicking_job_does_not_poison_the_pool() {
        let pool = WorkerPool::new();
        pool.run(|| panic!("boom"));
        let (tx, rx) = mpsc::channel();
        // Give the panicked worker time to re-register, then verify the
        // pool still takes work.
        thread::sleep(Duration::from_millis(50));
        pool.run(move || tx.send(()).unwrap());
        rx.recv_timeout(Duration::from_secs(5)).unwrap();
    }
}
