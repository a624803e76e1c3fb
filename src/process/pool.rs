// src/process/pool.rs
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;

use tracing::debug;

use crate::config::ZERO_WORKERS;
use crate::error::{Error, Result};

/// A fixed-size pool of OS threads fed through a task/result channel.
///
/// Each submitted task runs to completion on one worker and sends its
/// `(index, result)` back on the channel returned by [`WorkerPool::dispatch`].
/// Completion order is arbitrary.
pub struct WorkerPool {
    pool: rayon::ThreadPool,
    workers: usize,
}

/// Shared flag that lets one failing task stop the rest from starting.
#[derive(Debug, Clone, Default)]
pub struct AbortFlag(Arc<AtomicBool>);

impl AbortFlag {
    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

impl WorkerPool {
    pub fn new(workers: usize) -> Result<Self> {
        if workers == 0 {
            return Err(Error::Config(ZERO_WORKERS.into()));
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("chunk-worker-{i}"))
            .build()?;
        Ok(Self { pool, workers })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Submit every task and return the receiving end of the result channel.
    ///
    /// The channel closes once every task has either sent its result or been
    /// skipped because `abort` was raised before it started.
    pub fn dispatch<T, R, I, F>(&self, tasks: I, abort: &AbortFlag, work: F) -> Receiver<(usize, R)>
    where
        I: IntoIterator<Item = T>,
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(usize, T) -> R + Send + Sync + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let work = Arc::new(work);
        for (index, task) in tasks.into_iter().enumerate() {
            let tx = tx.clone();
            let work = Arc::clone(&work);
            let abort = abort.clone();
            self.pool.spawn(move || {
                if abort.is_raised() {
                    debug!(index, "skipping task after abort");
                    return;
                }
                let result = (*work)(index, task);
                // receiver gone means the caller already bailed out
                let _ = tx.send((index, result));
            });
        }
        // drop the original sender so the channel ends with the last task
        drop(tx);
        rx
    }
}
