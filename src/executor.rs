//! Background task execution
//!
//! Range determination, stagger, cursor markers and annotation searches run
//! off the host's interactive thread. The plot does not own a process-wide
//! pool; it is handed an `Arc<dyn TaskExecutor>` so hosts can share one pool
//! between plots and tests can run everything inline.
//!
//! # Main Types
//!
//! - [`TaskExecutor`] - Scheduling seam (`execute` a boxed job)
//! - [`ThreadPool`] - Fixed-size worker pool fed through a crossbeam channel
//! - [`InlineExecutor`] - Runs every job immediately on the calling thread
//! - [`TaskHandle`] - Result of a job submitted with [`submit`]
//!
//! # Nested waits
//!
//! Jobs may submit further jobs and wait for them (an axis range waits for
//! its per-trace ranges). While waiting, [`TaskHandle::wait`] runs queued jobs
//! itself through [`TaskExecutor::run_pending`], so a small pool cannot
//! deadlock on its own queue.

use crate::config::PlotConfig;
use crate::error::{PlotError, Result, ResultExt};
use crate::sync;
use crossbeam_channel::{bounded, unbounded, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

/// A unit of background work
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// How long a waiting thread sleeps between checks for queued work
const WAIT_POLL: Duration = Duration::from_millis(1);

/// Something that runs jobs
#[cfg_attr(test, mockall::automock)]
pub trait TaskExecutor: Send + Sync {
    /// Schedule `job` for execution
    fn execute(&self, job: Job);

    /// Run one queued job on the calling thread
    ///
    /// Returns `false` when nothing was queued.
    fn run_pending(&self) -> bool {
        false
    }
}

/// Submit `f` and obtain a handle to its result
pub fn submit<T, F>(executor: &Arc<dyn TaskExecutor>, f: F) -> TaskHandle<T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let (sender, receiver) = bounded(1);
    executor.execute(Box::new(move || {
        // The handle may have been dropped; nobody wants the result then
        let _ = sender.send(f());
    }));
    TaskHandle {
        receiver,
        executor: Arc::clone(executor),
    }
}

/// Pending result of a submitted job
pub struct TaskHandle<T> {
    receiver: Receiver<T>,
    executor: Arc<dyn TaskExecutor>,
}

impl<T> TaskHandle<T> {
    /// Block until the job has produced its result
    ///
    /// Fails with [`PlotError::TaskFailed`] when the job panicked or was
    /// dropped by a pool that is shutting down.
    pub fn wait(self) -> Result<T> {
        loop {
            match self.receiver.try_recv() {
                Ok(value) => return Ok(value),
                Err(TryRecvError::Disconnected) => return Err(Self::failed()),
                Err(TryRecvError::Empty) => {}
            }
            if self.executor.run_pending() {
                continue;
            }
            match self.receiver.recv_timeout(WAIT_POLL) {
                Ok(value) => return Ok(value),
                Err(RecvTimeoutError::Disconnected) => return Err(Self::failed()),
                Err(RecvTimeoutError::Timeout) => {}
            }
        }
    }

    /// Result if the job has already finished
    pub fn try_take(&self) -> Option<T> {
        self.receiver.try_recv().ok()
    }

    fn failed() -> PlotError {
        PlotError::TaskFailed("task ended without producing a result".to_string())
    }
}

fn run_job(job: Job) {
    if catch_unwind(AssertUnwindSafe(job)).is_err() {
        tracing::warn!("Background plot task panicked");
    }
}

/// Runs every job immediately on the calling thread
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineExecutor;

impl TaskExecutor for InlineExecutor {
    fn execute(&self, job: Job) {
        run_job(job);
    }
}

/// Fixed-size pool of named worker threads
pub struct ThreadPool {
    sender: Mutex<Option<Sender<Job>>>,
    receiver: Receiver<Job>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    threads: usize,
}

impl ThreadPool {
    /// Start a pool with `threads` workers (at least one)
    pub fn new(threads: usize) -> Result<Self> {
        let threads = threads.max(1);
        let (sender, receiver) = unbounded::<Job>();

        let mut workers = Vec::with_capacity(threads);
        for i in 0..threads {
            let receiver = receiver.clone();
            let handle = std::thread::Builder::new()
                .name(format!("rtplot-worker-{}", i))
                .spawn(move || {
                    // Ends once the pool dropped its sender and the queue is drained
                    while let Ok(job) = receiver.recv() {
                        run_job(job);
                    }
                })
                .with_context(|| format!("Failed to spawn plot worker {}", i))?;
            workers.push(handle);
        }

        tracing::info!("Started plot worker pool with {} threads", threads);
        Ok(Self {
            sender: Mutex::new(Some(sender)),
            receiver,
            workers: Mutex::new(workers),
            threads,
        })
    }

    /// Start a pool sized by `processing.worker_threads`
    pub fn from_config(config: &PlotConfig) -> Result<Self> {
        Self::new(config.resolved_worker_threads())
    }

    /// Number of worker threads
    pub fn threads(&self) -> usize {
        self.threads
    }

    pub fn is_shutdown(&self) -> bool {
        sync::lock(&self.sender).is_none()
    }

    /// Stop accepting jobs, finish the queued ones and join the workers
    pub fn shutdown(&self) {
        if sync::lock(&self.sender).take().is_none() {
            return;
        }
        let workers = std::mem::take(&mut *sync::lock(&self.workers));
        let current = std::thread::current().id();
        for worker in workers {
            // A worker dropping the last reference to its own pool cannot join itself
            if worker.thread().id() == current {
                continue;
            }
            if worker.join().is_err() {
                tracing::warn!("Plot worker thread panicked");
            }
        }
        tracing::info!("Plot worker pool stopped");
    }
}

impl TaskExecutor for ThreadPool {
    fn execute(&self, job: Job) {
        let guard = sync::lock(&self.sender);
        match guard.as_ref() {
            Some(sender) => {
                if sender.send(job).is_err() {
                    tracing::warn!("Plot worker pool disconnected, dropping task");
                }
            }
            None => tracing::warn!("Plot worker pool is shut down, dropping task"),
        }
    }

    fn run_pending(&self) -> bool {
        match self.receiver.try_recv() {
            Ok(job) => {
                run_job(job);
                true
            }
            Err(_) => false,
        }
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for ThreadPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThreadPool")
            .field("threads", &self.threads)
            .field("shutdown", &self.is_shutdown())
            .finish()
    }
}
