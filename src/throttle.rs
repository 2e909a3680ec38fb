//! Update throttling
//!
//! Data arrives far more often than a plot needs to be recomputed. The
//! [`UpdateThrottle`] runs its action on the first trigger, then stays
//! dormant for a configurable period. Triggers arriving while dormant are
//! merged into a single follow-up run at the end of the period.

use crate::error::{Result, ResultExt};
use crate::sync;
use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

enum Signal {
    Trigger,
    Stop,
}

/// Coalesces update requests into at most one action per dormant period
pub struct UpdateThrottle {
    sender: Sender<Signal>,
    dormant_nanos: Arc<AtomicU64>,
    thread: Mutex<Option<JoinHandle<()>>>,
}

impl UpdateThrottle {
    /// Start the throttle thread
    pub fn new<F>(dormant: Duration, action: F) -> Result<Self>
    where
        F: FnMut() + Send + 'static,
    {
        let (sender, receiver) = unbounded();
        let dormant_nanos = Arc::new(AtomicU64::new(duration_nanos(dormant)));
        let thread_dormant = Arc::clone(&dormant_nanos);
        let thread = std::thread::Builder::new()
            .name("rtplot-update".to_string())
            .spawn(move || run(receiver, thread_dormant, action))
            .context("Failed to spawn update throttle")?;

        Ok(Self {
            sender,
            dormant_nanos,
            thread: Mutex::new(Some(thread)),
        })
    }

    /// Request a run of the action
    pub fn trigger(&self) {
        // Fails only after stop, when nobody cares anymore
        let _ = self.sender.send(Signal::Trigger);
    }

    pub fn dormant_time(&self) -> Duration {
        Duration::from_nanos(self.dormant_nanos.load(Ordering::Relaxed))
    }

    /// Change the dormant period; applies from the next run on
    pub fn set_dormant_time(&self, dormant: Duration) {
        self.dormant_nanos
            .store(duration_nanos(dormant), Ordering::Relaxed);
    }

    /// Stop the throttle thread; pending triggers are dropped
    pub fn stop(&self) {
        let Some(thread) = sync::lock(&self.thread).take() else {
            return;
        };
        let _ = self.sender.send(Signal::Stop);
        if thread.thread().id() == std::thread::current().id() {
            // Stopped from within the action; the loop exits on its own
            return;
        }
        if thread.join().is_err() {
            tracing::warn!("Update throttle thread panicked");
        }
    }
}

impl Drop for UpdateThrottle {
    fn drop(&mut self) {
        self.stop();
    }
}

fn duration_nanos(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}

fn run<F: FnMut()>(receiver: Receiver<Signal>, dormant_nanos: Arc<AtomicU64>, mut action: F) {
    while let Ok(Signal::Trigger) = receiver.recv() {
        loop {
            if catch_unwind(AssertUnwindSafe(&mut action)).is_err() {
                tracing::warn!("Plot update panicked");
            }

            let dormant = Duration::from_nanos(dormant_nanos.load(Ordering::Relaxed));
            let deadline = Instant::now() + dormant;
            let mut pending = false;
            loop {
                match receiver.recv_deadline(deadline) {
                    Ok(Signal::Trigger) => pending = true,
                    Ok(Signal::Stop) | Err(RecvTimeoutError::Disconnected) => return,
                    Err(RecvTimeoutError::Timeout) => break,
                }
            }
            if !pending {
                break;
            }
        }
    }
    tracing::debug!("Update throttle stopped");
}
