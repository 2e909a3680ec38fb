//! Common test utilities and helpers

#![allow(dead_code)] // Test utilities may not all be used in every test file

pub mod builders;
pub mod listeners;

use std::time::{Duration, Instant};

/// Create a test timeout duration
pub fn test_timeout() -> Duration {
    Duration::from_secs(5)
}

/// Assert two floats are approximately equal
pub fn assert_float_eq(a: f64, b: f64, epsilon: f64) {
    assert!(
        (a - b).abs() < epsilon,
        "Expected {} to be approximately equal to {} (epsilon: {})",
        a,
        b,
        epsilon
    );
}

/// Poll `condition` until it holds or the test timeout expires
pub fn wait_for(condition: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + test_timeout();
    while !condition() {
        if Instant::now() > deadline {
            return false;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    true
}

/// Executor that only runs jobs when asked to
///
/// Lets a test interleave background work with plot calls.
#[derive(Default)]
pub struct QueuedExecutor {
    jobs: std::sync::Mutex<std::collections::VecDeque<rtplot::executor::Job>>,
}

impl QueuedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queued(&self) -> usize {
        self.jobs.lock().unwrap().len()
    }

    /// Run queued jobs, including those they queue, until none are left
    pub fn run_all(&self) {
        use rtplot::TaskExecutor;
        while self.run_pending() {}
    }
}

impl rtplot::TaskExecutor for QueuedExecutor {
    fn execute(&self, job: rtplot::executor::Job) {
        self.jobs.lock().unwrap().push_back(job);
    }

    fn run_pending(&self) -> bool {
        let job = self.jobs.lock().unwrap().pop_front();
        match job {
            Some(job) => {
                job();
                true
            }
            None => false,
        }
    }
}
