//! Sample storage for plot traces
//!
//! Each trace reads its samples from a [`PlotDataProvider`]. Readers never
//! hold a lock while they work: [`PlotDataProvider::snapshot`] hands out an
//! immutable, reference-counted view of the samples. Writers go through
//! [`SampleBuffer`], which appends to a ring buffer under a short exclusive
//! lock. The first snapshot after a write copies the ring into one
//! contiguous vector that later readers share until the next write, so a
//! snapshot never observes a partially written buffer.
//!
//! # Main Types
//!
//! - [`PlotSample`] - A single `(position, value)` pair
//! - [`SampleBuffer`] - Bounded, append-oriented buffer for live data
//! - [`XyDataProvider`] - Replace-all provider for XY (waveform) data
//! - [`ValueRange`] / [`AxisRange`] - Value and axis ranges
//!
//! # Ordering
//!
//! Range determination for position axes and all searches assume samples are
//! ordered by ascending position. Append-only time series satisfy this.

pub mod range;
pub mod search;

pub use range::{AxisRange, ValueRange};
pub use search::{find_sample_greater_or_equal, find_sample_less_or_equal};

use crate::axis::Position;
use crate::config::PlotConfig;
use crate::error::{PlotError, Result};
use crate::sync;
use std::collections::VecDeque;
use std::sync::{Arc, RwLock};

/// Default maximum number of samples retained by a [`SampleBuffer`]
pub const DEFAULT_MAX_SAMPLES: usize = 100_000;

/// A single sample at a position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotSample<X> {
    /// Position on the horizontal axis
    pub position: X,
    /// Sample value, may be NaN or infinite to mark gaps
    pub value: f64,
}

impl<X> PlotSample<X> {
    pub fn new(position: X, value: f64) -> Self {
        Self { position, value }
    }

    /// Create a gap marker (NaN value) to break line continuity
    pub fn gap(position: X) -> Self {
        Self {
            position,
            value: f64::NAN,
        }
    }
}

/// Immutable view of a provider's samples at one point in time
pub type DataSnapshot<X> = Arc<Vec<PlotSample<X>>>;

/// Source of samples for a trace
pub trait PlotDataProvider<X: Position>: Send + Sync {
    /// Current samples
    fn snapshot(&self) -> DataSnapshot<X>;

    /// Number of samples
    fn len(&self) -> usize {
        self.snapshot().len()
    }

    /// Whether there are no samples
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Sample buffer for live data
///
/// The feeding side appends with [`push`](Self::push) or
/// [`extend`](Self::extend); once the optional capacity is reached the
/// oldest samples are evicted.
#[derive(Debug)]
pub struct SampleBuffer<X> {
    samples: RwLock<Samples<X>>,
    capacity: Option<usize>,
}

#[derive(Debug)]
struct Samples<X> {
    live: VecDeque<PlotSample<X>>,
    /// Contiguous copy of `live`, dropped on every write
    snapshot: Option<DataSnapshot<X>>,
}

impl<X> Samples<X> {
    fn new(live: VecDeque<PlotSample<X>>) -> RwLock<Self> {
        RwLock::new(Self {
            live,
            snapshot: None,
        })
    }
}

impl<X: Position> SampleBuffer<X> {
    /// Create an unbounded buffer
    pub fn new() -> Self {
        Self {
            samples: Samples::new(VecDeque::new()),
            capacity: None,
        }
    }

    /// Create a buffer that keeps at most `capacity` samples
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            samples: Samples::new(VecDeque::with_capacity(capacity.min(4096))),
            capacity: Some(capacity),
        }
    }

    /// Create a buffer bounded by the configured `data.max_samples`
    pub fn from_config(config: &PlotConfig) -> Self {
        Self::with_capacity(config.data.max_samples)
    }

    /// Create a buffer holding `samples`
    pub fn from_samples(samples: Vec<PlotSample<X>>) -> Self {
        Self {
            samples: Samples::new(samples.into()),
            capacity: None,
        }
    }

    /// Maximum number of samples, if bounded
    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Append one sample
    pub fn push(&self, sample: PlotSample<X>) {
        self.update(|samples| samples.push_back(sample));
    }

    /// Append several samples in one update
    pub fn extend(&self, new_samples: impl IntoIterator<Item = PlotSample<X>>) {
        self.update(|samples| samples.extend(new_samples));
    }

    /// Remove all samples
    pub fn clear(&self) {
        self.update(|samples| samples.clear());
    }

    /// Mutate the samples under the write lock
    ///
    /// Outstanding snapshots keep seeing the previous samples. Samples
    /// beyond the capacity are evicted from the front.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut VecDeque<PlotSample<X>>),
    {
        let mut samples = sync::write(&self.samples);
        f(&mut samples.live);
        if let Some(capacity) = self.capacity {
            while samples.live.len() > capacity {
                samples.live.pop_front();
            }
        }
        samples.snapshot = None;
    }
}

impl<X: Position> Default for SampleBuffer<X> {
    fn default() -> Self {
        Self::new()
    }
}

impl<X: Position> PlotDataProvider<X> for SampleBuffer<X> {
    fn snapshot(&self) -> DataSnapshot<X> {
        let cached = sync::read(&self.samples).snapshot.clone();
        if let Some(snapshot) = cached {
            return snapshot;
        }
        let mut samples = sync::write(&self.samples);
        let Samples { live, snapshot } = &mut *samples;
        Arc::clone(snapshot.get_or_insert_with(|| Arc::new(live.iter().copied().collect())))
    }

    fn len(&self) -> usize {
        sync::read(&self.samples).live.len()
    }
}

/// Provider for XY data that is replaced as a whole
#[derive(Debug, Default)]
pub struct XyDataProvider {
    buffer: SampleBuffer<f64>,
}

impl XyDataProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the data with `xs` paired with `ys`
    ///
    /// Fails when the arrays differ in length; the previous data is kept.
    pub fn set_data(&self, xs: &[f64], ys: &[f64]) -> Result<()> {
        if xs.len() != ys.len() {
            return Err(PlotError::SizeMismatch {
                x_len: xs.len(),
                y_len: ys.len(),
            });
        }
        let samples: Vec<_> = xs
            .iter()
            .zip(ys)
            .map(|(&x, &y)| PlotSample::new(x, y))
            .collect();
        self.buffer.update(|current| *current = samples.into());
        Ok(())
    }

    /// Replace the values, using the sample index as position
    pub fn set_values(&self, ys: &[f64]) {
        let samples: VecDeque<_> = ys
            .iter()
            .enumerate()
            .map(|(i, &y)| PlotSample::new(i as f64, y))
            .collect();
        self.buffer.update(|current| *current = samples);
    }
}

impl PlotDataProvider<f64> for XyDataProvider {
    fn snapshot(&self) -> DataSnapshot<f64> {
        self.buffer.snapshot()
    }

    fn len(&self) -> usize {
        self.buffer.len()
    }
}
