//! Background computations of a plot
//!
//! The processor determines value and position ranges of the plot's traces
//! and derives autoscale and stagger ranges from them. It also finds cursor
//! markers and the samples annotations are bound to. Anything that scans
//! sample data is submitted to the plot's [`TaskExecutor`]; per-axis scans
//! are submitted together and awaited afterwards so that they run in
//! parallel.
//!
//! # Main Types
//!
//! - [`PlotProcessor`] - Processing operations of one plot
//! - [`MergedRange`] - Pending value range of all traces on one axis
//!
//! The numeric building blocks ([`scan_value_range`], [`round_value_range`],
//! [`autoscale_range`], [`stagger_range`], [`position_range`],
//! [`cursor_markers`]) are free functions and do not touch any plot state.
//!
//! # Failures
//!
//! A failed range task (a panicking data provider, a pool that shut down)
//! is logged and the affected axis keeps its range for this pass.

use crate::annotation::AnnotationId;
use crate::axis::format::format_detailed;
use crate::axis::{Log10, Position, YAxis};
use crate::cursor::CursorMarker;
use crate::data::{
    find_sample_greater_or_equal, find_sample_less_or_equal, AxisRange, PlotDataProvider,
    PlotSample, ValueRange,
};
use crate::error::{PlotError, Result};
use crate::executor::{submit, TaskExecutor, TaskHandle};
use crate::history::PlotCommand;
use crate::plot::PlotInner;
use crate::trace::Trace;
use std::sync::atomic::Ordering;
use std::sync::Arc;

/// Undo label of a stagger
pub const STAGGER_LABEL: &str = "Stagger";

/// Relative error below which a scaled value counts as a grid point
const GRID_SNAP: f64 = 64.0 * f64::EPSILON;

/// Upper bound on grid refinements while rounding
const MAX_ROUNDING_PASSES: usize = 8;

/// Range of the finite values in `samples`
///
/// NaN and infinite values are skipped. Returns [`ValueRange::EMPTY`] when no
/// finite value exists.
pub fn scan_value_range<X>(samples: &[PlotSample<X>]) -> ValueRange {
    let mut range = ValueRange::EMPTY;
    for sample in samples {
        if sample.value.is_finite() {
            range.include(sample.value);
        }
    }
    range
}

/// Round `low` down and `high` up to a grid two decades finer than the span
///
/// A zero-width range is returned unchanged. The grid is chosen from the
/// rounded span, so rounding an already rounded range is a no-op.
pub fn round_value_range(low: f64, high: f64) -> ValueRange {
    let size = (high - low).abs();
    if size == 0.0 || !size.is_finite() {
        return ValueRange::new(low, high);
    }
    let mut magnitude = grid_magnitude(size);
    let mut rounded = round_to_grid(low, high, magnitude);
    for _ in 0..MAX_ROUNDING_PASSES {
        // Rounding outwards may push the span across a decade
        let coarser = grid_magnitude((rounded.high - rounded.low).abs());
        if coarser <= magnitude {
            break;
        }
        magnitude = coarser;
        rounded = round_to_grid(low, high, magnitude);
    }
    rounded
}

fn grid_magnitude(size: f64) -> i32 {
    size.log10().floor() as i32 - 2
}

fn round_to_grid(low: f64, high: f64, magnitude: i32) -> ValueRange {
    ValueRange::new(
        snap_to_grid(low, magnitude, f64::floor),
        snap_to_grid(high, magnitude, f64::ceil),
    )
}

fn snap_to_grid(value: f64, magnitude: i32, round: fn(f64) -> f64) -> f64 {
    // Negative powers of ten are not exact, so divide by the exact inverse
    let result = if magnitude >= 0 {
        let step = 10f64.powi(magnitude);
        round(snap(value / step)) * step
    } else {
        let scale = 10f64.powi(-magnitude);
        round(snap(value * scale)) / scale
    };
    if result.is_finite() {
        result
    } else {
        value
    }
}

/// Treat `scaled` as a grid point when it is one up to rounding error
fn snap(scaled: f64) -> f64 {
    let nearest = scaled.round();
    if (scaled - nearest).abs() <= GRID_SNAP * nearest.abs().max(1.0) {
        nearest
    } else {
        scaled
    }
}

/// Autoscale range for data covering `range`
///
/// Returns `None` when there is no data or the result has zero width.
/// Logarithmic axes are rounded in log space; a non-positive low end is
/// replaced by 1 and a high end not above it by 100.
pub fn autoscale_range(range: ValueRange, log: bool) -> Option<ValueRange> {
    if range.is_empty() {
        return None;
    }
    let ValueRange { mut low, mut high } = range.widen_flat();
    if log {
        if low <= 0.0 {
            low = Log10::LOW_FLOOR;
        }
        if high <= low {
            high = Log10::HIGH_FALLBACK;
        }
        low = Log10::log10(low);
        high = Log10::log10(high);
    }
    let rounded = round_value_range(low, high);
    let (mut low, mut high) = (rounded.low, rounded.high);
    if log {
        low = Log10::pow10(low);
        high = Log10::pow10(high);
    }
    (low != high).then_some(ValueRange::new(low, high))
}

/// Stagger range for axis `index` of `count` axes with data covering `range`
///
/// The data span plus `gap` above and below is placed into the `index`-th
/// of `count` equal bands, counted from the top. Returns `None` when there
/// is no data or the result is not a finite, non-empty range (e.g. a
/// logarithmic axis with non-positive data).
pub fn stagger_range(
    range: ValueRange,
    log: bool,
    gap: f64,
    index: usize,
    count: usize,
) -> Option<ValueRange> {
    if range.is_empty() || index >= count {
        return None;
    }
    let ValueRange { mut low, mut high } = range.widen_flat();
    if log {
        low = Log10::log10(low);
        high = Log10::log10(high);
    }
    let span = high - low;
    low -= gap * span;
    high += gap * span;
    let span = high - low;

    low -= (count - index - 1) as f64 * span;
    high += index as f64 * span;

    let rounded = round_value_range(low, high);
    let (mut low, mut high) = (rounded.low, rounded.high);
    if log {
        low = Log10::pow10(low);
        high = Log10::pow10(high);
    }
    (low < high && low.is_finite() && high.is_finite()).then_some(ValueRange::new(low, high))
}

/// Position range spanned by `traces`
///
/// Only the first and last sample of each trace are inspected, which is
/// correct for samples ordered by position.
pub fn position_range<X: Position>(traces: &[Arc<Trace<X>>]) -> Option<AxisRange<X>> {
    let mut range: Option<AxisRange<X>> = None;
    for trace in traces {
        let data = trace.data().snapshot();
        let (Some(first), Some(last)) = (data.first(), data.last()) else {
            continue;
        };
        for position in [first.position, last.position] {
            range = Some(match range {
                None => AxisRange::new(position, position),
                Some(r) => AxisRange::new(
                    if position < r.low { position } else { r.low },
                    if position > r.high { position } else { r.high },
                ),
            });
        }
    }
    range
}

/// Cursor markers of all traces at `location`
///
/// Selects the sample at or before `location` on every trace. Traces whose
/// sample is missing, non-finite or outside the axis range get no marker.
pub fn cursor_markers<X: Position>(
    y_axes: &[YAxis<X>],
    cursor_x: i32,
    location: X,
) -> Vec<CursorMarker> {
    let mut markers = Vec::new();
    for y_axis in y_axes {
        let axis = y_axis.axis();
        let range = axis.value_range();
        for trace in y_axis.traces() {
            let data = trace.data().snapshot();
            let sample = find_sample_less_or_equal(&data, location).map(|i| data[i]);
            trace.select_sample(sample);
            let Some(sample) = sample else {
                continue;
            };
            if !sample.value.is_finite() || !range.contains(sample.value) {
                continue;
            }
            let mut label = format_detailed(sample.value, (range.high - range.low).abs());
            if !trace.units().is_empty() {
                label.push(' ');
                label.push_str(trace.units());
            }
            markers.push(CursorMarker::new(
                cursor_x,
                axis.screen_coord(sample.value),
                trace.color(),
                label,
            ));
        }
    }
    markers.sort();
    markers
}

/// Pending range of every trace on one axis
pub struct MergedRange {
    parts: Vec<TaskHandle<ValueRange>>,
}

impl MergedRange {
    /// Wait for all traces and merge their ranges
    ///
    /// An axis without traces yields [`ValueRange::EMPTY`].
    pub fn wait(self) -> Result<ValueRange> {
        let mut range = ValueRange::EMPTY;
        for part in self.parts {
            range = range.merge(part.wait()?);
        }
        Ok(range)
    }
}

/// Processing operations of one plot
pub struct PlotProcessor<X: Position> {
    inner: Arc<PlotInner<X>>,
}

impl<X: Position> Clone for PlotProcessor<X> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<X: Position> PlotProcessor<X> {
    pub(crate) fn new(inner: Arc<PlotInner<X>>) -> Self {
        Self { inner }
    }

    fn executor(&self) -> &Arc<dyn TaskExecutor> {
        &self.inner.executor
    }

    /// Submit a scan of `data` for its value range
    pub fn determine_value_range(
        &self,
        data: Arc<dyn PlotDataProvider<X>>,
    ) -> TaskHandle<ValueRange> {
        submit(self.executor(), move || scan_value_range(&data.snapshot()))
    }

    /// Submit one scan per trace of `axis`
    pub fn determine_axis_range(&self, axis: &YAxis<X>) -> MergedRange {
        MergedRange {
            parts: axis
                .traces()
                .iter()
                .map(|trace| self.determine_value_range(Arc::clone(trace.data())))
                .collect(),
        }
    }

    /// Submit a search for the position range of all traces on `y_axes`
    pub fn determine_position_range(&self, y_axes: &[YAxis<X>]) -> TaskHandle<Option<AxisRange<X>>> {
        let traces: Vec<_> = y_axes
            .iter()
            .flat_map(|axis| axis.traces().iter().cloned())
            .collect();
        submit(self.executor(), move || position_range(&traces))
    }

    /// Autoscale every axis that has autoscale enabled
    ///
    /// Runs on the calling thread while the scans run on the executor.
    /// Y axes only change, and only notify, when their rounded range
    /// differs. Results are applied by axis id, and only to axes that still
    /// have autoscale enabled. An autoscaled X axis is always set and
    /// notified.
    pub fn autoscale(&self) {
        let y_axes = self.inner.y_axes_snapshot();
        let pending: Vec<_> = y_axes
            .iter()
            .filter(|axis| axis.axis().is_autoscale())
            .map(|axis| (axis.id(), self.determine_axis_range(axis)))
            .collect();
        let position = self
            .inner
            .x_autoscale()
            .then(|| self.determine_position_range(&y_axes));

        for (id, handle) in pending {
            let range = match handle.wait() {
                Ok(range) => range,
                Err(e) => {
                    tracing::warn!("Axis autorange error for Y axis {}: {}", id, e);
                    continue;
                }
            };
            if let Some((index, range)) = self.inner.autoscale_y_axis(id, range) {
                tracing::trace!("Autoscaled Y axis {} to {:?}", index, range);
                self.inner.fire_y_axis_change(index);
            }
        }

        let Some(handle) = position else {
            return;
        };
        match handle.wait() {
            Ok(Some(range)) => {
                self.inner.set_x_range(range.low, range.high);
                self.inner.fire_x_axis_change();
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("Axis autorange error for X axis: {}", e),
        }
    }

    /// Stagger all Y axes that are not autoscaled, in the background
    ///
    /// The new ranges are applied as one undoable command keyed by axis id,
    /// so axes removed meanwhile are skipped and the others keep their own
    /// ranges. A stagger that is superseded by a later call before it
    /// finishes is discarded.
    pub fn stagger(&self) {
        let generation = self.inner.stagger_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let processor = self.clone();
        self.executor()
            .execute(Box::new(move || processor.run_stagger(generation)));
    }

    fn run_stagger(&self, generation: u64) {
        let gap = self.inner.config.processing.stagger_gap;
        let y_axes = self.inner.y_axes_snapshot();
        let count = y_axes.len();
        let original: Vec<AxisRange<f64>> =
            y_axes.iter().map(|axis| axis.axis().value_range()).collect();

        let pending: Vec<Option<MergedRange>> = y_axes
            .iter()
            .map(|axis| (!axis.axis().is_autoscale()).then(|| self.determine_axis_range(axis)))
            .collect();

        let mut axes = Vec::new();
        let mut originals = Vec::new();
        let mut new_ranges = Vec::new();
        for (index, handle) in pending.into_iter().enumerate() {
            let Some(handle) = handle else {
                continue;
            };
            let range = match handle.wait() {
                Ok(range) => range,
                Err(e) => {
                    tracing::warn!("Axis stagger error for Y axis {}: {}", index, e);
                    continue;
                }
            };
            let log = y_axes[index].axis().is_logarithmic();
            let Some(range) = stagger_range(range, log, gap, index, count) else {
                continue;
            };
            let new = original[index].oriented(range.low, range.high);
            if new != original[index] {
                axes.push(y_axes[index].id());
                originals.push(original[index]);
                new_ranges.push(new);
            }
        }

        if self.inner.stagger_generation.load(Ordering::SeqCst) != generation {
            tracing::debug!("Discarding stale stagger result (generation {})", generation);
            return;
        }
        if axes.is_empty() {
            tracing::debug!("Stagger left all axes unchanged");
            return;
        }
        self.inner.execute(PlotCommand::ChangeYRanges {
            label: STAGGER_LABEL.to_string(),
            axes,
            original: originals,
            new: new_ranges,
        });
    }

    /// Compute cursor markers at screen x `cursor_x` in the background
    ///
    /// `callback` receives the sorted markers on a worker thread.
    pub fn update_cursor_markers<F>(&self, cursor_x: i32, location: X, callback: F)
    where
        F: FnOnce(Vec<CursorMarker>) + Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        self.executor().execute(Box::new(move || {
            let y_axes = inner.y_axes_snapshot();
            callback(cursor_markers(&y_axes, cursor_x, location));
        }));
    }

    /// Annotate the sample nearest the middle of the visible X range
    ///
    /// Searches in the background for the first sample at or after the
    /// middle; without such a sample nothing is added. The annotation is
    /// added through the undo history.
    pub fn create_annotation(&self, trace: Arc<Trace<X>>, text: String) {
        let inner = Arc::clone(&self.inner);
        self.executor().execute(Box::new(move || {
            let x_axis = inner.x_axis_snapshot();
            let screen = x_axis.screen_range();
            let location = x_axis.value_at((screen.low + screen.high) / 2);

            let data = trace.data().snapshot();
            let Some(index) = find_sample_greater_or_equal(&data, location) else {
                tracing::debug!("No sample to annotate on trace '{}'", trace.name());
                return;
            };
            if inner.find_trace(trace.id()).is_none() {
                tracing::debug!("Trace '{}' was removed, not annotating", trace.name());
                return;
            }
            let sample = data[index];
            let annotation =
                crate::annotation::Annotation::new(trace.id(), sample.position, sample.value, text)
                    .with_offset(inner.config.annotation_offset());
            inner.execute(PlotCommand::AddAnnotation(annotation));
        }));
    }

    /// Rebind annotation `id` to the sample at or before `location`
    ///
    /// Runs in the background and bypasses the undo history. Without such a
    /// sample the annotation keeps its binding. A later update of the same
    /// annotation supersedes this one.
    pub fn update_annotation(&self, id: AnnotationId, location: X) -> Result<()> {
        let trace = self
            .inner
            .annotation_trace(id)
            .ok_or(PlotError::UnknownAnnotation(id))?;
        let generation = self.inner.next_annotation_generation(id);
        let inner = Arc::clone(&self.inner);
        self.executor().execute(Box::new(move || {
            let data = trace.data().snapshot();
            let Some(index) = find_sample_less_or_equal(&data, location) else {
                tracing::trace!("No sample at or before {:?} for {}", location, id);
                return;
            };
            if !inner.is_current_annotation_generation(id, generation) {
                tracing::debug!("Discarding stale update of {}", id);
                return;
            }
            let sample = data[index];
            inner.rebind_annotation(id, sample.position, sample.value);
        }));
        Ok(())
    }
}
