//! Plot orchestration
//!
//! A [`Plot`] owns the X axis, the Y axes with their traces, markers,
//! annotations and the undo history. It hands data-heavy work to its
//! [`PlotProcessor`] and tells registered [`PlotListener`]s about every
//! change. The host provides the pixel layout of the axes and renders from
//! the snapshots returned by the accessors.
//!
//! # Main Types
//!
//! - [`Plot`] - The plot engine a host drives
//!
//! # Threading
//!
//! All methods take `&self` and may be called from any thread. State lives
//! behind short-lived locks; listeners are always invoked after the locks
//! are released. Background results (stagger, annotation searches, cursor
//! markers) are applied from worker threads.
//!
//! # Undo
//!
//! Stagger, range edits made through `set_*_range_undoable`, and adding or
//! removing annotations go through the undo history. Autoscale, zoom, pan,
//! direct range changes and annotation drags do not.

use crate::annotation::{Annotation, AnnotationId};
use crate::axis::{Axis, AxisId, Position, ScreenRegion, YAxis};
use crate::config::PlotConfig;
use crate::cursor::CursorMarker;
use crate::data::{AxisRange, ValueRange};
use crate::error::{PlotError, Result};
use crate::executor::TaskExecutor;
use crate::history::{PlotCommand, UndoHistory};
use crate::listener::PlotListener;
use crate::marker::PlotMarker;
use crate::processor::{autoscale_range, PlotProcessor};
use crate::sync;
use crate::throttle::UpdateThrottle;
use crate::trace::{Color, Trace, TraceId, TraceSpec};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

/// Initial range of new Y axes
const DEFAULT_Y_RANGE: (f64, f64) = (0.0, 10.0);

/// Undo label of range edits
pub const RANGE_EDIT_LABEL: &str = "Change axis range";

/// Plot state shared with background tasks
pub(crate) struct PlotInner<X: Position> {
    pub(crate) config: PlotConfig,
    pub(crate) executor: Arc<dyn TaskExecutor>,
    x_axis: RwLock<Axis<X>>,
    y_axes: RwLock<Vec<YAxis<X>>>,
    annotations: RwLock<Vec<Annotation<X>>>,
    markers: RwLock<Vec<PlotMarker<X>>>,
    listeners: RwLock<Vec<Arc<dyn PlotListener<X>>>>,
    history: Mutex<UndoHistory<PlotCommand<X>>>,
    /// Incremented by every stagger request
    pub(crate) stagger_generation: AtomicU64,
    /// Source of annotation position update generations
    annotation_generation: AtomicU64,
    /// Latest position update request per annotation
    annotation_generations: Mutex<HashMap<AnnotationId, u64>>,
}

impl<X: Position> PlotInner<X> {
    pub(crate) fn x_axis_snapshot(&self) -> Axis<X> {
        sync::read(&self.x_axis).clone()
    }

    pub(crate) fn x_autoscale(&self) -> bool {
        sync::read(&self.x_axis).is_autoscale()
    }

    pub(crate) fn y_axes_snapshot(&self) -> Vec<YAxis<X>> {
        sync::read(&self.y_axes).clone()
    }

    fn with_x_axis<R>(&self, f: impl FnOnce(&mut Axis<X>) -> R) -> R {
        f(&mut sync::write(&self.x_axis))
    }

    fn with_y_axis<R>(&self, index: usize, f: impl FnOnce(&mut YAxis<X>) -> R) -> Result<R> {
        let mut axes = sync::write(&self.y_axes);
        let axis = axes.get_mut(index).ok_or(PlotError::AxisIndex(index))?;
        Ok(f(axis))
    }

    /// Current index of the Y axis `id`
    pub(crate) fn y_axis_index(&self, id: AxisId) -> Option<usize> {
        sync::read(&self.y_axes).iter().position(|axis| axis.id() == id)
    }

    pub(crate) fn set_x_range(&self, low: X, high: X) -> bool {
        self.with_x_axis(|axis| axis.set_value_range(low, high))
    }

    /// Autoscale Y axis `id` for data covering `data`
    ///
    /// The autoscale and log flags are read when the range is applied, so an
    /// axis switched to manual or removed in the meantime is left alone.
    /// Returns the current index and new range of the axis if it changed.
    pub(crate) fn autoscale_y_axis(&self, id: AxisId, data: ValueRange) -> Option<(usize, ValueRange)> {
        let mut axes = sync::write(&self.y_axes);
        let index = axes.iter().position(|axis| axis.id() == id)?;
        let axis = axes[index].axis_mut();
        if !axis.is_autoscale() {
            return None;
        }
        let range = autoscale_range(data, axis.is_logarithmic())?;
        let oriented = axis.value_range().oriented(range.low, range.high);
        axis.set_value_range(oriented.low, oriented.high)
            .then_some((index, range))
    }

    fn fire(&self, f: impl Fn(&dyn PlotListener<X>)) {
        let listeners = sync::read(&self.listeners).clone();
        for listener in &listeners {
            f(listener.as_ref());
        }
    }

    pub(crate) fn fire_x_axis_change(&self) {
        let axis = self.x_axis_snapshot();
        self.fire(|l| l.changed_x_axis(&axis));
    }

    pub(crate) fn fire_y_axis_change(&self, index: usize) {
        let axis = sync::read(&self.y_axes)
            .get(index)
            .map(|y_axis| y_axis.axis().clone());
        if let Some(axis) = axis {
            self.fire(|l| l.changed_y_axis(index, &axis));
        }
    }

    fn fire_annotations_change(&self) {
        self.fire(|l| l.changed_annotations());
    }

    /// Apply `command` to the plot state and notify listeners
    fn apply(&self, command: &PlotCommand<X>) {
        match command {
            PlotCommand::ChangeYRanges { axes, new, .. } => {
                let mut changed = Vec::new();
                {
                    let mut y_axes = sync::write(&self.y_axes);
                    for (&id, range) in axes.iter().zip(new) {
                        match y_axes.iter().position(|axis| axis.id() == id) {
                            Some(index) => {
                                let axis = y_axes[index].axis_mut();
                                if axis.set_value_range(range.low, range.high) {
                                    changed.push(index);
                                }
                            }
                            None => tracing::warn!("Skipping range of removed Y axis {}", id),
                        }
                    }
                }
                for index in changed {
                    self.fire_y_axis_change(index);
                }
            }
            PlotCommand::ChangeXRange { new, .. } => {
                if self.set_x_range(new.low, new.high) {
                    self.fire_x_axis_change();
                }
            }
            PlotCommand::AddAnnotation(annotation) => {
                {
                    let mut annotations = sync::write(&self.annotations);
                    if annotations.iter().any(|a| a.id() == annotation.id()) {
                        return;
                    }
                    annotations.push(annotation.clone());
                }
                self.fire_annotations_change();
            }
            PlotCommand::RemoveAnnotation(annotation) => {
                self.remove_annotations_where(|a| a.id() == annotation.id());
            }
        }
    }

    /// Apply `command` and record it for undo
    pub(crate) fn execute(&self, command: PlotCommand<X>) {
        tracing::debug!("Executing '{}'", command.label());
        self.apply(&command);
        sync::lock(&self.history).push(command);
    }

    pub(crate) fn find_trace(&self, id: TraceId) -> Option<Arc<Trace<X>>> {
        sync::read(&self.y_axes)
            .iter()
            .flat_map(|axis| axis.traces())
            .find(|trace| trace.id() == id)
            .cloned()
    }

    pub(crate) fn annotation_trace(&self, id: AnnotationId) -> Option<Arc<Trace<X>>> {
        let trace_id = sync::read(&self.annotations)
            .iter()
            .find(|a| a.id() == id)
            .map(|a| a.trace)?;
        self.find_trace(trace_id)
    }

    /// Remove the matching annotations and their pending position updates
    fn remove_annotations_where(&self, matches: impl Fn(&Annotation<X>) -> bool) {
        let removed: Vec<AnnotationId> = {
            let mut annotations = sync::write(&self.annotations);
            let removed = annotations
                .iter()
                .filter(|a| matches(a))
                .map(|a| a.id())
                .collect();
            annotations.retain(|a| !matches(a));
            removed
        };
        if removed.is_empty() {
            return;
        }
        {
            let mut generations = sync::lock(&self.annotation_generations);
            for id in &removed {
                generations.remove(id);
            }
        }
        self.fire_annotations_change();
    }

    pub(crate) fn next_annotation_generation(&self, id: AnnotationId) -> u64 {
        let generation = self.annotation_generation.fetch_add(1, Ordering::SeqCst) + 1;
        sync::lock(&self.annotation_generations).insert(id, generation);
        generation
    }

    #[cfg(test)]
    pub(crate) fn pending_annotation_updates(&self) -> usize {
        sync::lock(&self.annotation_generations).len()
    }

    pub(crate) fn is_current_annotation_generation(&self, id: AnnotationId, generation: u64) -> bool {
        sync::lock(&self.annotation_generations).get(&id) == Some(&generation)
    }

    /// Bind annotation `id` to a new sample
    pub(crate) fn rebind_annotation(&self, id: AnnotationId, position: X, value: f64) -> bool {
        let updated = self.with_annotation(id, |a| {
            a.position = position;
            a.value = value;
        });
        if updated.is_ok() {
            self.fire_annotations_change();
        }
        updated.is_ok()
    }

    fn with_annotation<R>(
        &self,
        id: AnnotationId,
        f: impl FnOnce(&mut Annotation<X>) -> R,
    ) -> Result<R> {
        let mut annotations = sync::write(&self.annotations);
        let annotation = annotations
            .iter_mut()
            .find(|a| a.id() == id)
            .ok_or(PlotError::UnknownAnnotation(id))?;
        Ok(f(annotation))
    }
}

/// A real-time plot
pub struct Plot<X: Position> {
    inner: Arc<PlotInner<X>>,
    processor: PlotProcessor<X>,
    throttle: UpdateThrottle,
}

impl<X: Position> Plot<X> {
    /// Create a plot with the horizontal axis `x_axis`
    ///
    /// Starts the update throttle thread; background work goes to `executor`.
    pub fn new(x_axis: Axis<X>, executor: Arc<dyn TaskExecutor>, config: PlotConfig) -> Result<Self> {
        let history = UndoHistory::new(config.history.max_undo);
        let throttle_period = config.throttle_period();
        let inner = Arc::new(PlotInner {
            config,
            executor,
            x_axis: RwLock::new(x_axis),
            y_axes: RwLock::new(Vec::new()),
            annotations: RwLock::new(Vec::new()),
            markers: RwLock::new(Vec::new()),
            listeners: RwLock::new(Vec::new()),
            history: Mutex::new(history),
            stagger_generation: AtomicU64::new(0),
            annotation_generation: AtomicU64::new(0),
            annotation_generations: Mutex::new(HashMap::new()),
        });

        let weak = Arc::downgrade(&inner);
        let throttle = UpdateThrottle::new(throttle_period, move || {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            PlotProcessor::new(Arc::clone(&inner)).autoscale();
            inner.fire(|l| l.refresh_requested());
        })?;

        Ok(Self {
            processor: PlotProcessor::new(Arc::clone(&inner)),
            inner,
            throttle,
        })
    }

    pub fn config(&self) -> &PlotConfig {
        &self.inner.config
    }

    pub fn processor(&self) -> &PlotProcessor<X> {
        &self.processor
    }

    // ==================== Listeners ====================

    pub fn add_listener(&self, listener: Arc<dyn PlotListener<X>>) {
        sync::write(&self.inner.listeners).push(listener);
    }

    /// Remove a listener previously added with [`add_listener`](Self::add_listener)
    pub fn remove_listener(&self, listener: &Arc<dyn PlotListener<X>>) -> bool {
        let target = Arc::as_ptr(listener) as *const ();
        let mut listeners = sync::write(&self.inner.listeners);
        let before = listeners.len();
        listeners.retain(|l| Arc::as_ptr(l) as *const () != target);
        listeners.len() != before
    }

    // ==================== Axes ====================

    /// Snapshot of the X axis
    pub fn x_axis(&self) -> Axis<X> {
        self.inner.x_axis_snapshot()
    }

    /// Snapshot of all Y axes
    pub fn y_axes(&self) -> Vec<YAxis<X>> {
        self.inner.y_axes_snapshot()
    }

    pub fn y_axis(&self, index: usize) -> Result<YAxis<X>> {
        sync::read(&self.inner.y_axes)
            .get(index)
            .cloned()
            .ok_or(PlotError::AxisIndex(index))
    }

    /// Current index of the Y axis `id`, `None` once it was removed
    pub fn y_axis_index(&self, id: AxisId) -> Option<usize> {
        self.inner.y_axis_index(id)
    }

    /// Add a Y axis, returning its index
    pub fn add_y_axis(&self, name: impl Into<String>) -> usize {
        let name = name.into();
        let index = {
            let mut axes = sync::write(&self.inner.y_axes);
            axes.push(YAxis::new(name.clone(), DEFAULT_Y_RANGE.0, DEFAULT_Y_RANGE.1));
            axes.len() - 1
        };
        tracing::debug!("Added Y axis {} '{}'", index, name);
        self.request_update();
        index
    }

    /// Remove Y axis `index` together with its traces and their annotations
    pub fn remove_y_axis(&self, index: usize) -> Result<()> {
        let removed = {
            let mut axes = sync::write(&self.inner.y_axes);
            if index >= axes.len() {
                return Err(PlotError::AxisIndex(index));
            }
            axes.remove(index)
        };
        tracing::debug!("Removed Y axis {} '{}'", index, removed.axis().name());
        if !removed.traces().is_empty() {
            let ids: Vec<_> = removed.traces().iter().map(|t| t.id()).collect();
            self.remove_annotations_of(&ids);
            self.inner.fire(|l| l.changed_traces());
        }
        self.request_update();
        Ok(())
    }

    pub fn set_x_axis_bounds(&self, region: ScreenRegion) {
        self.inner.with_x_axis(|axis| axis.set_bounds(region));
    }

    pub fn set_y_axis_bounds(&self, index: usize, region: ScreenRegion) -> Result<()> {
        self.inner
            .with_y_axis(index, |axis| axis.axis_mut().set_bounds(region))
    }

    pub fn set_autoscale(&self, index: usize, autoscale: bool) -> Result<()> {
        let changed = self
            .inner
            .with_y_axis(index, |axis| axis.axis_mut().set_autoscale(autoscale))?;
        if changed {
            self.inner.fire(|l| l.changed_autoscale(index, autoscale));
            if autoscale {
                self.request_update();
            }
        }
        Ok(())
    }

    pub fn set_x_autoscale(&self, autoscale: bool) {
        if self.inner.with_x_axis(|axis| axis.set_autoscale(autoscale)) {
            self.inner.fire_x_axis_change();
            if autoscale {
                self.request_update();
            }
        }
    }

    /// Turn autoscale on for every Y axis
    pub fn enable_autoscale(&self) {
        let count = sync::read(&self.inner.y_axes).len();
        for index in 0..count {
            // Axes removed concurrently are skipped
            let _ = self.set_autoscale(index, true);
        }
    }

    pub fn set_log_scale(&self, index: usize, log_scale: bool) -> Result<()> {
        let changed = self
            .inner
            .with_y_axis(index, |axis| axis.axis_mut().set_logarithmic(log_scale))?;
        if changed {
            self.inner.fire(|l| l.changed_log_scale(index, log_scale));
            self.request_update();
        }
        Ok(())
    }

    pub fn set_grid(&self, index: usize, grid: bool) -> Result<()> {
        let changed = self
            .inner
            .with_y_axis(index, |axis| axis.axis_mut().set_grid_visible(grid))?;
        if changed {
            self.inner.fire(|l| l.changed_grid(index, grid));
        }
        Ok(())
    }

    pub fn set_x_grid(&self, grid: bool) {
        if self.inner.with_x_axis(|axis| axis.set_grid_visible(grid)) {
            self.inner.fire_x_axis_change();
        }
    }

    /// Set the range of Y axis `index`, bypassing the undo history
    ///
    /// Returns whether the range changed.
    pub fn set_y_range(&self, index: usize, low: f64, high: f64) -> Result<bool> {
        check_finite(low, high)?;
        let changed = self
            .inner
            .with_y_axis(index, |axis| axis.axis_mut().set_value_range(low, high))?;
        if changed {
            self.inner.fire_y_axis_change(index);
        }
        Ok(changed)
    }

    /// Set the X range, bypassing the undo history
    pub fn set_x_range(&self, low: X, high: X) -> bool {
        let changed = self.inner.set_x_range(low, high);
        if changed {
            self.inner.fire_x_axis_change();
        }
        changed
    }

    /// Set the range of Y axis `index` as an undoable edit
    pub fn set_y_range_undoable(&self, index: usize, low: f64, high: f64) -> Result<()> {
        check_finite(low, high)?;
        let y_axis = self.y_axis(index)?;
        let original = y_axis.axis().value_range();
        self.execute(PlotCommand::ChangeYRanges {
            label: RANGE_EDIT_LABEL.to_string(),
            axes: vec![y_axis.id()],
            original: vec![original],
            new: vec![AxisRange::new(low, high)],
        });
        Ok(())
    }

    /// Set the X range as an undoable edit
    pub fn set_x_range_undoable(&self, low: X, high: X) {
        let original = self.x_axis().value_range();
        self.execute(PlotCommand::ChangeXRange {
            label: RANGE_EDIT_LABEL.to_string(),
            original,
            new: AxisRange::new(low, high),
        });
    }

    /// Zoom the X axis around screen x `center`
    pub fn zoom_x(&self, center: i32, factor: f64) -> bool {
        let changed = self.inner.with_x_axis(|axis| axis.zoom(center, factor));
        if changed {
            self.inner.fire_x_axis_change();
        }
        changed
    }

    /// Zoom Y axis `index` around screen y `center`
    pub fn zoom_y(&self, index: usize, center: i32, factor: f64) -> Result<bool> {
        let changed = self
            .inner
            .with_y_axis(index, |axis| axis.axis_mut().zoom(center, factor))?;
        if changed {
            self.inner.fire_y_axis_change(index);
        }
        Ok(changed)
    }

    /// Pan the X axis from `original` by the drag from `from` to `to`
    pub fn pan_x(&self, original: AxisRange<X>, from: X, to: X) -> bool {
        let changed = self.inner.with_x_axis(|axis| axis.pan(original, from, to));
        if changed {
            self.inner.fire_x_axis_change();
        }
        changed
    }

    /// Pan Y axis `index` from `original` by the drag from `from` to `to`
    pub fn pan_y(&self, index: usize, original: AxisRange<f64>, from: f64, to: f64) -> Result<bool> {
        let changed = self
            .inner
            .with_y_axis(index, |axis| axis.axis_mut().pan(original, from, to))?;
        if changed {
            self.inner.fire_y_axis_change(index);
        }
        Ok(changed)
    }

    // ==================== Traces ====================

    /// Add a trace to the Y axis named in `spec`
    pub fn add_trace(&self, spec: TraceSpec<X>) -> Result<Arc<Trace<X>>> {
        let axis_index = spec.y_axis;
        let trace = Arc::new(Trace::from_spec(spec));
        self.inner
            .with_y_axis(axis_index, |axis| axis.add_trace(Arc::clone(&trace)))?;
        tracing::debug!("Added trace '{}' ({}) on Y axis {}", trace.name(), trace.id(), axis_index);
        self.inner.fire(|l| l.changed_traces());
        self.request_update();
        Ok(trace)
    }

    /// All traces, in axis order
    pub fn traces(&self) -> Vec<Arc<Trace<X>>> {
        sync::read(&self.inner.y_axes)
            .iter()
            .flat_map(|axis| axis.traces().iter().cloned())
            .collect()
    }

    pub fn trace(&self, id: TraceId) -> Option<Arc<Trace<X>>> {
        self.inner.find_trace(id)
    }

    /// Index of the Y axis that holds trace `id`
    pub fn trace_axis(&self, id: TraceId) -> Option<usize> {
        sync::read(&self.inner.y_axes)
            .iter()
            .position(|axis| axis.traces().iter().any(|t| t.id() == id))
    }

    /// Move trace `id` onto Y axis `new_axis`
    pub fn move_trace(&self, id: TraceId, new_axis: usize) -> Result<()> {
        {
            let mut axes = sync::write(&self.inner.y_axes);
            if new_axis >= axes.len() {
                return Err(PlotError::AxisIndex(new_axis));
            }
            let trace = axes
                .iter_mut()
                .find_map(|axis| {
                    let trace = axis.traces().iter().find(|t| t.id() == id).cloned()?;
                    axis.take_trace(&trace)
                })
                .ok_or(PlotError::UnknownTrace(id))?;
            axes[new_axis].add_trace(trace);
        }
        self.inner.fire(|l| l.changed_traces());
        self.request_update();
        Ok(())
    }

    /// Remove trace `id` and its annotations
    pub fn remove_trace(&self, id: TraceId) -> Result<()> {
        let removed = {
            let mut axes = sync::write(&self.inner.y_axes);
            axes.iter_mut().find_map(|axis| {
                let trace = axis.traces().iter().find(|t| t.id() == id).cloned()?;
                axis.take_trace(&trace)
            })
        };
        let trace = removed.ok_or(PlotError::UnknownTrace(id))?;
        tracing::debug!("Removed trace '{}'", trace.name());
        self.remove_annotations_of(&[id]);
        self.inner.fire(|l| l.changed_traces());
        self.request_update();
        Ok(())
    }

    // ==================== Markers ====================

    /// Add a vertical marker, returning its index
    pub fn add_marker(&self, color: Color, interactive: bool, position: X) -> usize {
        let index = {
            let mut markers = sync::write(&self.inner.markers);
            markers.push(PlotMarker::new(color, interactive, position));
            markers.len() - 1
        };
        self.inner.fire(|l| l.changed_markers());
        index
    }

    pub fn markers(&self) -> Vec<PlotMarker<X>> {
        sync::read(&self.inner.markers).clone()
    }

    pub fn remove_marker(&self, index: usize) -> Result<()> {
        {
            let mut markers = sync::write(&self.inner.markers);
            if index >= markers.len() {
                return Err(PlotError::MarkerIndex(index));
            }
            markers.remove(index);
        }
        self.inner.fire(|l| l.changed_markers());
        Ok(())
    }

    pub fn set_marker_position(&self, index: usize, position: X) -> Result<()> {
        {
            let mut markers = sync::write(&self.inner.markers);
            let marker = markers
                .get_mut(index)
                .ok_or(PlotError::MarkerIndex(index))?;
            marker.position = position;
        }
        self.inner.fire(|l| l.changed_markers());
        Ok(())
    }

    // ==================== Annotations ====================

    /// Annotate trace `trace` near the middle of the visible X range
    ///
    /// The sample is searched in the background; the annotation is added
    /// through the undo history once found.
    pub fn add_annotation(&self, trace: TraceId, text: impl Into<String>) -> Result<()> {
        let trace = self
            .inner
            .find_trace(trace)
            .ok_or(PlotError::UnknownTrace(trace))?;
        self.processor.create_annotation(trace, text.into());
        Ok(())
    }

    /// Add a fully specified annotation through the undo history
    pub fn add_annotation_direct(&self, annotation: Annotation<X>) -> Result<()> {
        if self.inner.find_trace(annotation.trace).is_none() {
            return Err(PlotError::UnknownTrace(annotation.trace));
        }
        self.execute(PlotCommand::AddAnnotation(annotation));
        Ok(())
    }

    pub fn annotations(&self) -> Vec<Annotation<X>> {
        sync::read(&self.inner.annotations).clone()
    }

    /// Number of annotations not managed by the plot itself
    pub fn user_annotation_count(&self) -> usize {
        sync::read(&self.inner.annotations)
            .iter()
            .filter(|a| !a.is_internal())
            .count()
    }

    pub fn update_annotation_text(&self, id: AnnotationId, text: impl Into<String>) -> Result<()> {
        let text = text.into();
        self.inner.with_annotation(id, |a| a.text = text)?;
        self.inner.fire_annotations_change();
        Ok(())
    }

    /// Rebind annotation `id` to the sample at or before `location`
    ///
    /// The search runs in the background. Without a sample at or before
    /// `location` the annotation stays where it is.
    pub fn update_annotation_position(&self, id: AnnotationId, location: X) -> Result<()> {
        self.processor.update_annotation(id, location)
    }

    pub fn set_annotation_offset(&self, id: AnnotationId, offset: (f64, f64)) -> Result<()> {
        self.inner.with_annotation(id, |a| a.offset = offset)?;
        self.inner.fire_annotations_change();
        Ok(())
    }

    /// Remove annotation `id` through the undo history
    pub fn remove_annotation(&self, id: AnnotationId) -> Result<()> {
        let annotation = sync::read(&self.inner.annotations)
            .iter()
            .find(|a| a.id() == id)
            .cloned()
            .ok_or(PlotError::UnknownAnnotation(id))?;
        self.execute(PlotCommand::RemoveAnnotation(annotation));
        Ok(())
    }

    fn remove_annotations_of(&self, traces: &[TraceId]) {
        self.inner
            .remove_annotations_where(|a| traces.contains(&a.trace));
    }

    // ==================== Processing ====================

    /// Autoscale all autoscaled axes on the calling thread
    pub fn autoscale(&self) {
        self.processor.autoscale();
    }

    /// Stagger the Y axes so their traces do not overlap
    ///
    /// With `disable_autoscale`, autoscale is first turned off on every Y
    /// axis so that all axes take part.
    pub fn stagger(&self, disable_autoscale: bool) {
        if disable_autoscale {
            let count = sync::read(&self.inner.y_axes).len();
            for index in 0..count {
                let _ = self.set_autoscale(index, false);
            }
        }
        self.processor.stagger();
    }

    /// Compute cursor markers for screen x `cursor_x` in the background
    pub fn update_cursor_markers<F>(&self, cursor_x: i32, callback: F)
    where
        F: FnOnce(Vec<CursorMarker>) + Send + 'static,
    {
        let location = self.x_axis().value_at(cursor_x);
        self.processor
            .update_cursor_markers(cursor_x, location, callback);
    }

    // ==================== Undo ====================

    /// Apply `command` and record it in the undo history
    pub fn execute(&self, command: PlotCommand<X>) {
        self.inner.execute(command);
    }

    /// Undo the latest command; returns `false` when there is none
    pub fn undo(&self) -> bool {
        let command = sync::lock(&self.inner.history).undo();
        match command {
            Some(command) => {
                tracing::debug!("Undo '{}'", command.label());
                self.inner.apply(&command.reversed());
                true
            }
            None => false,
        }
    }

    /// Redo the latest undone command; returns `false` when there is none
    pub fn redo(&self) -> bool {
        let command = sync::lock(&self.inner.history).redo();
        match command {
            Some(command) => {
                tracing::debug!("Redo '{}'", command.label());
                self.inner.apply(&command);
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        sync::lock(&self.inner.history).can_undo()
    }

    pub fn can_redo(&self) -> bool {
        sync::lock(&self.inner.history).can_redo()
    }

    /// Label of the command [`undo`](Self::undo) would revert
    pub fn undo_label(&self) -> Option<String> {
        sync::lock(&self.inner.history)
            .peek_undo()
            .map(|c| c.label().to_string())
    }

    // ==================== Updates ====================

    /// Ask for an autoscale pass and a redraw, throttled
    pub fn request_update(&self) {
        self.throttle.trigger();
    }

    /// Change the dormant period between throttled updates
    pub fn set_update_throttle(&self, dormant: Duration) {
        self.throttle.set_dormant_time(dormant);
    }

    /// Stop the update thread; further update requests are ignored
    pub fn dispose(&self) {
        self.throttle.stop();
    }

    pub(crate) fn inner(&self) -> &Arc<PlotInner<X>> {
        &self.inner
    }
}

impl<X: Position> Drop for Plot<X> {
    fn drop(&mut self) {
        self.dispose();
    }
}

fn check_finite(low: f64, high: f64) -> Result<()> {
    if low.is_finite() && high.is_finite() {
        Ok(())
    } else {
        Err(PlotError::InvalidRange(format!("{}..{}", low, high)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{PlotDataProvider, PlotSample, SampleBuffer};
    use crate::executor::InlineExecutor;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn plot() -> Plot<f64> {
        let executor: Arc<dyn TaskExecutor> = Arc::new(InlineExecutor);
        let mut x_axis = Axis::horizontal("x", 0.0, 100.0);
        x_axis.set_bounds(ScreenRegion::new(0, 0, 101, 20));
        Plot::new(x_axis, executor, PlotConfig::default()).unwrap()
    }

    fn buffer(values: &[(f64, f64)]) -> Arc<dyn PlotDataProvider<f64>> {
        Arc::new(SampleBuffer::from_samples(
            values.iter().map(|&(x, y)| PlotSample::new(x, y)).collect(),
        ))
    }

    #[derive(Default)]
    struct Counter {
        y_changes: AtomicUsize,
        traces: AtomicUsize,
    }

    impl PlotListener<f64> for Counter {
        fn changed_y_axis(&self, _index: usize, _axis: &Axis<f64>) {
            self.y_changes.fetch_add(1, Ordering::SeqCst);
        }

        fn changed_traces(&self) {
            self.traces.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_add_trace_to_missing_axis() {
        let plot = plot();
        let err = plot
            .add_trace(TraceSpec::new("t", buffer(&[])).on_axis(2))
            .unwrap_err();
        assert!(matches!(err, PlotError::AxisIndex(2)));
    }

    #[test]
    fn test_move_and_remove_trace() {
        let plot = plot();
        plot.add_y_axis("a");
        plot.add_y_axis("b");
        let counter = Arc::new(Counter::default());
        plot.add_listener(counter.clone());

        let trace = plot.add_trace(TraceSpec::new("t", buffer(&[]))).unwrap();
        assert_eq!(plot.trace_axis(trace.id()), Some(0));

        plot.move_trace(trace.id(), 1).unwrap();
        assert_eq!(plot.trace_axis(trace.id()), Some(1));

        plot.remove_trace(trace.id()).unwrap();
        assert!(plot.traces().is_empty());
        assert!(matches!(plot.remove_trace(trace.id()), Err(PlotError::UnknownTrace(_))));
        assert_eq!(counter.traces.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_undoable_range_edit() {
        let plot = plot();
        plot.add_y_axis("a");
        plot.set_y_range_undoable(0, -1.0, 1.0).unwrap();
        assert_eq!(plot.y_axis(0).unwrap().axis().value_range(), AxisRange::new(-1.0, 1.0));

        assert!(plot.undo());
        assert_eq!(plot.y_axis(0).unwrap().axis().value_range(), AxisRange::new(0.0, 10.0));
        assert!(plot.redo());
        assert_eq!(plot.y_axis(0).unwrap().axis().value_range(), AxisRange::new(-1.0, 1.0));
        assert!(!plot.redo());
    }

    #[test]
    fn test_set_y_range_rejects_non_finite() {
        let plot = plot();
        plot.add_y_axis("a");
        assert!(matches!(
            plot.set_y_range(0, f64::NAN, 1.0),
            Err(PlotError::InvalidRange(_))
        ));
    }

    #[test]
    fn test_listener_removal() {
        let plot = plot();
        plot.add_y_axis("a");
        let counter = Arc::new(Counter::default());
        let listener: Arc<dyn PlotListener<f64>> = counter.clone();
        plot.add_listener(Arc::clone(&listener));

        plot.set_y_range(0, 0.0, 5.0).unwrap();
        assert!(plot.remove_listener(&listener));
        plot.set_y_range(0, 0.0, 6.0).unwrap();
        assert_eq!(counter.y_changes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_markers() {
        let plot = plot();
        let index = plot.add_marker(Color::RED, true, 42.0);
        plot.set_marker_position(index, 50.0).unwrap();
        assert_eq!(plot.markers()[0].position, 50.0);
        plot.remove_marker(index).unwrap();
        assert!(matches!(plot.remove_marker(0), Err(PlotError::MarkerIndex(0))));
    }

    #[test]
    fn test_remove_axis_drops_trace_annotations() {
        let plot = plot();
        plot.add_y_axis("a");
        let trace = plot
            .add_trace(TraceSpec::new("t", buffer(&[(10.0, 1.0), (60.0, 2.0)])))
            .unwrap();
        plot.add_annotation(trace.id(), "note").unwrap();
        assert_eq!(plot.annotations().len(), 1);

        plot.remove_y_axis(0).unwrap();
        assert!(plot.annotations().is_empty());
        assert!(plot.y_axes().is_empty());
    }

    #[test]
    fn test_removed_annotations_forget_pending_updates() {
        let plot = plot();
        plot.add_y_axis("a");
        let trace = plot
            .add_trace(TraceSpec::new("t", buffer(&[(10.0, 1.0), (60.0, 2.0)])))
            .unwrap();
        plot.add_annotation(trace.id(), "first").unwrap();
        plot.add_annotation(trace.id(), "second").unwrap();
        let ids: Vec<_> = plot.annotations().iter().map(|a| a.id()).collect();

        for &id in &ids {
            plot.update_annotation_position(id, 20.0).unwrap();
        }
        assert_eq!(plot.inner().pending_annotation_updates(), 2);

        plot.remove_annotation(ids[0]).unwrap();
        assert_eq!(plot.inner().pending_annotation_updates(), 1);

        plot.remove_trace(trace.id()).unwrap();
        assert_eq!(plot.inner().pending_annotation_updates(), 0);
    }

    #[test]
    fn test_axis_ids_survive_removal() {
        let plot = plot();
        plot.add_y_axis("a");
        plot.add_y_axis("b");
        let a = plot.y_axis(0).unwrap().id();
        let b = plot.y_axis(1).unwrap().id();
        assert_ne!(a, b);

        plot.remove_y_axis(0).unwrap();
        assert_eq!(plot.y_axis_index(a), None);
        assert_eq!(plot.y_axis_index(b), Some(0));
    }
}
