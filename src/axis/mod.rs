//! Plot axes
//!
//! An [`Axis`] holds a value range, its on-screen pixel extent, and the
//! autoscale, log-scale, grid and visibility flags. It converts between values
//! and screen coordinates and implements zoom and pan.
//!
//! # Main Types
//!
//! - [`Axis`] - Horizontal (position) or vertical (value) axis
//! - [`YAxis`] - A value axis together with the traces drawn against it
//! - [`Position`] - Capabilities of horizontal position types (`f64`, `DateTime<Utc>`)
//! - [`ScreenTransform`] - Linear/logarithmic value to pixel mapping
//!
//! # Orientation
//!
//! Horizontal axes map `low` to the left edge of their region. Vertical axes
//! map `low` to the bottom edge. An inverted value range (`low > high`) flips
//! the direction without any special casing.

pub mod format;
pub mod position;
pub mod transform;

pub use position::Position;
pub use transform::{Log10, ScreenTransform};

use crate::data::AxisRange;
use crate::trace::Trace;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Global counter for generating unique Y axis IDs
static NEXT_AXIS_ID: AtomicU64 = AtomicU64::new(1);

/// Identifier of a Y axis that stays valid while other axes come and go
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AxisId(u64);

impl AxisId {
    fn next() -> Self {
        AxisId(NEXT_AXIS_ID.fetch_add(1, Ordering::SeqCst))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for AxisId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "axis-{}", self.0)
    }
}

/// Pixel region occupied by an axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScreenRegion {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl ScreenRegion {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// An axis with a value range mapped onto a pixel extent
#[derive(Debug, Clone)]
pub struct Axis<X: Position> {
    name: String,
    horizontal: bool,
    range: AxisRange<X>,
    /// Pixel for `range.low` and pixel for `range.high`
    screen: AxisRange<i32>,
    autoscale: bool,
    log_scale: bool,
    grid: bool,
    visible: bool,
}

impl<X: Position> Axis<X> {
    /// Create a horizontal axis
    pub fn horizontal(name: impl Into<String>, low: X, high: X) -> Self {
        Self::new(name, true, low, high)
    }

    /// Create a vertical axis
    pub fn vertical(name: impl Into<String>, low: X, high: X) -> Self {
        Self::new(name, false, low, high)
    }

    fn new(name: impl Into<String>, horizontal: bool, low: X, high: X) -> Self {
        Self {
            name: name.into(),
            horizontal,
            range: AxisRange::new(low, high),
            screen: AxisRange::new(0, 0),
            autoscale: false,
            log_scale: false,
            grid: false,
            visible: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn is_horizontal(&self) -> bool {
        self.horizontal
    }

    /// Current value range
    pub fn value_range(&self) -> AxisRange<X> {
        self.range
    }

    /// Set the value range
    ///
    /// Returns `true` if the range changed. Ranges with non-finite bounds are
    /// ignored.
    pub fn set_value_range(&mut self, low: X, high: X) -> bool {
        if !low.to_scalar().is_finite() || !high.to_scalar().is_finite() {
            tracing::debug!("Axis '{}': ignoring non-finite range {:?}..{:?}", self.name, low, high);
            return false;
        }
        let range = AxisRange::new(low, high);
        if range == self.range {
            return false;
        }
        self.range = range;
        true
    }

    /// Pixel extent, as pixel for `low` and pixel for `high`
    pub fn screen_range(&self) -> AxisRange<i32> {
        self.screen
    }

    /// Assign the pixel region laid out for this axis
    pub fn set_bounds(&mut self, region: ScreenRegion) {
        self.screen = if self.horizontal {
            AxisRange::new(region.x, region.x + region.width - 1)
        } else {
            AxisRange::new(region.y + region.height - 1, region.y)
        };
    }

    pub fn is_autoscale(&self) -> bool {
        self.autoscale
    }

    /// Returns `true` if the flag changed
    pub fn set_autoscale(&mut self, autoscale: bool) -> bool {
        std::mem::replace(&mut self.autoscale, autoscale) != autoscale
    }

    pub fn is_logarithmic(&self) -> bool {
        self.log_scale
    }

    /// Returns `true` if the flag changed
    pub fn set_logarithmic(&mut self, log_scale: bool) -> bool {
        std::mem::replace(&mut self.log_scale, log_scale) != log_scale
    }

    pub fn is_grid_visible(&self) -> bool {
        self.grid
    }

    /// Returns `true` if the flag changed
    pub fn set_grid_visible(&mut self, grid: bool) -> bool {
        std::mem::replace(&mut self.grid, grid) != grid
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Transform for the current range and pixel extent
    pub fn transform(&self) -> ScreenTransform {
        let low = self.range.low.to_scalar();
        let high = self.range.high.to_scalar();
        if self.log_scale {
            ScreenTransform::logarithmic(low, high, self.screen.low, self.screen.high)
        } else {
            ScreenTransform::linear(low, high, self.screen.low, self.screen.high)
        }
    }

    /// Screen coordinate of `value`
    pub fn screen_coord(&self, value: X) -> i32 {
        self.transform().transform(value.to_scalar()).round() as i32
    }

    /// Value at screen coordinate `coord`
    pub fn value_at(&self, coord: i32) -> X {
        X::from_scalar(self.transform().inverse(coord as f64))
    }

    /// Zoom around the pixel `center` by `factor`
    ///
    /// The value at `center` stays fixed; the distances to both ends of the
    /// range are multiplied by `factor`. Returns `true` if the range changed.
    pub fn zoom(&mut self, center: i32, factor: f64) -> bool {
        let fixed = self.value_at(center);
        if self.log_scale {
            let fixed_log = Log10::log10(fixed.to_scalar());
            let low = Log10::log10(self.range.low.to_scalar());
            let high = Log10::log10(self.range.high.to_scalar());
            let new_low = Log10::pow10(fixed_log - (fixed_log - low) * factor);
            let new_high = Log10::pow10(fixed_log + (high - fixed_log) * factor);
            return self.set_value_range(X::from_scalar(new_low), X::from_scalar(new_high));
        }
        let new_low = fixed.shift(X::scale_span(X::span_between(fixed, self.range.low), factor));
        let new_high = fixed.shift(X::scale_span(X::span_between(fixed, self.range.high), factor));
        self.set_value_range(new_low, new_high)
    }

    /// Shift `original` by the distance from `to` back to `from`
    ///
    /// Used while dragging: `from` is the value under the pointer when the
    /// drag started, `to` the value under it now. The span is preserved
    /// exactly. Returns `true` if the range changed.
    pub fn pan(&mut self, original: AxisRange<X>, from: X, to: X) -> bool {
        if self.log_scale {
            let shift = Log10::log10(from.to_scalar()) - Log10::log10(to.to_scalar());
            let low = Log10::pow10(Log10::log10(original.low.to_scalar()) + shift);
            let high = Log10::pow10(Log10::log10(original.high.to_scalar()) + shift);
            return self.set_value_range(X::from_scalar(low), X::from_scalar(high));
        }
        let shift = X::span_between(to, from);
        self.set_value_range(original.low.shift(shift), original.high.shift(shift))
    }
}

/// A value axis and the traces drawn against it
#[derive(Debug, Clone)]
pub struct YAxis<X: Position> {
    id: AxisId,
    axis: Axis<f64>,
    traces: Vec<Arc<Trace<X>>>,
}

impl<X: Position> YAxis<X> {
    pub fn new(name: impl Into<String>, low: f64, high: f64) -> Self {
        Self {
            id: AxisId::next(),
            axis: Axis::vertical(name, low, high),
            traces: Vec::new(),
        }
    }

    pub fn id(&self) -> AxisId {
        self.id
    }

    pub fn axis(&self) -> &Axis<f64> {
        &self.axis
    }

    pub fn axis_mut(&mut self) -> &mut Axis<f64> {
        &mut self.axis
    }

    pub fn traces(&self) -> &[Arc<Trace<X>>] {
        &self.traces
    }

    pub(crate) fn add_trace(&mut self, trace: Arc<Trace<X>>) {
        self.traces.push(trace);
    }

    /// Remove the trace with the same id, returning it
    pub(crate) fn take_trace(&mut self, trace: &Trace<X>) -> Option<Arc<Trace<X>>> {
        let idx = self.traces.iter().position(|t| t.id() == trace.id())?;
        Some(self.traces.remove(idx))
    }
}
