//! Plot change notifications
//!
//! A rendering host registers a [`PlotListener`] to learn when it has to
//! redraw. Callbacks may arrive on worker threads and are never invoked while
//! the plot holds one of its locks, so a listener may call back into the plot.

use crate::axis::{Axis, Position};

/// Receiver of plot changes; every callback defaults to a no-op
pub trait PlotListener<X: Position>: Send + Sync {
    /// The X axis range changed
    fn changed_x_axis(&self, _axis: &Axis<X>) {}

    /// The range of Y axis `index` changed
    fn changed_y_axis(&self, _index: usize, _axis: &Axis<f64>) {}

    /// Autoscale of Y axis `index` was turned on or off
    fn changed_autoscale(&self, _index: usize, _enabled: bool) {}

    /// Log scale of Y axis `index` was turned on or off
    fn changed_log_scale(&self, _index: usize, _enabled: bool) {}

    /// Grid of Y axis `index` was shown or hidden
    fn changed_grid(&self, _index: usize, _enabled: bool) {}

    fn changed_annotations(&self) {}

    fn changed_markers(&self) {}

    /// Traces were added, moved or removed
    fn changed_traces(&self) {}

    /// The throttled update ran; the host should redraw
    fn refresh_requested(&self) {}
}
