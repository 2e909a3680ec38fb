//! Listeners recording plot notifications

use rtplot::{Axis, Position, PlotListener};
use std::sync::Mutex;

/// A recorded notification
#[derive(Debug, Clone, PartialEq)]
pub enum Recorded {
    XAxis,
    YAxis(usize),
    Autoscale(usize, bool),
    LogScale(usize, bool),
    Grid(usize, bool),
    Annotations,
    Markers,
    Traces,
    Refresh,
}

/// Records every notification in order
#[derive(Default)]
pub struct RecordingListener {
    events: Mutex<Vec<Recorded>>,
}

impl RecordingListener {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, event: Recorded) {
        self.events.lock().unwrap().push(event);
    }

    pub fn events(&self) -> Vec<Recorded> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self, event: &Recorded) -> usize {
        self.events.lock().unwrap().iter().filter(|e| *e == event).count()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}

impl<X: Position> PlotListener<X> for RecordingListener {
    fn changed_x_axis(&self, _axis: &Axis<X>) {
        self.record(Recorded::XAxis);
    }

    fn changed_y_axis(&self, index: usize, _axis: &Axis<f64>) {
        self.record(Recorded::YAxis(index));
    }

    fn changed_autoscale(&self, index: usize, enabled: bool) {
        self.record(Recorded::Autoscale(index, enabled));
    }

    fn changed_log_scale(&self, index: usize, enabled: bool) {
        self.record(Recorded::LogScale(index, enabled));
    }

    fn changed_grid(&self, index: usize, enabled: bool) {
        self.record(Recorded::Grid(index, enabled));
    }

    fn changed_annotations(&self) {
        self.record(Recorded::Annotations);
    }

    fn changed_markers(&self) {
        self.record(Recorded::Markers);
    }

    fn changed_traces(&self) {
        self.record(Recorded::Traces);
    }

    fn refresh_requested(&self) {
        self.record(Recorded::Refresh);
    }
}
