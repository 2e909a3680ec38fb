//! Traces: data series drawn against a Y axis
//!
//! A [`Trace`] couples a [`PlotDataProvider`] with the cosmetic attributes
//! a renderer needs. Traces are shared as `Arc<Trace<X>>` between the plot
//! and background computations; only the selected cursor sample changes
//! after creation.

use crate::axis::Position;
use crate::data::{PlotDataProvider, PlotSample};
use crate::sync;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Global counter for generating unique trace IDs
static NEXT_TRACE_ID: AtomicU64 = AtomicU64::new(1);

/// Unique identifier of a trace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TraceId(u64);

impl TraceId {
    fn next() -> Self {
        TraceId(NEXT_TRACE_ID.fetch_add(1, Ordering::SeqCst))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for TraceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "trace-{}", self.0)
    }
}

/// RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color(pub [u8; 4]);

impl Color {
    pub const BLACK: Color = Color([0, 0, 0, 255]);
    pub const RED: Color = Color([255, 0, 0, 255]);
    pub const GREEN: Color = Color([0, 180, 0, 255]);
    pub const BLUE: Color = Color([0, 0, 255, 255]);

    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color([r, g, b, 255])
    }

    /// Distinct color for the `index`-th trace, spread around the hue circle
    pub fn for_index(index: u32) -> Self {
        // Golden angle keeps neighbouring indices far apart
        let hue = (index as f64 * 137.508) % 360.0;
        let (r, g, b) = hsv_to_rgb(hue, 0.75, 0.85);
        Color::rgb(r, g, b)
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

fn hsv_to_rgb(hue: f64, saturation: f64, value: f64) -> (u8, u8, u8) {
    let c = value * saturation;
    let x = c * (1.0 - ((hue / 60.0) % 2.0 - 1.0).abs());
    let m = value - c;
    let (r, g, b) = match (hue / 60.0) as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let to_byte = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    (to_byte(r), to_byte(g), to_byte(b))
}

/// How samples of a trace are connected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TraceType {
    /// Points only
    None,
    /// Straight lines between samples
    #[default]
    Lines,
    /// Horizontal-then-vertical steps
    Step,
    /// Area filled down to the axis
    Area,
    /// Vertical bars
    Bars,
}

/// Marker drawn at each sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PointType {
    #[default]
    None,
    Squares,
    Circles,
    Diamonds,
    XMarks,
    Triangles,
}

/// Everything needed to add a trace to a plot
pub struct TraceSpec<X: Position> {
    pub name: String,
    pub units: String,
    pub data: Arc<dyn PlotDataProvider<X>>,
    pub color: Color,
    pub trace_type: TraceType,
    pub width: u32,
    pub point_type: PointType,
    pub point_size: u32,
    /// Index of the Y axis the trace is drawn against
    pub y_axis: usize,
}

impl<X: Position> TraceSpec<X> {
    pub fn new(name: impl Into<String>, data: Arc<dyn PlotDataProvider<X>>) -> Self {
        Self {
            name: name.into(),
            units: String::new(),
            data,
            color: Color::default(),
            trace_type: TraceType::default(),
            width: 1,
            point_type: PointType::default(),
            point_size: 5,
            y_axis: 0,
        }
    }

    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = units.into();
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_trace_type(mut self, trace_type: TraceType, width: u32) -> Self {
        self.trace_type = trace_type;
        self.width = width;
        self
    }

    pub fn with_points(mut self, point_type: PointType, size: u32) -> Self {
        self.point_type = point_type;
        self.point_size = size;
        self
    }

    pub fn on_axis(mut self, y_axis: usize) -> Self {
        self.y_axis = y_axis;
        self
    }
}

/// A data series shown in the plot
pub struct Trace<X: Position> {
    id: TraceId,
    name: String,
    units: String,
    data: Arc<dyn PlotDataProvider<X>>,
    color: Color,
    trace_type: TraceType,
    width: u32,
    point_type: PointType,
    point_size: u32,
    /// Sample under the cursor, updated by cursor tracking
    selected: Mutex<Option<PlotSample<X>>>,
}

impl<X: Position> Trace<X> {
    pub(crate) fn from_spec(spec: TraceSpec<X>) -> Self {
        Self {
            id: TraceId::next(),
            name: spec.name,
            units: spec.units,
            data: spec.data,
            color: spec.color,
            trace_type: spec.trace_type,
            width: spec.width,
            point_type: spec.point_type,
            point_size: spec.point_size,
            selected: Mutex::new(None),
        }
    }

    pub fn id(&self) -> TraceId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn units(&self) -> &str {
        &self.units
    }

    pub fn data(&self) -> &Arc<dyn PlotDataProvider<X>> {
        &self.data
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn trace_type(&self) -> TraceType {
        self.trace_type
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn point_type(&self) -> PointType {
        self.point_type
    }

    pub fn point_size(&self) -> u32 {
        self.point_size
    }

    /// Sample selected by the last cursor update
    pub fn selected_sample(&self) -> Option<PlotSample<X>> {
        *sync::lock(&self.selected)
    }

    pub(crate) fn select_sample(&self, sample: Option<PlotSample<X>>) {
        *sync::lock(&self.selected) = sample;
    }
}

impl<X: Position> std::fmt::Debug for Trace<X> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Trace")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("units", &self.units)
            .field("samples", &self.data.len())
            .field("color", &self.color)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::SampleBuffer;

    #[test]
    fn test_trace_ids_are_unique() {
        let data: Arc<dyn PlotDataProvider<f64>> = Arc::new(SampleBuffer::new());
        let a = Trace::from_spec(TraceSpec::new("a", Arc::clone(&data)));
        let b = Trace::from_spec(TraceSpec::new("b", data));
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_spec_builder() {
        let data: Arc<dyn PlotDataProvider<f64>> = Arc::new(SampleBuffer::new());
        let spec = TraceSpec::new("pressure", data)
            .with_units("mbar")
            .with_color(Color::RED)
            .with_trace_type(TraceType::Step, 2)
            .with_points(PointType::Circles, 3)
            .on_axis(1);
        let trace = Trace::from_spec(spec);
        assert_eq!(trace.units(), "mbar");
        assert_eq!(trace.color(), Color::RED);
        assert_eq!(trace.trace_type(), TraceType::Step);
        assert_eq!(trace.point_size(), 3);
    }

    #[test]
    fn test_selected_sample() {
        let data: Arc<dyn PlotDataProvider<f64>> = Arc::new(SampleBuffer::new());
        let trace = Trace::from_spec(TraceSpec::new("a", data));
        assert!(trace.selected_sample().is_none());
        trace.select_sample(Some(PlotSample::new(1.0, 2.0)));
        assert_eq!(trace.selected_sample(), Some(PlotSample::new(1.0, 2.0)));
    }

    #[test]
    fn test_colors_for_index_differ() {
        assert_ne!(Color::for_index(0), Color::for_index(1));
        assert_eq!(Color::for_index(0).0[3], 255);
    }
}
