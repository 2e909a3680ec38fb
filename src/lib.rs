//! # rtplot-rs: Real-Time Plot Engine
//!
//! The headless core of a real-time plot: axes with linear or logarithmic
//! screen transforms, zoom and pan, autoscale and stagger of Y axes over live
//! sample buffers, cursor markers and annotations bound to samples. A
//! rendering host lays out the axes, forwards user input and redraws when a
//! [`PlotListener`] tells it to.
//!
//! ## Architecture
//!
//! - **Data**: Traces read immutable snapshots from [`PlotDataProvider`]s, so
//!   writers never block a range scan
//! - **Plot**: [`Plot`] owns axes, traces, markers, annotations and the undo
//!   history; [`TimePlot`] adds scrolling over wall-clock time
//! - **Processing**: [`PlotProcessor`] scans data on a [`TaskExecutor`]
//!   (normally a [`ThreadPool`]) for autoscale, stagger and cursor markers
//! - **Updates**: [`UpdateThrottle`] coalesces data-driven update requests
//!
//! ## Configuration
//!
//! [`PlotConfig`] is stored as TOML in the platform configuration directory
//! under `rtplot/plot.toml`:
//!
//! - **Linux**: `~/.config/rtplot/plot.toml`
//! - **macOS**: `~/Library/Application Support/rtplot/plot.toml`
//! - **Windows**: `%APPDATA%\rtplot\plot.toml`
//!
//! ## Example
//!
//! ```ignore
//! use rtplot::{
//!     config::PlotConfig, Axis, Plot, PlotSample, SampleBuffer, ThreadPool, TraceSpec,
//! };
//! use std::sync::Arc;
//!
//! let config = rtplot::config::default_config_path()
//!     .map(PlotConfig::load_or_default)
//!     .unwrap_or_default();
//! let pool = Arc::new(ThreadPool::from_config(&config)?);
//! let plot = Plot::new(Axis::horizontal("Index", 0.0, 100.0), pool, config)?;
//!
//! let axis = plot.add_y_axis("Signal");
//! let buffer = Arc::new(SampleBuffer::from_config(plot.config()));
//! plot.add_trace(TraceSpec::new("sine", buffer.clone()).on_axis(axis))?;
//!
//! buffer.push(PlotSample::new(0.0, 1.0));
//! plot.set_autoscale(axis, true)?;
//! plot.request_update();
//! ```

mod sync;

pub mod annotation;
pub mod axis;
pub mod config;
pub mod cursor;
pub mod data;
pub mod error;
pub mod executor;
pub mod history;
pub mod listener;
pub mod marker;
pub mod plot;
pub mod processor;
pub mod throttle;
pub mod time_plot;
pub mod trace;

// Re-export commonly used types
pub use annotation::{Annotation, AnnotationId};
pub use axis::{Axis, AxisId, Position, ScreenRegion, YAxis};
pub use config::PlotConfig;
pub use cursor::CursorMarker;
pub use data::{
    AxisRange, DataSnapshot, PlotDataProvider, PlotSample, SampleBuffer, ValueRange,
    XyDataProvider,
};
pub use error::{PlotError, Result};
pub use executor::{InlineExecutor, TaskExecutor, TaskHandle, ThreadPool};
pub use history::{PlotCommand, UndoHistory};
pub use listener::PlotListener;
pub use marker::PlotMarker;
pub use plot::Plot;
pub use processor::PlotProcessor;
pub use throttle::UpdateThrottle;
pub use time_plot::TimePlot;
pub use trace::{Color, PointType, Trace, TraceId, TraceSpec, TraceType};
