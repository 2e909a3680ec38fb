//! rtplot demo
//!
//! Feeds three sine traces into a plot, autoscales, staggers the Y axes,
//! reads the cursor markers at the middle of the plot, annotates one trace
//! and prints the resulting plot state as JSON.
//!
//! Usage: `rtplot-demo [config.toml]`

use anyhow::Context;
use crossbeam_channel::{unbounded, Receiver, Sender};
use rtplot::{
    config::{self, PlotConfig},
    Axis, Color, Plot, PlotListener, PlotSample, SampleBuffer, ScreenRegion, TaskExecutor,
    ThreadPool, TraceSpec,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const SAMPLES: usize = 500;
const WAIT: Duration = Duration::from_secs(5);

#[derive(Debug)]
enum Event {
    Annotations,
    YAxis(usize),
}

/// Forwards plot changes to the main thread
struct ChannelListener(Sender<Event>);

impl PlotListener<f64> for ChannelListener {
    fn changed_y_axis(&self, index: usize, _axis: &Axis<f64>) {
        let _ = self.0.send(Event::YAxis(index));
    }

    fn changed_annotations(&self) {
        let _ = self.0.send(Event::Annotations);
    }
}

/// Log plot events until `done` holds
fn wait_until(events: &Receiver<Event>, done: impl Fn() -> bool) -> anyhow::Result<()> {
    let deadline = Instant::now() + WAIT;
    while !done() {
        if Instant::now() > deadline {
            anyhow::bail!("Timed out waiting for the plot");
        }
        if let Ok(event) = events.recv_timeout(Duration::from_millis(50)) {
            tracing::debug!("Plot event: {:?}", event);
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,rtplot=debug")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => PlotConfig::load(&path).with_context(|| format!("Loading {}", path))?,
        None => config::default_config_path()
            .map(PlotConfig::load_or_default)
            .unwrap_or_default(),
    };

    let executor: Arc<dyn TaskExecutor> = Arc::new(ThreadPool::from_config(&config)?);
    let mut x_axis = Axis::horizontal("Sample", 0.0, SAMPLES as f64);
    x_axis.set_bounds(ScreenRegion::new(60, 400, 600, 20));
    let plot = Plot::new(x_axis, executor, config)?;

    let (events, received) = unbounded();
    plot.add_listener(Arc::new(ChannelListener(events)));

    let colors = [Color::RED, Color::GREEN, Color::BLUE];
    let mut traces = Vec::new();
    for (i, color) in colors.into_iter().enumerate() {
        let axis = plot.add_y_axis(format!("Signal {}", i + 1));
        plot.set_y_axis_bounds(axis, ScreenRegion::new(0, 0, 60, 400))?;

        let buffer = Arc::new(SampleBuffer::from_config(plot.config()));
        let amplitude = 10f64.powi(i as i32);
        buffer.extend((0..SAMPLES).map(|n| {
            let x = n as f64;
            PlotSample::new(x, amplitude * (x / 40.0 + i as f64).sin())
        }));
        let spec = TraceSpec::new(format!("sine {}", i + 1), buffer)
            .with_units("V")
            .with_color(color)
            .on_axis(axis);
        traces.push(plot.add_trace(spec)?);
    }

    plot.enable_autoscale();
    plot.autoscale();
    tracing::info!("Autoscaled {} Y axes", plot.y_axes().len());

    plot.stagger(true);
    wait_until(&received, || plot.can_undo())?;

    let (markers_tx, markers_rx) = crossbeam_channel::bounded(1);
    plot.update_cursor_markers(360, move |markers| {
        let _ = markers_tx.send(markers);
    });
    let markers = markers_rx.recv_timeout(WAIT)?;

    plot.add_annotation(traces[0].id(), "Middle")?;
    wait_until(&received, || plot.user_annotation_count() > 0)?;

    let summary = serde_json::json!({
        "x_axis": format!("{:?}", plot.x_axis().value_range()),
        "y_axes": plot
            .y_axes()
            .iter()
            .map(|axis| {
                let range = axis.axis().value_range();
                serde_json::json!({ "name": axis.axis().name(), "low": range.low, "high": range.high })
            })
            .collect::<Vec<_>>(),
        "cursor": markers.iter().map(|m| m.label.clone()).collect::<Vec<_>>(),
        "annotations": plot
            .annotations()
            .iter()
            .map(|a| serde_json::json!({ "text": a.text, "position": a.position, "value": a.value }))
            .collect::<Vec<_>>(),
        "undo": plot.undo_label(),
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);

    plot.dispose();
    tracing::info!("Done");
    Ok(())
}
