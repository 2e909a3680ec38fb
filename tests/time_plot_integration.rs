//! Integration tests for time plot scrolling

mod common;

use chrono::{Duration, TimeZone, Utc};
use common::listeners::{Recorded, RecordingListener};
use common::wait_for;
use rtplot::{InlineExecutor, PlotConfig, PlotSample, SampleBuffer, TimePlot, TraceSpec};
use std::sync::Arc;

fn time_plot(config: PlotConfig) -> TimePlot {
    TimePlot::new(Arc::new(InlineExecutor), config).unwrap()
}

#[test]
fn test_scroll_step_from_config() {
    let mut config = PlotConfig::default();
    config.scroll.step_secs = 30;
    let plot = time_plot(config);
    assert_eq!(plot.scroll_step(), Duration::seconds(30));
}

#[test]
fn test_ticker_scrolls() {
    let mut config = PlotConfig::default();
    config.scroll.step_secs = 1;
    let plot = time_plot(config);
    let listener = Arc::new(RecordingListener::new());
    plot.add_listener(listener.clone());

    plot.set_scrolling(true).unwrap();
    let first_end = plot.x_axis().value_range().high;

    assert!(wait_for(|| plot.x_axis().value_range().high > first_end));
    assert!(plot.is_scrolling());
    assert!(listener.count(&Recorded::XAxis) >= 2);
    plot.dispose();
}

#[test]
fn test_small_user_change_keeps_scrolling() {
    let plot = time_plot(PlotConfig::default());
    plot.set_scroll_step(Duration::hours(1)).unwrap();
    plot.set_scrolling(true).unwrap();

    // Ending a few minutes earlier is still close to now for a long span
    let range = plot.x_axis().value_range();
    plot.set_x_range(
        range.high - Duration::hours(10),
        range.high - Duration::minutes(5),
    );
    assert!(plot.is_scrolling());
}

#[test]
fn test_scroll_now_keeps_duration() {
    let plot = time_plot(PlotConfig::default());
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    plot.set_x_range(start, start + Duration::minutes(5));

    let now = start + Duration::hours(1);
    plot.scroll_now(now);

    let range = plot.x_axis().value_range();
    assert_eq!(range.high, now + Duration::seconds(10));
    assert_eq!(range.high - range.low, Duration::minutes(5));
}

#[test]
fn test_time_plot_autoscale() {
    let plot = time_plot(PlotConfig::default());
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let buffer = Arc::new(SampleBuffer::new());
    buffer.extend((0..10).map(|i| PlotSample::new(start + Duration::seconds(i), i as f64)));
    plot.add_y_axis("value");
    plot.add_trace(TraceSpec::new("t", buffer)).unwrap();
    plot.set_x_autoscale(true);

    plot.autoscale();

    let range = plot.x_axis().value_range();
    assert_eq!(range.low, start);
    assert_eq!(range.high, start + Duration::seconds(9));
}
