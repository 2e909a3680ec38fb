//! Integration tests for cursor markers and annotations

mod common;

use common::builders::{buffer, PlotBuilder};
use common::listeners::{Recorded, RecordingListener};
use common::QueuedExecutor;
use rtplot::{Annotation, Color, Plot, PlotError, ScreenRegion, Trace, TraceSpec};
use std::sync::Arc;

/// Plot with one Y axis over 0..10 drawn from pixel 100 (bottom) to 0 (top)
fn plot_with_axis() -> Plot<f64> {
    let plot = PlotBuilder::new().build();
    plot.add_y_axis("y");
    plot.set_y_axis_bounds(0, ScreenRegion::new(0, 0, 40, 101))
        .unwrap();
    plot
}

fn markers_at(plot: &Plot<f64>, cursor_x: i32) -> Vec<rtplot::CursorMarker> {
    let (sender, receiver) = crossbeam_channel::bounded(1);
    plot.update_cursor_markers(cursor_x, move |markers| {
        sender.send(markers).unwrap();
    });
    receiver.recv_timeout(common::test_timeout()).unwrap()
}

fn annotated_trace(plot: &Plot<f64>) -> Arc<Trace<f64>> {
    plot.add_trace(TraceSpec::new(
        "t",
        buffer(&[(0.0, 1.0), (40.0, 2.0), (60.0, 8.0)]),
    ))
    .unwrap()
}

#[test]
fn test_cursor_markers_sorted_and_labelled() {
    let plot = plot_with_axis();
    let low = plot
        .add_trace(
            TraceSpec::new("low", buffer(&[(0.0, 1.0), (40.0, 2.0), (60.0, 8.0)]))
                .with_units("V")
                .with_color(Color::RED),
        )
        .unwrap();
    plot.add_trace(TraceSpec::new("high", buffer(&[(10.0, 5.0)])).with_color(Color::BLUE))
        .unwrap();

    let markers = markers_at(&plot, 50);

    assert_eq!(markers.len(), 2);
    assert_eq!(markers[0].y, 50);
    assert_eq!(markers[0].label, "5.00");
    assert_eq!(markers[0].color, Color::BLUE);
    assert_eq!(markers[1].y, 80);
    assert_eq!(markers[1].label, "2.00 V");
    assert!(markers.iter().all(|m| m.x == 50));
    assert_eq!(low.selected_sample().map(|s| s.position), Some(40.0));
}

#[test]
fn test_cursor_skips_out_of_range_and_missing_samples() {
    let plot = plot_with_axis();
    let outside = plot
        .add_trace(TraceSpec::new("outside", buffer(&[(10.0, 20.0)])))
        .unwrap();
    let late = plot
        .add_trace(TraceSpec::new("late", buffer(&[(70.0, 1.0)])))
        .unwrap();
    let gap = plot
        .add_trace(TraceSpec::new("gap", buffer(&[(10.0, 1.0), (20.0, f64::NAN)])))
        .unwrap();

    assert!(markers_at(&plot, 50).is_empty());
    assert!(outside.selected_sample().is_some());
    assert!(late.selected_sample().is_none());
    assert!(gap.selected_sample().is_some());
}

#[test]
fn test_annotation_binds_to_sample_after_screen_middle() {
    let plot = plot_with_axis();
    let trace = annotated_trace(&plot);
    let listener = Arc::new(RecordingListener::new());
    plot.add_listener(listener.clone());

    plot.add_annotation(trace.id(), "note").unwrap();

    let annotations = plot.annotations();
    assert_eq!(annotations.len(), 1);
    assert_eq!(annotations[0].position, 60.0);
    assert_eq!(annotations[0].value, 8.0);
    assert_eq!(annotations[0].offset, (20.0, -20.0));
    assert_eq!(annotations[0].text, "note");
    assert_eq!(listener.count(&Recorded::Annotations), 1);
    assert_eq!(plot.undo_label().as_deref(), Some("Add annotation"));
}

#[test]
fn test_annotation_without_later_sample_is_not_added() {
    let plot = plot_with_axis();
    let trace = plot
        .add_trace(TraceSpec::new("t", buffer(&[(0.0, 1.0), (10.0, 2.0)])))
        .unwrap();

    plot.add_annotation(trace.id(), "note").unwrap();

    assert!(plot.annotations().is_empty());
    assert!(!plot.can_undo());
}

#[test]
fn test_annotation_undo_redo() {
    let plot = plot_with_axis();
    let trace = annotated_trace(&plot);
    plot.add_annotation(trace.id(), "note").unwrap();
    let id = plot.annotations()[0].id();

    assert!(plot.undo());
    assert!(plot.annotations().is_empty());
    assert!(plot.redo());
    assert_eq!(plot.annotations()[0].id(), id);

    plot.remove_annotation(id).unwrap();
    assert!(plot.annotations().is_empty());
    assert!(plot.undo());
    assert_eq!(plot.annotations().len(), 1);
}

#[test]
fn test_annotation_position_update() {
    let plot = plot_with_axis();
    let trace = annotated_trace(&plot);
    plot.add_annotation(trace.id(), "note").unwrap();
    let id = plot.annotations()[0].id();

    plot.update_annotation_position(id, 45.0).unwrap();
    assert_eq!(plot.annotations()[0].position, 40.0);
    assert_eq!(plot.annotations()[0].value, 2.0);

    // No sample at or before the location: stays put
    plot.update_annotation_position(id, -5.0).unwrap();
    assert_eq!(plot.annotations()[0].position, 40.0);

    // Position updates are not undoable
    assert_eq!(plot.undo_label().as_deref(), Some("Add annotation"));
}

#[test]
fn test_latest_annotation_position_wins() {
    let executor = Arc::new(QueuedExecutor::new());
    let plot = PlotBuilder::new().executor(executor.clone()).build();
    plot.add_y_axis("y");
    let trace = annotated_trace(&plot);
    let annotation = Annotation::new(trace.id(), 0.0, 1.0, "note");
    let id = annotation.id();
    plot.add_annotation_direct(annotation).unwrap();

    plot.update_annotation_position(id, 100.0).unwrap();
    plot.update_annotation_position(id, 45.0).unwrap();
    executor.run_all();

    assert_eq!(plot.annotations()[0].position, 40.0);
}

#[test]
fn test_annotation_edits() {
    let plot = plot_with_axis();
    let trace = annotated_trace(&plot);
    let annotation = Annotation::new(trace.id(), 40.0, 2.0, "a");
    let id = annotation.id();
    plot.add_annotation_direct(annotation).unwrap();
    plot.add_annotation_direct(Annotation::new(trace.id(), 0.0, 1.0, "internal").internal())
        .unwrap();

    plot.update_annotation_text(id, "b").unwrap();
    plot.set_annotation_offset(id, (5.0, 5.0)).unwrap();

    let edited = plot
        .annotations()
        .into_iter()
        .find(|a| a.id() == id)
        .unwrap();
    assert_eq!(edited.text, "b");
    assert_eq!(edited.offset, (5.0, 5.0));
    assert_eq!(plot.user_annotation_count(), 1);
}

#[test]
fn test_unknown_annotation_and_trace() {
    let plot = plot_with_axis();
    let trace = annotated_trace(&plot);
    let orphan = Annotation::new(trace.id(), 0.0, 1.0, "x");
    let id = orphan.id();

    assert!(matches!(
        plot.update_annotation_position(id, 1.0),
        Err(PlotError::UnknownAnnotation(_))
    ));
    assert!(matches!(plot.remove_annotation(id), Err(PlotError::UnknownAnnotation(_))));

    plot.remove_trace(trace.id()).unwrap();
    assert!(matches!(
        plot.add_annotation(trace.id(), "gone"),
        Err(PlotError::UnknownTrace(_))
    ));
}

#[test]
fn test_removing_trace_drops_its_annotations() {
    let plot = plot_with_axis();
    let trace = annotated_trace(&plot);
    plot.add_annotation(trace.id(), "note").unwrap();

    plot.remove_trace(trace.id()).unwrap();

    assert!(plot.annotations().is_empty());
}
