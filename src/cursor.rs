//! Cursor markers

use crate::trace::Color;
use std::cmp::Ordering;

/// Value readout of one trace at the cursor position
#[derive(Debug, Clone, PartialEq)]
pub struct CursorMarker {
    /// Screen x of the cursor
    pub x: i32,
    /// Screen y of the trace value
    pub y: i32,
    pub color: Color,
    pub label: String,
}

impl CursorMarker {
    pub fn new(x: i32, y: i32, color: Color, label: impl Into<String>) -> Self {
        Self {
            x,
            y,
            color,
            label: label.into(),
        }
    }
}

impl Eq for CursorMarker {}

impl Ord for CursorMarker {
    /// Top to bottom, so labels can be laid out without overlap
    fn cmp(&self, other: &Self) -> Ordering {
        self.y
            .cmp(&other.y)
            .then_with(|| self.x.cmp(&other.x))
            .then_with(|| self.label.cmp(&other.label))
    }
}

impl PartialOrd for CursorMarker {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
