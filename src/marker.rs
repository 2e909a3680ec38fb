//! Vertical position markers

use crate::axis::Position;
use crate::trace::Color;

/// A vertical line at a position on the X axis
#[derive(Debug, Clone, PartialEq)]
pub struct PlotMarker<X: Position> {
    pub color: Color,
    /// Whether the user may drag the marker
    pub interactive: bool,
    pub position: X,
}

impl<X: Position> PlotMarker<X> {
    pub fn new(color: Color, interactive: bool, position: X) -> Self {
        Self {
            color,
            interactive,
            position,
        }
    }
}
