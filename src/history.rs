//! Undoable plot commands
//!
//! Operations that a user would want to take back (stagger, range edits from
//! a configuration dialog, adding or removing annotations) are expressed as
//! [`PlotCommand`] values. A command only describes the change; the plot
//! applies it, and [`Plot::execute`](crate::plot::Plot::execute) records it in
//! an [`UndoHistory`]. Autoscale, zoom and pan bypass the history.

use crate::annotation::Annotation;
use crate::axis::{AxisId, Position};
use crate::data::AxisRange;

/// A reversible change to a plot
#[derive(Debug, Clone, PartialEq)]
pub enum PlotCommand<X: Position> {
    /// Set the ranges of several Y axes at once
    ChangeYRanges {
        label: String,
        axes: Vec<AxisId>,
        original: Vec<AxisRange<f64>>,
        new: Vec<AxisRange<f64>>,
    },
    /// Set the X axis range
    ChangeXRange {
        label: String,
        original: AxisRange<X>,
        new: AxisRange<X>,
    },
    AddAnnotation(Annotation<X>),
    RemoveAnnotation(Annotation<X>),
}

impl<X: Position> PlotCommand<X> {
    /// Text for undo/redo menu entries
    pub fn label(&self) -> &str {
        match self {
            PlotCommand::ChangeYRanges { label, .. } | PlotCommand::ChangeXRange { label, .. } => {
                label
            }
            PlotCommand::AddAnnotation(_) => "Add annotation",
            PlotCommand::RemoveAnnotation(_) => "Remove annotation",
        }
    }

    /// The command that undoes this one
    pub fn reversed(&self) -> PlotCommand<X> {
        match self {
            PlotCommand::ChangeYRanges {
                label,
                axes,
                original,
                new,
            } => PlotCommand::ChangeYRanges {
                label: label.clone(),
                axes: axes.clone(),
                original: new.clone(),
                new: original.clone(),
            },
            PlotCommand::ChangeXRange {
                label,
                original,
                new,
            } => PlotCommand::ChangeXRange {
                label: label.clone(),
                original: *new,
                new: *original,
            },
            PlotCommand::AddAnnotation(a) => PlotCommand::RemoveAnnotation(a.clone()),
            PlotCommand::RemoveAnnotation(a) => PlotCommand::AddAnnotation(a.clone()),
        }
    }
}

/// Bounded undo/redo stacks
#[derive(Debug, Clone)]
pub struct UndoHistory<C> {
    done: Vec<C>,
    undone: Vec<C>,
    max_size: usize,
}

impl<C: Clone> UndoHistory<C> {
    pub fn new(max_size: usize) -> Self {
        Self {
            done: Vec::new(),
            undone: Vec::new(),
            max_size: max_size.max(1),
        }
    }

    /// Record an executed command; clears the redo stack
    pub fn push(&mut self, command: C) {
        self.undone.clear();
        self.done.push(command);
        if self.done.len() > self.max_size {
            self.done.remove(0);
        }
    }

    /// Move the latest command to the redo stack and return it
    pub fn undo(&mut self) -> Option<C> {
        let command = self.done.pop()?;
        self.undone.push(command.clone());
        Some(command)
    }

    /// Move the latest undone command back and return it
    pub fn redo(&mut self) -> Option<C> {
        let command = self.undone.pop()?;
        self.done.push(command.clone());
        Some(command)
    }

    pub fn can_undo(&self) -> bool {
        !self.done.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.undone.is_empty()
    }

    /// Next command [`undo`](Self::undo) would return
    pub fn peek_undo(&self) -> Option<&C> {
        self.done.last()
    }

    pub fn peek_redo(&self) -> Option<&C> {
        self.undone.last()
    }

    pub fn clear(&mut self) {
        self.done.clear();
        self.undone.clear();
    }

    pub fn len(&self) -> usize {
        self.done.len()
    }

    pub fn is_empty(&self) -> bool {
        self.done.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undo_redo() {
        let mut history = UndoHistory::new(10);
        history.push(1);
        history.push(2);
        assert_eq!(history.undo(), Some(2));
        assert!(history.can_redo());
        assert_eq!(history.redo(), Some(2));
        assert!(!history.can_redo());
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_push_clears_redo() {
        let mut history = UndoHistory::new(10);
        history.push(1);
        history.undo();
        history.push(3);
        assert!(!history.can_redo());
        assert_eq!(history.peek_undo(), Some(&3));
    }

    #[test]
    fn test_max_size_drops_oldest() {
        let mut history = UndoHistory::new(3);
        for i in 0..5 {
            history.push(i);
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.undo(), Some(4));
        assert_eq!(history.undo(), Some(3));
        assert_eq!(history.undo(), Some(2));
        assert_eq!(history.undo(), None);
    }

    #[test]
    fn test_reversed_range_command() {
        let cmd: PlotCommand<f64> = PlotCommand::ChangeXRange {
            label: "Zoom".to_string(),
            original: AxisRange::new(0.0, 10.0),
            new: AxisRange::new(5.0, 6.0),
        };
        let back = cmd.reversed();
        assert_eq!(back.label(), "Zoom");
        assert_eq!(back.reversed(), cmd);
    }
}
