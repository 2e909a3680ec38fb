//! Annotations attached to trace samples

use crate::axis::Position;
use crate::trace::TraceId;
use std::sync::atomic::{AtomicU64, Ordering};

/// Global counter for generating unique annotation IDs
static NEXT_ANNOTATION_ID: AtomicU64 = AtomicU64::new(1);

/// Unique identifier of an annotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnnotationId(u64);

impl AnnotationId {
    fn next() -> Self {
        AnnotationId(NEXT_ANNOTATION_ID.fetch_add(1, Ordering::SeqCst))
    }
}

impl std::fmt::Display for AnnotationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "annotation-{}", self.0)
    }
}

/// A label bound to one sample of a trace
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation<X: Position> {
    id: AnnotationId,
    /// Managed by the plot itself, not counted as a user annotation
    pub internal: bool,
    pub trace: TraceId,
    pub position: X,
    pub value: f64,
    /// Screen offset of the label from the sample
    pub offset: (f64, f64),
    pub text: String,
}

impl<X: Position> Annotation<X> {
    pub fn new(trace: TraceId, position: X, value: f64, text: impl Into<String>) -> Self {
        Self {
            id: AnnotationId::next(),
            internal: false,
            trace,
            position,
            value,
            offset: (20.0, -20.0),
            text: text.into(),
        }
    }

    pub fn with_offset(mut self, offset: (f64, f64)) -> Self {
        self.offset = offset;
        self
    }

    pub fn internal(mut self) -> Self {
        self.internal = true;
        self
    }

    pub fn id(&self) -> AnnotationId {
        self.id
    }

    pub fn is_internal(&self) -> bool {
        self.internal
    }
}
