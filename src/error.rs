//! Error handling for the plot engine
//!
//! This module defines the engine's error type and a Result alias for use
//! throughout the crate. Failures inside background range computations are
//! not surfaced through this type; they are logged and the affected axis is
//! skipped for that pass.

use crate::annotation::AnnotationId;
use crate::trace::TraceId;
use thiserror::Error;

/// Main error type for plot engine operations
#[derive(Error, Debug)]
pub enum PlotError {
    /// Errors related to configuration loading/saving
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed TOML configuration
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Configuration could not be written as TOML
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// X and Y arrays handed to an XY data provider differ in length
    #[error("Size mismatch: {x_len} positions but {y_len} values")]
    SizeMismatch { x_len: usize, y_len: usize },

    /// No Y axis at this index
    #[error("No Y axis with index {0}")]
    AxisIndex(usize),

    /// Trace is not part of the plot
    #[error("Unknown trace {0}")]
    UnknownTrace(TraceId),

    /// Annotation is not part of the plot
    #[error("Unknown annotation {0}")]
    UnknownAnnotation(AnnotationId),

    /// No marker at this index
    #[error("No marker with index {0}")]
    MarkerIndex(usize),

    /// A background task panicked or was dropped before producing a result
    #[error("Background task failed: {0}")]
    TaskFailed(String),

    /// A range that cannot be applied (e.g. non-finite bounds)
    #[error("Invalid range: {0}")]
    InvalidRange(String),

    /// The worker pool has been shut down
    #[error("Worker pool is shut down")]
    Shutdown,

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<PlotError>,
    },
}

impl PlotError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        PlotError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

/// Result type alias for plot engine operations
pub type Result<T> = std::result::Result<T, PlotError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| PlotError::Io(e).with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| PlotError::Io(e).with_context(f()))
    }
}
