//! Position types for the horizontal axis
//!
//! A plot is generic over the type of its horizontal positions. Numeric plots
//! use `f64`, time plots use `DateTime<Utc>`. Zoom and pan are written once
//! against [`Position`] and use the type's own span arithmetic, so time axes
//! shift by exact durations instead of subtracting floating-point seconds.

use chrono::{DateTime, Duration, Utc};
use std::fmt::Debug;

/// Largest whole-second count a `chrono::Duration` can hold
const MAX_DURATION_SECS: i64 = i64::MAX / 1000 - 1;

/// Capabilities needed from a horizontal position type
pub trait Position: Copy + PartialOrd + Debug + Send + Sync + 'static {
    /// Signed distance between two positions
    type Span: Copy + Debug + Send + Sync + 'static;

    /// Distance from `from` to `to`, i.e. `to - from`
    fn span_between(from: Self, to: Self) -> Self::Span;

    /// Position moved by `span`
    fn shift(self, span: Self::Span) -> Self;

    /// `span` multiplied by `factor`
    fn scale_span(span: Self::Span, factor: f64) -> Self::Span;

    /// Scalar used for the screen transform
    fn to_scalar(self) -> f64;

    /// Inverse of [`to_scalar`](Self::to_scalar)
    fn from_scalar(value: f64) -> Self;

    /// Text shown for this position
    fn format(self) -> String;
}

impl Position for f64 {
    type Span = f64;

    fn span_between(from: Self, to: Self) -> f64 {
        to - from
    }

    fn shift(self, span: f64) -> Self {
        self + span
    }

    fn scale_span(span: f64, factor: f64) -> f64 {
        span * factor
    }

    fn to_scalar(self) -> f64 {
        self
    }

    fn from_scalar(value: f64) -> Self {
        value
    }

    fn format(self) -> String {
        format!("{}", self)
    }
}

impl Position for DateTime<Utc> {
    type Span = Duration;

    fn span_between(from: Self, to: Self) -> Duration {
        to.signed_duration_since(from)
    }

    fn shift(self, span: Duration) -> Self {
        self.checked_add_signed(span).unwrap_or(if span > Duration::zero() {
            DateTime::<Utc>::MAX_UTC
        } else {
            DateTime::<Utc>::MIN_UTC
        })
    }

    fn scale_span(span: Duration, factor: f64) -> Duration {
        // Seconds and nanoseconds are scaled separately so that multi-year
        // spans keep sub-second resolution
        let scaled = (span.num_seconds() as f64 + 1e-9 * span.subsec_nanos() as f64) * factor;
        let seconds = (scaled.trunc() as i64).clamp(-MAX_DURATION_SECS, MAX_DURATION_SECS);
        let nanos = ((scaled - scaled.trunc()) * 1e9) as i64;
        Duration::seconds(seconds) + Duration::nanoseconds(nanos)
    }

    fn to_scalar(self) -> f64 {
        self.timestamp() as f64 + 1e-9 * self.timestamp_subsec_nanos() as f64
    }

    fn from_scalar(value: f64) -> Self {
        if !value.is_finite() {
            return DateTime::<Utc>::default();
        }
        let seconds = value.floor();
        let nanos = (((value - seconds) * 1e9).round() as u32).min(999_999_999);
        DateTime::from_timestamp(seconds as i64, nanos).unwrap_or_default()
    }

    fn format(self) -> String {
        DateTime::format(&self, "%Y-%m-%d %H:%M:%S%.3f").to_string()
    }
}
