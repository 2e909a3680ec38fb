//! Value and axis ranges

use serde::{Deserialize, Serialize};

/// Range of sample values, `low..=high`
///
/// A range with `low > high` is empty. [`ValueRange::EMPTY`] is the
/// conventional result of scanning data without any finite value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub low: f64,
    pub high: f64,
}

impl ValueRange {
    /// Inverted sentinel meaning "no data"
    pub const EMPTY: ValueRange = ValueRange {
        low: f64::MAX,
        high: -f64::MAX,
    };

    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// True when no value has been included (`low > high`)
    pub fn is_empty(&self) -> bool {
        self.low > self.high
    }

    /// Absolute size of the range
    pub fn span(&self) -> f64 {
        (self.high - self.low).abs()
    }

    /// Extend the range so it includes `value`
    pub fn include(&mut self, value: f64) {
        if value < self.low {
            self.low = value;
        }
        if value > self.high {
            self.high = value;
        }
    }

    /// Smallest range covering both ranges
    pub fn merge(self, other: ValueRange) -> ValueRange {
        ValueRange {
            low: self.low.min(other.low),
            high: self.high.max(other.high),
        }
    }

    /// Center a constant value in a range of `|value|` width.
    ///
    /// A range of exactly `0..0` stays zero-width.
    pub fn widen_flat(self) -> ValueRange {
        if self.low == self.high {
            let half = (self.low / 2.0).abs();
            ValueRange {
                low: self.low - half,
                high: self.high + half,
            }
        } else {
            self
        }
    }
}

impl Default for ValueRange {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Range of an axis
///
/// Unlike [`ValueRange`], `low > high` is meaningful here: it is an inverted
/// axis whose values decrease along the screen direction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisRange<T> {
    pub low: T,
    pub high: T,
}

impl<T: Copy + PartialOrd> AxisRange<T> {
    pub fn new(low: T, high: T) -> Self {
        Self { low, high }
    }

    /// True for the usual orientation, `low < high`
    pub fn is_normal(&self) -> bool {
        self.low < self.high
    }

    /// Swap low and high
    pub fn reversed(self) -> Self {
        Self {
            low: self.high,
            high: self.low,
        }
    }

    /// Whether `value` lies within the range, for either orientation
    pub fn contains(&self, value: T) -> bool {
        if self.low <= self.high {
            self.low <= value && value <= self.high
        } else {
            self.high <= value && value <= self.low
        }
    }

    /// Orient `(low, high)` like this range
    pub fn oriented(&self, low: T, high: T) -> Self {
        if self.is_normal() {
            Self::new(low, high)
        } else {
            Self::new(high, low)
        }
    }
}

impl From<ValueRange> for AxisRange<f64> {
    fn from(range: ValueRange) -> Self {
        AxisRange::new(range.low, range.high)
    }
}
