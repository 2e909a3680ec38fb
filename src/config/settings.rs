//! Editable range settings
//!
//! Hosts present axis ranges in text fields (a configuration dialog, a
//! toolbar entry). These types hold the text being edited together with the
//! last value that parsed, so malformed input never reaches the plot.
//!
//! # Main Types
//!
//! - [`RangeField`] - One numeric field with last-known-good fallback
//! - [`AxisRangeEdit`] - Low and high fields of one axis

use crate::data::AxisRange;

/// Text field holding one range bound
#[derive(Debug, Clone, PartialEq)]
pub struct RangeField {
    text: String,
    value: f64,
}

impl RangeField {
    pub fn new(value: f64) -> Self {
        Self {
            text: value.to_string(),
            value,
        }
    }

    /// Text currently shown
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Last value that parsed
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Replace the text without committing it
    pub fn edit(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Parse `text`
    ///
    /// On success the value is stored and returned. Unparsable or non-finite
    /// input resets the text to the last good value and returns `None`.
    pub fn commit(&mut self, text: &str) -> Option<f64> {
        match text.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => {
                self.value = value;
                self.text = text.trim().to_string();
                Some(value)
            }
            _ => {
                tracing::debug!("Rejected range input '{}', keeping {}", text, self.value);
                self.text = self.value.to_string();
                None
            }
        }
    }

    /// Commit the text set through [`edit`](Self::edit)
    pub fn commit_edit(&mut self) -> Option<f64> {
        let text = std::mem::take(&mut self.text);
        self.commit(&text)
    }

    /// Show `value` as the new last good value
    pub fn reset(&mut self, value: f64) {
        *self = Self::new(value);
    }
}

/// Low and high fields for one axis
#[derive(Debug, Clone, PartialEq)]
pub struct AxisRangeEdit {
    pub low: RangeField,
    pub high: RangeField,
}

impl AxisRangeEdit {
    pub fn new(range: AxisRange<f64>) -> Self {
        Self {
            low: RangeField::new(range.low),
            high: RangeField::new(range.high),
        }
    }

    /// Commit both fields
    ///
    /// Returns the range to apply, or `None` when either field was rejected
    /// or both bounds are equal.
    pub fn commit(&mut self, low: &str, high: &str) -> Option<AxisRange<f64>> {
        let low = self.low.commit(low);
        let high = self.high.commit(high);
        match (low, high) {
            (Some(low), Some(high)) if low != high => Some(AxisRange::new(low, high)),
            _ => None,
        }
    }

    /// Current range from the last good values
    pub fn range(&self) -> AxisRange<f64> {
        AxisRange::new(self.low.value(), self.high.value())
    }
}
