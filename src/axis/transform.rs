//! Value to screen transforms
//!
//! Linear and logarithmic mappings between an axis value range and its pixel
//! extent. The mapping is monotonic; an inverted value range (`low > high`)
//! simply produces a decreasing mapping.

/// Base-10 helpers for logarithmic axes
pub struct Log10;

impl Log10 {
    /// Floor substituted for non-positive lower bounds
    pub const LOW_FLOOR: f64 = 1.0;

    /// Upper bound substituted when the upper bound is not above the floor
    pub const HIGH_FALLBACK: f64 = 100.0;

    pub fn log10(value: f64) -> f64 {
        value.log10()
    }

    pub fn pow10(value: f64) -> f64 {
        10f64.powf(value)
    }

    /// Make `(low, high)` usable for a log transform
    ///
    /// Non-positive bounds are replaced silently so the plot keeps drawing.
    pub fn clamp_range(low: f64, high: f64) -> (f64, f64) {
        let low = if low <= 0.0 { Self::LOW_FLOOR } else { low };
        let high = if high <= 0.0 {
            low.max(Self::HIGH_FALLBACK)
        } else {
            high
        };
        (low, high)
    }
}

/// Transform between a value range and a pixel range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenTransform {
    value_low: f64,
    value_high: f64,
    screen_low: f64,
    screen_high: f64,
    log: bool,
}

impl ScreenTransform {
    /// Linear transform from `value_low..value_high` to `screen_low..screen_high`
    pub fn linear(value_low: f64, value_high: f64, screen_low: i32, screen_high: i32) -> Self {
        Self {
            value_low,
            value_high,
            screen_low: screen_low as f64,
            screen_high: screen_high as f64,
            log: false,
        }
    }

    /// Logarithmic transform; non-positive bounds are clamped
    pub fn logarithmic(value_low: f64, value_high: f64, screen_low: i32, screen_high: i32) -> Self {
        let (low, high) = if value_low <= value_high {
            Log10::clamp_range(value_low, value_high)
        } else {
            let (high, low) = Log10::clamp_range(value_high, value_low);
            (low, high)
        };
        Self {
            value_low: Log10::log10(low),
            value_high: Log10::log10(high),
            screen_low: screen_low as f64,
            screen_high: screen_high as f64,
            log: true,
        }
    }

    pub fn is_logarithmic(&self) -> bool {
        self.log
    }

    /// Screen coordinate for `value`
    pub fn transform(&self, value: f64) -> f64 {
        let value = if self.log {
            Log10::log10(value.max(f64::MIN_POSITIVE))
        } else {
            value
        };
        let value_span = self.value_high - self.value_low;
        if value_span == 0.0 {
            return self.screen_low;
        }
        self.screen_low + (value - self.value_low) * (self.screen_high - self.screen_low) / value_span
    }

    /// Value at screen coordinate `screen`
    pub fn inverse(&self, screen: f64) -> f64 {
        let screen_span = self.screen_high - self.screen_low;
        let value = if screen_span == 0.0 {
            self.value_low
        } else {
            self.value_low + (screen - self.screen_low) * (self.value_high - self.value_low) / screen_span
        };
        if self.log {
            Log10::pow10(value)
        } else {
            value
        }
    }
}
