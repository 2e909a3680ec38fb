//! Value formatting for cursor labels

/// Largest number of fraction digits shown
const MAX_PRECISION: i32 = 12;

/// Format `value` with enough digits to tell values apart on an axis of `span`
///
/// Uses three significant digits beyond the span's order of magnitude, and
/// exponential notation for very large or very small magnitudes.
pub fn format_detailed(value: f64, span: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let magnitude = value.abs();
    if magnitude >= 1e6 || (magnitude > 0.0 && magnitude < 1e-4) {
        return format!("{:.3e}", value);
    }
    format!("{:.*}", precision_for_span(span), value)
}

/// Number of fraction digits for an axis of `span`
pub fn precision_for_span(span: f64) -> usize {
    let span = span.abs();
    if span == 0.0 || !span.is_finite() {
        return 3;
    }
    (3 - span.log10().floor() as i32).clamp(0, MAX_PRECISION) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precision_follows_span() {
        assert_eq!(precision_for_span(10.0), 2);
        assert_eq!(precision_for_span(0.5), 4);
        assert_eq!(precision_for_span(5000.0), 0);
        assert_eq!(precision_for_span(0.0), 3);
    }

    #[test]
    #[allow(clippy::approx_constant)]
    fn test_format_detailed() {
        assert_eq!(format_detailed(3.14159, 10.0), "3.14");
        assert_eq!(format_detailed(1234.4, 5000.0), "1234");
        assert_eq!(format_detailed(2.5e7, 1e8), "2.500e7");
        assert_eq!(format_detailed(f64::NAN, 1.0), "NaN");
    }
}
