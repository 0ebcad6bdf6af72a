//! Display formatting for result values.

use crate::FloatValue;

/// Marker shown in place of values that cannot be computed.
pub const NOT_APPLICABLE: &str = "N/A";

/// Format `value` with a fixed number of decimals and comma thousands separators.
///
/// Non-finite values are rendered as [`NOT_APPLICABLE`].
pub fn format_number(value: FloatValue, decimals: usize) -> String {
    if !value.is_finite() {
        return NOT_APPLICABLE.to_string();
    }

    let formatted = format!("{:.*}", decimals, value.abs());
    let (integer, fraction) = match formatted.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(formatted.len() + integer.len() / 3 + 1);
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    if let Some(fraction) = fraction {
        grouped.push('.');
        grouped.push_str(fraction);
    }

    // Values that round to zero are shown without a sign
    let is_zero = formatted.chars().all(|c| c == '0' || c == '.');
    if value < 0.0 && !is_zero {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Format a percentage value (already scaled to 0-100) with two decimals.
pub fn format_percent(value: FloatValue) -> String {
    if value.is_finite() {
        format!("{}%", format_number(value, 2))
    } else {
        NOT_APPLICABLE.to_string()
    }
}
