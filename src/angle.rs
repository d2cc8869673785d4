//! Angle text codec.
//!
//! Numeric form fields follow the lenient "longest numeric prefix" rule:
//! `"12.5deg"` reads as `12.5`, `"  7"` as `7`, and text without a leading
//! numeral does not parse at all.

use std::f64::consts::PI;

/// Parse the longest leading decimal numeral of `text`.
///
/// Leading whitespace is skipped. Returns `None` when no numeral starts the
/// text or when the value is not finite.
pub fn parse_float_prefix(text: &str) -> Option<f64> {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }

    if digits == 0 {
        return None;
    }

    // Exponent only counts when at least one digit follows it
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    let value: f64 = s[..end].parse().ok()?;
    value.is_finite().then_some(value)
}

/// Parse a user-entered polar angle in degrees.
///
/// A decimal comma is accepted in place of the decimal point. `None` means the
/// caller must keep its previous angle.
pub fn parse_polar_angle(text: &str) -> Option<f64> {
    parse_float_prefix(&text.replacen(',', ".", 1))
}

/// Reduce `degrees` into `[0, 360)` and convert to radians.
pub fn normalize_polar_angle_radians(degrees: f64) -> f64 {
    let mut angle = degrees % 360.0;
    if angle < 0.0 {
        angle += 360.0;
    }
    // -1e-17 % 360 + 360 rounds to exactly 360
    if angle >= 360.0 {
        angle = 0.0;
    }
    angle * PI / 180.0
}

/// Format a radian angle the way the angle field shows it after a drag.
pub fn format_degrees(radians: f64) -> String {
    format!("{:.2}", radians.to_degrees())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_comma_and_point() {
        assert_eq!(parse_polar_angle("12,5"), Some(12.5));
        assert_eq!(parse_polar_angle("12.5"), Some(12.5));
        assert_eq!(parse_polar_angle("abc"), None);
        assert_eq!(parse_polar_angle(""), None);
    }

    #[test]
    fn test_parse_takes_numeric_prefix() {
        assert_eq!(parse_float_prefix("  45deg"), Some(45.0));
        assert_eq!(parse_float_prefix("-3.5e1x"), Some(-35.0));
        assert_eq!(parse_float_prefix("7e"), Some(7.0));
        assert_eq!(parse_float_prefix(".5"), Some(0.5));
        assert_eq!(parse_float_prefix("5."), Some(5.0));
        assert_eq!(parse_float_prefix("-"), None);
        assert_eq!(parse_float_prefix("."), None);
        assert_eq!(parse_float_prefix("1e999"), None);
    }

    #[test]
    fn test_normalize_round_trip_in_range() {
        for i in 0..3600 {
            let d = i as f64 * 0.1;
            let back = normalize_polar_angle_radians(d).to_degrees();
            assert!((back - d).abs() < 1e-9, "{} -> {}", d, back);
        }
    }

    #[test]
    fn test_normalize_wraps_out_of_range() {
        let cases = [(-90.0, 270.0), (360.0, 0.0), (725.0, 5.0), (-720.0, 0.0), (-1.0e-17, 0.0)];
        for (input, expected) in cases {
            let got = normalize_polar_angle_radians(input);
            assert!((got - normalize_polar_angle_radians(expected)).abs() < 1e-12);
            assert!((0.0..2.0 * PI).contains(&got));
        }
    }

    #[test]
    fn test_format_degrees() {
        assert_eq!(format_degrees(PI / 2.0), "90.00");
    }
}
