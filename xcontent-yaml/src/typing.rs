//! Resolution of plain (unquoted) scalars.
//!
//! The reader uses [`plain_scalar`] to type what it finds; the writer quotes
//! every string that [`plain_scalar`] would not read back as a string.

use std::borrow::Cow;

use xcontent_core::{Scalar, Text};

fn is_null(value: &str) -> bool {
    matches!(
        value.to_lowercase().as_str(),
        "null" | "~" | "" | "nil" | "none"
    )
}

fn as_bool(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "on" | "y" => Some(true),
        "false" | "no" | "off" | "n" => Some(false),
        _ => None,
    }
}

fn special_float(value: &str) -> Option<f64> {
    match value {
        ".inf" | ".Inf" | ".INF" | "+.inf" | "+.Inf" | "+.INF" => Some(f64::INFINITY),
        "-.inf" | "-.Inf" | "-.INF" => Some(f64::NEG_INFINITY),
        ".nan" | ".NaN" | ".NAN" => Some(f64::NAN),
        _ => None,
    }
}

fn as_number(value: &str) -> Option<Scalar<'static>> {
    if let Ok(n) = value.parse::<i64>() {
        return Some(i32::try_from(n).map_or(Scalar::Long(n), Scalar::Int));
    }
    if let Some(f) = special_float(value) {
        return Some(Scalar::Double(f));
    }
    // `str::parse::<f64>` also takes `inf` and `NaN`, which YAML reads as strings
    let numeric = value
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-'));
    if numeric && value.bytes().any(|b| b.is_ascii_digit()) {
        return value.parse::<f64>().ok().map(Scalar::Double);
    }
    None
}

/// Type a plain scalar: null, bool, int/long, double, or string.
pub(crate) fn plain_scalar(value: Cow<'_, str>) -> Scalar<'_> {
    if is_null(&value) {
        return Scalar::Null;
    }
    if let Some(b) = as_bool(&value) {
        return Scalar::Bool(b);
    }
    if let Some(number) = as_number(&value) {
        return number;
    }
    Scalar::String(Text::Chars(value))
}

/// Whether `s` would read back as something other than itself if written
/// without quotes.
pub(crate) fn needs_quotes(s: &str) -> bool {
    s.contains([':', '#', '\n', '\r', '"', '\'', '\t'])
        || s.starts_with(' ')
        || s.ends_with(' ')
        || s.starts_with([
            '-', '?', '*', '&', '!', '|', '>', '%', '@', '`', '[', ']', '{', '}', ',',
        ])
        || s.chars().any(char::is_control)
        || !matches!(plain_scalar(Cow::Borrowed(s)), Scalar::String(_))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(s: &str) -> Scalar<'_> {
        plain_scalar(Cow::Borrowed(s))
    }

    #[test]
    fn nulls_and_bools() {
        for s in ["null", "Null", "~", "", "nil", "NONE"] {
            assert_eq!(typed(s), Scalar::Null, "{s}");
        }
        assert_eq!(typed("yes"), Scalar::Bool(true));
        assert_eq!(typed("Off"), Scalar::Bool(false));
    }

    #[test]
    fn numbers_take_the_narrowest_width() {
        assert_eq!(typed("42"), Scalar::Int(42));
        assert_eq!(typed("-7"), Scalar::Int(-7));
        assert_eq!(typed("5000000000"), Scalar::Long(5_000_000_000));
        assert_eq!(typed("1.5"), Scalar::Double(1.5));
        assert_eq!(typed("2e3"), Scalar::Double(2000.0));
        assert_eq!(typed("-.inf"), Scalar::Double(f64::NEG_INFINITY));
        assert!(matches!(typed(".nan"), Scalar::Double(f) if f.is_nan()));
    }

    #[test]
    fn word_floats_stay_strings() {
        for s in ["inf", "NaN", "infinity", "e", "1.2.3"] {
            assert!(matches!(typed(s), Scalar::String(_)), "{s}");
        }
    }

    #[test]
    fn quoting() {
        for s in ["", "true", "12", "1.5", "~", "a: b", "#x", "-x", " pad", "[x", "a\nb"] {
            assert!(needs_quotes(s), "{s:?}");
        }
        for s in ["plain", "hello world", "x-y", "a.b", "é"] {
            assert!(!needs_quotes(s), "{s:?}");
        }
    }
}
