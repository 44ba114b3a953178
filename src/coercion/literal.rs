use regex::Regex;
use serde_json::{Number, Value};
use std::borrow::Cow;
use std::sync::LazyLock;

static PY_TRUE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bTrue\b").unwrap());
static PY_FALSE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bFalse\b").unwrap());
static WHOLE_FLOAT_LITERAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?\d+\.0$").unwrap());
static BARE_INTEGER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^-?\d+$").unwrap());

/// Largest magnitude an `f64` holds without losing integer precision (2^53).
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Rewrites the Python literals `True`/`False` (whole words only) to JSON booleans.
pub fn normalize_python_booleans(text: &str) -> Cow<'_, str> {
    if !text.contains("True") && !text.contains("False") {
        return Cow::Borrowed(text);
    }
    let text = PY_TRUE.replace_all(text, "true");
    Cow::Owned(PY_FALSE.replace_all(&text, "false").into_owned())
}

/// Parses `text` as JSON after boolean normalization.
pub fn parse_json_lenient(text: &str) -> Result<Value, serde_json::Error> {
    serde_json::from_str(&normalize_python_booleans(text))
}

/// Parses a finite number. Whole values in the exact-integer range come back as
/// JSON integers so they serialize without a fractional part.
pub fn parse_number(text: &str) -> Option<Value> {
    let parsed: f64 = text.trim().parse().ok()?;
    if !parsed.is_finite() {
        return None;
    }
    if parsed.fract() == 0.0 && parsed.abs() <= MAX_EXACT_INTEGER {
        return Some(Value::from(parsed as i64));
    }
    Number::from_f64(parsed).map(Value::Number)
}

pub fn looks_numeric(text: &str) -> bool {
    parse_number(text).is_some()
}

/// `true` for literals like `4241.0` whose authoring intent is a decimal.
pub fn is_whole_float_literal(text: &str) -> bool {
    WHOLE_FLOAT_LITERAL.is_match(text)
}

pub fn is_bare_integer(text: &str) -> bool {
    BARE_INTEGER.is_match(text)
}

pub fn parse_boolean(text: &str) -> Option<bool> {
    if text.eq_ignore_ascii_case("true") {
        Some(true)
    } else if text.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Re-expresses an integer JSON number as a float so it serializes as `N.0`.
/// Numbers that are already floats are returned unchanged.
pub fn as_float_number(number: &Number) -> Number {
    if number.is_f64() {
        return number.clone();
    }
    let widened = number
        .as_i64()
        .map(|i| i as f64)
        .or_else(|| number.as_u64().map(|u| u as f64));
    widened
        .and_then(Number::from_f64)
        .unwrap_or_else(|| number.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_python_booleans_are_word_bounded() {
        assert_eq!(
            normalize_python_booleans(r#"[True, False, "Trueish"]"#),
            r#"[true, false, "Trueish"]"#
        );
        assert!(matches!(
            normalize_python_booleans("[1, 2]"),
            Cow::Borrowed(_)
        ));
    }

    #[test]
    fn test_number_parsing() {
        assert_eq!(parse_number("4241.0"), Some(Value::from(4241)));
        assert_eq!(parse_number("-12"), Some(Value::from(-12)));
        assert_eq!(parse_number("100.5"), Some(Value::from(100.5)));
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("12abc"), None);
    }

    #[test]
    fn test_float_literal_patterns() {
        assert!(is_whole_float_literal("4241.0"));
        assert!(is_whole_float_literal("-3.0"));
        assert!(!is_whole_float_literal("100.5"));
        assert!(!is_whole_float_literal("100.00"));
        assert!(is_bare_integer("100"));
        assert!(!is_bare_integer("1e3"));
    }

    #[test]
    fn test_as_float_number_widens_integers() {
        let n = as_float_number(&Number::from(7));
        assert!(n.is_f64());
        assert_eq!(serde_json::to_string(&n).unwrap(), "7.0");
    }
}
