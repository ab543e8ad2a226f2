use serde_json::Value;

/// Coerce a raw chart value to a number.
///
/// JSON numbers pass through, strings are trimmed and parsed as `f64`.
/// Empty strings, null, booleans, arrays and objects are not numbers.
/// The result may be non-finite (`"NaN"`, `"inf"`); callers decide.
pub fn parse_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.parse::<f64>().ok()
        }
        _ => None,
    }
}

/// Like [`parse_number`] but only finite values survive.
pub fn parse_finite(value: &Value) -> Option<f64> {
    parse_number(value).filter(|v| v.is_finite())
}
