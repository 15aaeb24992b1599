use serde_json::Value;

/// Coerces one answer to an integer score.
///
/// Numbers and numeric strings count at face value (rounded to the nearest
/// integer), booleans count as 1/0, and anything that does not coerce to a
/// finite number counts as zero.
pub fn coerce_answer(value: &Value) -> i64 {
    let number = match value {
        Value::Number(number) => number.as_f64().unwrap_or(0.0),
        Value::String(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                0.0
            } else {
                trimmed.parse::<f64>().unwrap_or(0.0)
            }
        }
        Value::Bool(true) => 1.0,
        Value::Bool(false) | Value::Null | Value::Array(_) | Value::Object(_) => 0.0,
    };

    if number.is_finite() {
        number.round() as i64
    } else {
        0
    }
}

pub fn total_score(answers: &[Value]) -> i64 {
    answers
        .iter()
        .map(coerce_answer)
        .fold(0_i64, |total, score| total.saturating_add(score))
}
