//! Condition node evaluator

use super::ast::{ConditionOperator, Threshold};
use crate::exoworks::workflow::context::ExecutionContext;
use crate::exoworks::workflow::types::ConditionConfig;
use serde_json::Value;

/// Evaluate a condition node's configuration against the context variables.
///
/// A variable that is absent from the context makes the condition false.
pub fn evaluate(config: &ConditionConfig, context: &ExecutionContext) -> bool {
    match context.get(&config.variable) {
        Some(value) => compare(value, config.operator, &config.threshold),
        None => false,
    }
}

/// Compare a variable value against a threshold
pub fn compare(value: &Value, op: ConditionOperator, threshold: &Threshold) -> bool {
    match op {
        ConditionOperator::Eq => strict_equal(value, threshold),
        ConditionOperator::Ne => !strict_equal(value, threshold),
        ConditionOperator::Gt => compare_numbers(value, threshold, |a, b| a > b),
        ConditionOperator::Lt => compare_numbers(value, threshold, |a, b| a < b),
        ConditionOperator::Gte => compare_numbers(value, threshold, |a, b| a >= b),
        ConditionOperator::Lte => compare_numbers(value, threshold, |a, b| a <= b),
    }
}

fn strict_equal(value: &Value, threshold: &Threshold) -> bool {
    match (value, threshold) {
        (Value::Number(n), Threshold::Number(t)) => n.as_f64().is_some_and(|f| f == *t),
        (Value::String(s), Threshold::Text(t)) => s == t,
        _ => false,
    }
}

fn compare_numbers<F>(value: &Value, threshold: &Threshold, cmp: F) -> bool
where
    F: Fn(f64, f64) -> bool,
{
    let left = to_number(value);
    let right = match threshold {
        Threshold::Number(n) => *n,
        Threshold::Text(s) => parse_number(s),
    };
    // NaN on either side compares false for every operator
    cmp(left, right)
}

/// Numeric coercion: numbers as-is, strings parsed as numeric literals,
/// booleans 1/0, null 0. An empty array is 0 and a single-element array
/// coerces through its element; everything else is NaN.
pub fn to_number(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => parse_number(s),
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Value::Null => 0.0,
        Value::Array(items) => match items.as_slice() {
            [] => 0.0,
            // Element goes through its text form, where true/false and objects are not numeric
            [Value::Bool(_)] | [Value::Object(_)] => f64::NAN,
            [single] => to_number(single),
            _ => f64::NAN,
        },
        Value::Object(_) => f64::NAN,
    }
}

fn parse_number(s: &str) -> f64 {
    let trimmed = s.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}');
    if trimmed.is_empty() {
        return 0.0;
    }

    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    let radix = match trimmed.get(..2) {
        Some("0x") | Some("0X") => Some(16),
        Some("0o") | Some("0O") => Some(8),
        Some("0b") | Some("0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        return parse_radix(&trimmed[2..], radix);
    }

    if is_decimal_literal(trimmed) {
        trimmed.parse::<f64>().unwrap_or(f64::NAN)
    } else {
        f64::NAN
    }
}

/// Unsigned digits in the given radix, no separators
fn parse_radix(digits: &str, radix: u32) -> f64 {
    if digits.is_empty() {
        return f64::NAN;
    }
    let mut acc = 0.0;
    for c in digits.chars() {
        match c.to_digit(radix) {
            Some(d) => acc = acc * radix as f64 + d as f64,
            None => return f64::NAN,
        }
    }
    acc
}

/// `[+-] digits [. digits] [(e|E) [+-] digits]`, where either side of the
/// point may be empty but not both.
fn is_decimal_literal(s: &str) -> bool {
    let bytes = s.as_bytes();
    let mut i = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        i += 1;
    }

    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let mut mantissa_digits = i - int_start;

    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        let frac_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        mantissa_digits += i - frac_start;
    }
    if mantissa_digits == 0 {
        return false;
    }

    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        i += 1;
        if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
            i += 1;
        }
        let exp_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == exp_start {
            return false;
        }
    }

    i == bytes.len()
}
