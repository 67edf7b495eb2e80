//! Type-strict JSON equality for grant `equality` matching
//!
//! `serde_json::Value` equality compares numbers by internal representation,
//! so `1` and `1.0` are unequal even though a query engine may hand back
//! either. Equality here follows the JSON data model instead: numbers compare
//! by mathematical value, everything else is type-strict.

use serde_json::{Number, Value};

/// Deep equality over JSON values.
///
/// Numbers are equal iff they represent the same mathematical value; strings
/// compare by code-point sequence; arrays element-wise in order; objects by
/// key set and recursive value equality. `null` equals only `null`, and
/// booleans are never numbers.
pub fn json_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => number_equal(a, b),
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| json_equal(x, y))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(key, x)| b.get(key).is_some_and(|y| json_equal(x, y)))
        }
        _ => false,
    }
}

fn number_equal(a: &Number, b: &Number) -> bool {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return x == y;
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return x == y;
    }
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}
