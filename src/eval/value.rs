//! Runtime values.
//!
//! Values mirror JSON documents: everything in the store, the input, and every rule result is a [`Value`].
//! Numbers are `f64` so `1` and `1.0` compare equal.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<Value>),
    Object(BTreeMap<String, Value>),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    /// `true` for every value except `false`.
    ///
    /// Undefined is handled by callers (`Option<Value>`); here only an explicit `false` fails.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Bool(false))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Look up one path segment: an object key, or an array index given as a number or numeric string.
    pub fn get(&self, key: &Value) -> Option<&Value> {
        match (self, key) {
            (Value::Object(map), Value::String(k)) => map.get(k),
            (Value::Array(items), Value::Number(n)) if n.fract() == 0.0 && *n >= 0.0 => items.get(*n as usize),
            (Value::Array(items), Value::String(s)) => s.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        }
    }

    /// Ordering between two values of the same scalar type.
    ///
    /// Returns `None` when the types differ or are not ordered (arrays, objects, null, booleans).
    pub fn partial_cmp_same_type(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => number_to_json(*n),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Array(items) => serde_json::Value::Array(items.iter().map(Value::to_json).collect()),
            Value::Object(map) => {
                serde_json::Value::Object(map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect())
            }
        }
    }
}

/// Whole numbers print without a fractional part.
fn number_to_json(n: f64) -> serde_json::Value {
    if n.fract() == 0.0 && n.abs() < 9.0e15 {
        serde_json::Value::from(n as i64)
    } else {
        serde_json::Number::from_f64(n)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            serde_json::Value::Object(map) => Value::Object(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_and_display() {
        let v = Value::from(json!({"a": [1, 2.5, "x"], "b": null}));
        assert_eq!(v.to_string(), r#"{"a":[1,2.5,"x"],"b":null}"#);
    }

    #[test]
    fn test_integer_and_float_compare_equal() {
        assert_eq!(Value::from(json!(1)), Value::Number(1.0));
    }

    #[test]
    fn test_get() {
        let v = Value::from(json!({"xs": [10, 20]}));
        let xs = v.get(&Value::from("xs")).unwrap();
        assert_eq!(xs.get(&Value::Number(1.0)), Some(&Value::Number(20.0)));
        assert_eq!(xs.get(&Value::from("0")), Some(&Value::Number(10.0)));
        assert_eq!(xs.get(&Value::Number(0.5)), None);
        assert_eq!(v.get(&Value::Number(0.0)), None);
    }

    #[test]
    fn test_truthiness() {
        assert!(Value::Number(0.0).is_truthy());
        assert!(Value::Null.is_truthy());
        assert!(!Value::Bool(false).is_truthy());
    }

    #[test]
    fn test_ordering_requires_same_type() {
        assert_eq!(
            Value::from("a").partial_cmp_same_type(&Value::from("b")),
            Some(Ordering::Less)
        );
        assert_eq!(Value::Number(1.0).partial_cmp_same_type(&Value::from("1")), None);
    }

    #[test]
    fn test_serialize_untagged() {
        let v = Value::Array(vec![Value::Null, Value::Bool(true), Value::from("s")]);
        assert_eq!(serde_json::to_string(&v).unwrap(), r#"[null,true,"s"]"#);
    }
}
