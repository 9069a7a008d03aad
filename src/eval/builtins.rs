//! Built-in functions.
//!
//! [`Builtins::standard`] registers the functions from `tenet_core::lang::builtins`. Embedders add their own with
//! [`Builtins::register`] before a run; the compiler checks every call against this registry.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tenet_core::lang::builtins::{self as vocab, BuiltinFnId};

use super::Value;

/// Implementation of a builtin. Errors are reported as messages and wrapped by the evaluator.
pub type BuiltinFn = Arc<dyn Fn(&[Value]) -> Result<Value, String> + Send + Sync>;

#[derive(Clone)]
pub struct Builtin {
    pub name: String,
    pub arity: usize,
    func: BuiltinFn,
}

impl Builtin {
    pub fn call(&self, args: &[Value]) -> Result<Value, String> {
        (self.func)(args)
    }
}

impl fmt::Debug for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Builtin")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

/// Registry of callable functions, keyed by dotted name.
#[derive(Debug, Clone, Default)]
pub struct Builtins {
    fns: BTreeMap<String, Builtin>,
}

impl Builtins {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard library.
    pub fn standard() -> Self {
        let mut builtins = Self::new();
        for info in vocab::BUILTIN_FUNCTIONS {
            let id = info.id;
            builtins.register(info.canonical, info.arity, move |args| call_standard(id, args));
        }
        builtins
    }

    /// Register (or replace) a function.
    pub fn register<F>(&mut self, name: impl Into<String>, arity: usize, func: F) -> &mut Self
    where
        F: Fn(&[Value]) -> Result<Value, String> + Send + Sync + 'static,
    {
        let name = name.into();
        self.fns.insert(
            name.clone(),
            Builtin {
                name,
                arity,
                func: Arc::new(func),
            },
        );
        self
    }

    pub fn get(&self, name: &str) -> Option<&Builtin> {
        self.fns.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fns.keys().map(String::as_str)
    }
}

// ============================================================================
// Standard implementations
// ============================================================================

fn call_standard(id: BuiltinFnId, args: &[Value]) -> Result<Value, String> {
    match id {
        BuiltinFnId::Count => match &args[0] {
            Value::Array(items) => Ok(Value::Number(items.len() as f64)),
            Value::Object(map) => Ok(Value::Number(map.len() as f64)),
            Value::String(s) => Ok(Value::Number(s.chars().count() as f64)),
            other => Err(operand_error(1, "array, object or string", other)),
        },
        BuiltinFnId::Sum => Ok(Value::Number(numbers(&args[0])?.iter().sum())),
        BuiltinFnId::Max => numbers(&args[0])?
            .into_iter()
            .reduce(f64::max)
            .map(Value::Number)
            .ok_or_else(|| "empty array".to_string()),
        BuiltinFnId::Min => numbers(&args[0])?
            .into_iter()
            .reduce(f64::min)
            .map(Value::Number)
            .ok_or_else(|| "empty array".to_string()),
        BuiltinFnId::Abs => match &args[0] {
            Value::Number(n) => Ok(Value::Number(n.abs())),
            other => Err(operand_error(1, "number", other)),
        },
        BuiltinFnId::Concat => {
            let sep = string_arg(args, 0)?;
            let parts = match &args[1] {
                Value::Array(items) => items
                    .iter()
                    .map(|v| v.as_str().ok_or_else(|| operand_error(2, "array of strings", &args[1])))
                    .collect::<Result<Vec<_>, _>>()?,
                other => return Err(operand_error(2, "array", other)),
            };
            Ok(Value::String(parts.join(sep)))
        }
        BuiltinFnId::Contains => Ok(Value::Bool(string_arg(args, 0)?.contains(string_arg(args, 1)?))),
        BuiltinFnId::StartsWith => Ok(Value::Bool(string_arg(args, 0)?.starts_with(string_arg(args, 1)?))),
        BuiltinFnId::EndsWith => Ok(Value::Bool(string_arg(args, 0)?.ends_with(string_arg(args, 1)?))),
        BuiltinFnId::Lower => Ok(Value::String(string_arg(args, 0)?.to_lowercase())),
        BuiltinFnId::Upper => Ok(Value::String(string_arg(args, 0)?.to_uppercase())),
        BuiltinFnId::ToNumber => match &args[0] {
            Value::Null => Ok(Value::Number(0.0)),
            Value::Bool(b) => Ok(Value::Number(if *b { 1.0 } else { 0.0 })),
            Value::Number(n) => Ok(Value::Number(*n)),
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .map(Value::Number)
                .map_err(|_| format!("invalid number {:?}", s)),
            other => Err(operand_error(1, "null, boolean, number or string", other)),
        },
    }
}

fn operand_error(pos: usize, expected: &str, got: &Value) -> String {
    format!("operand {} must be {} but got {}", pos, expected, got.type_name())
}

fn string_arg(args: &[Value], idx: usize) -> Result<&str, String> {
    args[idx].as_str().ok_or_else(|| operand_error(idx + 1, "string", &args[idx]))
}

fn numbers(v: &Value) -> Result<Vec<f64>, String> {
    match v {
        Value::Array(items) => items
            .iter()
            .map(|item| item.as_f64().ok_or_else(|| operand_error(1, "array of numbers", v)))
            .collect(),
        other => Err(operand_error(1, "array", other)),
    }
}
