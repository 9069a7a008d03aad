//! Builtin function vocabulary.
//!
//! This module defines the canonical set of builtin functions every evaluator ships with. Callers use the stable
//! identifier [`BuiltinFnId`] for identity and query spellings, arity, and descriptions through [`BuiltinFnInfo`].
//!
//! ## Notes
//! - Lookup via [`from_str`] is **case-sensitive**.
//! - Runtimes may register additional builtins by name; those are not part of this registry.
//!
//! ## Examples
//! ```rust
//! use tenet_core::lang::builtins::{self, BuiltinFnId};
//!
//! assert_eq!(builtins::from_str("count"), Some(BuiltinFnId::Count));
//! assert_eq!(builtins::info_for(BuiltinFnId::Concat).arity, 2);
//! ```

/// Stable identifier for a builtin function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinFnId {
    Count,
    Sum,
    Max,
    Min,
    Abs,
    Concat,
    Contains,
    StartsWith,
    EndsWith,
    Lower,
    Upper,
    ToNumber,
}

/// Metadata for a builtin function.
#[derive(Debug, Clone, Copy)]
pub struct BuiltinFnInfo {
    pub id: BuiltinFnId,
    pub canonical: &'static str,
    pub arity: usize,
    pub description: &'static str,
}

/// Registry of all builtin functions.
pub const BUILTIN_FUNCTIONS: &[BuiltinFnInfo] = &[
    info(BuiltinFnId::Count, "count", 1, "Number of elements in an array, object or string."),
    info(BuiltinFnId::Sum, "sum", 1, "Sum of a numeric array."),
    info(BuiltinFnId::Max, "max", 1, "Largest element of a numeric array."),
    info(BuiltinFnId::Min, "min", 1, "Smallest element of a numeric array."),
    info(BuiltinFnId::Abs, "abs", 1, "Absolute value of a number."),
    info(BuiltinFnId::Concat, "concat", 2, "Join an array of strings with a delimiter."),
    info(BuiltinFnId::Contains, "contains", 2, "Whether a string contains a substring."),
    info(BuiltinFnId::StartsWith, "startswith", 2, "Whether a string starts with a prefix."),
    info(BuiltinFnId::EndsWith, "endswith", 2, "Whether a string ends with a suffix."),
    info(BuiltinFnId::Lower, "lower", 1, "Lowercase a string."),
    info(BuiltinFnId::Upper, "upper", 1, "Uppercase a string."),
    info(BuiltinFnId::ToNumber, "to_number", 1, "Convert a string, boolean, null or number to a number."),
];

/// Return the canonical spelling for a builtin function.
pub fn as_str(id: BuiltinFnId) -> &'static str {
    info_for(id).canonical
}

/// Return the full metadata entry for a builtin function.
///
/// ## Panics
/// - If the registry is missing an entry for `id` (this indicates a programming error).
pub fn info_for(id: BuiltinFnId) -> &'static BuiltinFnInfo {
    BUILTIN_FUNCTIONS
        .iter()
        .find(|b| b.id == id)
        .expect("builtin info missing")
}

/// Resolve a builtin spelling to its identifier.
pub fn from_str(s: &str) -> Option<BuiltinFnId> {
    BUILTIN_FUNCTIONS.iter().find(|b| b.canonical == s).map(|b| b.id)
}

const fn info(id: BuiltinFnId, canonical: &'static str, arity: usize, description: &'static str) -> BuiltinFnInfo {
    BuiltinFnInfo {
        id,
        canonical,
        arity,
        description,
    }
}
