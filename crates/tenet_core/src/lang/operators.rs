//! Operator vocabulary.
//!
//! This module defines the canonical operator set along with basic metadata such as precedence and category.
//!
//! ## Notes
//! - Lookup via [`from_str`] is **case-sensitive**.
//! - `not` is spelled as a keyword and lives in [`crate::lang::keywords`].
//! - Higher precedence binds tighter.
//!
//! ## Examples
//! ```rust
//! use tenet_core::lang::operators::{self, OperatorId};
//!
//! assert_eq!(operators::from_str(":="), Some(OperatorId::Assign));
//! assert!(operators::info_for(OperatorId::Star).precedence > operators::info_for(OperatorId::Plus).precedence);
//! ```

/// Stable identifier for every operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorId {
    // Binding
    Assign,
    Unify,

    // Comparison
    EqEq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,

    // Arithmetic
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
}

/// Broad grouping for operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorCategory {
    Binding,
    Comparison,
    Arithmetic,
}

/// Metadata for an operator.
#[derive(Debug, Clone, Copy)]
pub struct OperatorInfo {
    pub id: OperatorId,
    pub canonical: &'static str,
    pub category: OperatorCategory,
    pub precedence: u8,
}

/// Registry of all operators.
pub const OPERATORS: &[OperatorInfo] = &[
    info(OperatorId::Assign, ":=", OperatorCategory::Binding, 10),
    info(OperatorId::Unify, "=", OperatorCategory::Binding, 10),
    info(OperatorId::EqEq, "==", OperatorCategory::Comparison, 20),
    info(OperatorId::NotEq, "!=", OperatorCategory::Comparison, 20),
    info(OperatorId::Lt, "<", OperatorCategory::Comparison, 20),
    info(OperatorId::LtEq, "<=", OperatorCategory::Comparison, 20),
    info(OperatorId::Gt, ">", OperatorCategory::Comparison, 20),
    info(OperatorId::GtEq, ">=", OperatorCategory::Comparison, 20),
    info(OperatorId::Plus, "+", OperatorCategory::Arithmetic, 30),
    info(OperatorId::Minus, "-", OperatorCategory::Arithmetic, 30),
    info(OperatorId::Star, "*", OperatorCategory::Arithmetic, 40),
    info(OperatorId::Slash, "/", OperatorCategory::Arithmetic, 40),
    info(OperatorId::Percent, "%", OperatorCategory::Arithmetic, 40),
];

/// Return the canonical spelling for an operator.
pub fn as_str(id: OperatorId) -> &'static str {
    info_for(id).canonical
}

/// Return the full metadata entry for an operator.
///
/// ## Panics
/// - If the registry is missing an entry for `id` (this indicates a programming error).
pub fn info_for(id: OperatorId) -> &'static OperatorInfo {
    OPERATORS.iter().find(|o| o.id == id).expect("operator info missing")
}

/// Resolve an operator spelling to its identifier.
pub fn from_str(s: &str) -> Option<OperatorId> {
    OPERATORS.iter().find(|o| o.canonical == s).map(|o| o.id)
}

const fn info(id: OperatorId, canonical: &'static str, category: OperatorCategory, precedence: u8) -> OperatorInfo {
    OperatorInfo {
        id,
        canonical,
        category,
        precedence,
    }
}
