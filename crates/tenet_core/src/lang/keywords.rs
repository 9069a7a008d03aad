//! Define the reserved keyword vocabulary for the Tenet language.
//!
//! This module is the single source of truth for reserved words: a stable identifier ([`KeywordId`]) plus a const
//! metadata table ([`KEYWORDS`]) that records canonical spellings and categories.
//!
//! ## Notes
//! - Lookup via [`from_str`] is **case-sensitive**.
//! - `not` is a reserved word that also acts as the negation prefix of a body expression.
//!
//! ## Examples
//! ```rust
//! use tenet_core::lang::keywords::{self, KeywordId};
//!
//! assert_eq!(keywords::from_str("default"), Some(KeywordId::Default));
//! assert_eq!(keywords::as_str(KeywordId::Not), "not");
//! ```

/// Stable identifier for every reserved keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeywordId {
    // Module structure
    Package,
    Default,

    // Negation
    Not,

    // Literals
    True,
    False,
    Null,
}

/// High-level grouping for documentation and tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeywordCategory {
    Module,
    Operator,
    Literal,
}

/// Metadata for a keyword.
#[derive(Debug, Clone, Copy)]
pub struct KeywordInfo {
    pub id: KeywordId,
    pub canonical: &'static str,
    pub category: KeywordCategory,
    pub description: &'static str,
}

/// Registry of all keywords.
pub const KEYWORDS: &[KeywordInfo] = &[
    info(
        KeywordId::Package,
        "package",
        KeywordCategory::Module,
        "Declares the package path of a module.",
    ),
    info(
        KeywordId::Default,
        "default",
        KeywordCategory::Module,
        "Declares the value of a rule when no definition is satisfied.",
    ),
    info(
        KeywordId::Not,
        "not",
        KeywordCategory::Operator,
        "Succeeds when the following expression is false or undefined.",
    ),
    info(KeywordId::True, "true", KeywordCategory::Literal, "Boolean true."),
    info(KeywordId::False, "false", KeywordCategory::Literal, "Boolean false."),
    info(KeywordId::Null, "null", KeywordCategory::Literal, "The null value."),
];

/// Return the canonical spelling for a keyword.
pub fn as_str(id: KeywordId) -> &'static str {
    info_for(id).canonical
}

/// Return the category for a keyword.
pub fn category(id: KeywordId) -> KeywordCategory {
    info_for(id).category
}

/// Return the full metadata entry for a keyword.
///
/// ## Panics
/// - If the registry is missing an entry for `id` (this indicates a programming error).
pub fn info_for(id: KeywordId) -> &'static KeywordInfo {
    KEYWORDS.iter().find(|k| k.id == id).expect("keyword info missing")
}

/// Resolve an identifier spelling to a keyword, if reserved.
pub fn from_str(s: &str) -> Option<KeywordId> {
    KEYWORDS.iter().find(|k| k.canonical == s).map(|k| k.id)
}

const fn info(
    id: KeywordId,
    canonical: &'static str,
    category: KeywordCategory,
    description: &'static str,
) -> KeywordInfo {
    KeywordInfo {
        id,
        canonical,
        category,
        description,
    }
}
