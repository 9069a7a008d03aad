//! Tenet language vocabulary registries.
//!
//! Callers work with **stable IDs** (e.g. `KeywordId`, `OperatorId`) and look up spellings/metadata via registry
//! tables instead of comparing strings across the lexer, parser, and evaluator.
//!
//! ## Notes
//! - Registries are intentionally **pure**: no AST types, no IO, no side effects.
//! - The lexer/parser enforce syntax; registries provide spellings and metadata.
//!
//! ## Examples
//! ```rust
//! use tenet_core::lang::keywords::{self, KeywordId};
//!
//! assert_eq!(keywords::from_str("package"), Some(KeywordId::Package));
//! assert_eq!(keywords::as_str(KeywordId::Package), "package");
//! ```

pub mod builtins;
pub mod keywords;
pub mod operators;
pub mod punctuation;
