//! Shared syntax frontend for the Tenet policy language: lexer, parser, AST, diagnostics.
//!
//! This crate is dependency-light and intended for reuse across the evaluator, the test runner, and the CLI.
//!
//! ## Notes
//! - This crate is intentionally “syntax-only”: it does not resolve references or evaluate anything.
//! - Vocabulary identity (keywords/operators/punctuation) comes from `tenet_core::lang` registries.
//! - Spans are byte offsets; [`source::SourceFile`] turns them into 1-based row/column locations.
//!
//! ## Examples
//! ```rust,no_run
//! use tenet_syntax::{lexer, parser};
//!
//! let tokens = lexer::lex("package foo\nallow { true }\n").unwrap();
//! let module = parser::parse(&tokens).unwrap();
//! assert_eq!(module.rules.len(), 1);
//! ```

pub mod ast;
pub mod diagnostics;
pub mod lexer;
pub mod parser;
pub mod source;
pub mod token_helpers;
