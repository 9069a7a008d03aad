//! Parser for the Tenet policy language
//!
//! Converts a token stream into a [`Module`]: a package declaration followed by rules.
//!
//! ## Examples
//!
//! ```rust,no_run
//! use tenet_syntax::{lexer, parser};
//!
//! let source = "package authz\n\ndefault allow = false\nallow { input.user == \"admin\" }\n";
//! let tokens = lexer::lex(source).unwrap();
//! let module = parser::parse(&tokens).unwrap();
//! assert_eq!(module.rules.len(), 2);
//! ```

use crate::ast::*;
use crate::diagnostics::CompileError;
use crate::lexer::{Token, TokenKind};
use tenet_core::lang::keywords::KeywordId;
use tenet_core::lang::operators::OperatorId;
use tenet_core::lang::punctuation::PunctuationId;

// NOTE: This module is split across multiple files using `include!` to keep all parser
// methods in the same Rust module (preserving privacy + call patterns) while avoiding
// a single large source file.

include!("parser/core.rs");
include!("parser/helpers.rs");
include!("parser/decl.rs");
include!("parser/expr.rs");
include!("parser/util.rs");
include!("parser/api.rs");
include!("parser/tests.rs");
