//! Diagnostics for the Tenet frontend and compiler.
//!
//! Errors carry a byte [`Span`]; callers that know the source file render them with
//! [`crate::source::SourceFile::location`].

use crate::ast::Span;
use crate::source::SourceFile;
use thiserror::Error;

/// A compile-time error with location information
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind}: {message}")]
pub struct CompileError {
    pub message: String,
    pub span: Span,
    pub kind: ErrorKind,
    pub hints: Vec<String>,
}

impl CompileError {
    pub fn new(message: String, span: Span) -> Self {
        Self {
            message,
            span,
            kind: ErrorKind::Error,
            hints: Vec::new(),
        }
    }

    pub fn syntax(message: String, span: Span) -> Self {
        Self {
            message,
            span,
            kind: ErrorKind::Syntax,
            hints: Vec::new(),
        }
    }

    pub fn semantic(message: String, span: Span) -> Self {
        Self {
            message,
            span,
            kind: ErrorKind::Semantic,
            hints: Vec::new(),
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hints.push(hint.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Error,
    Syntax,
    Semantic,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Error => write!(f, "error"),
            ErrorKind::Syntax => write!(f, "syntax error"),
            ErrorKind::Semantic => write!(f, "compile error"),
        }
    }
}

/// Render an error against its source file.
///
/// ```text
/// policy.tnt:3:9: syntax error: Expected expression, found RBrace
///   |   allow { 1 + }
///   = hint: ...
/// ```
pub fn format_error(source: &SourceFile, err: &CompileError) -> String {
    let loc = source.location(err.span);
    let mut out = format!("{}: {}\n", loc, err);
    if let Some(line) = source.text().lines().nth(loc.row.saturating_sub(1)) {
        out.push_str(&format!("  | {}\n", line));
    }
    for hint in &err.hints {
        out.push_str(&format!("  = hint: {}\n", hint));
    }
    out
}

/// Create common errors with consistent wording.
pub mod errors {
    use super::*;

    pub fn unknown_function(name: &str, span: Span) -> CompileError {
        CompileError::semantic(format!("undefined function {}", name), span)
            .with_hint("Register the builtin before running, or check the spelling.")
    }

    pub fn arity_mismatch(name: &str, expected: usize, found: usize, span: Span) -> CompileError {
        CompileError::semantic(
            format!("{}: expected {} argument(s), found {}", name, expected, found),
            span,
        )
    }

    pub fn unsafe_var(name: &str, span: Span) -> CompileError {
        CompileError::semantic(format!("var {} is unsafe", name), span)
            .with_hint("Bind the variable with `:=` or `=` before using it.")
    }

    pub fn redeclared_var(name: &str, span: Span) -> CompileError {
        CompileError::semantic(format!("var {} assigned above", name), span)
    }
}
