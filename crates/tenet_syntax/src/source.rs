//! Source files and row/column locations.
//!
//! The lexer and parser only record byte spans. A [`SourceFile`] keeps the text and a table of line starts so that
//! spans can be turned into the 1-based `row:col` locations reported to users.

use serde::Serialize;
use std::fmt;

use crate::ast::Span;

/// A resolved source position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Location {
    pub file: String,
    pub row: usize,
    pub col: usize,
    /// Source text covered by the span (trimmed to its first line).
    pub text: String,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.row, self.col)
    }
}

/// Source text plus a line index.
#[derive(Debug, Clone)]
pub struct SourceFile {
    name: String,
    text: String,
    line_starts: Vec<usize>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        let mut line_starts = vec![0];
        line_starts.extend(text.char_indices().filter(|(_, c)| *c == '\n').map(|(i, _)| i + 1));
        Self {
            name: name.into(),
            text,
            line_starts,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// 1-based row and column for a byte offset.
    pub fn row_col(&self, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.text.len());
        let line = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        let line_start = self.line_starts[line];
        let col = self.text[line_start..offset].chars().count() + 1;
        (line + 1, col)
    }

    /// Resolve a span into a [`Location`].
    pub fn location(&self, span: Span) -> Location {
        let (row, col) = self.row_col(span.start);
        let start = span.start.min(self.text.len());
        let end = span.end.clamp(start, self.text.len());
        let text = self
            .text
            .get(start..end)
            .and_then(|s| s.lines().next())
            .unwrap_or("")
            .trim_end()
            .to_string();
        Location {
            file: self.name.clone(),
            row,
            col,
            text,
        }
    }
}
