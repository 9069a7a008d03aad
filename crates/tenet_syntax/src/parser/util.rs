/// Miscellaneous parser utilities.
///
/// Identifier parsing and small lookahead helpers shared by the other chunks.
impl<'a> Parser<'a> {
    // ========================================================================
    // Utilities
    // ========================================================================

    fn identifier(&mut self) -> Result<Ident, CompileError> {
        self.identifier_spanned().map(|s| s.node)
    }

    fn identifier_spanned(&mut self) -> Result<Spanned<Ident>, CompileError> {
        match &self.peek().kind {
            TokenKind::Ident(name) => {
                let span = self.current_span();
                let name = name.clone();
                self.advance();
                Ok(Spanned::new(name, span))
            }
            _ => Err(CompileError::syntax(
                format!("Expected identifier, found {:?}", self.peek().kind),
                self.current_span(),
            )),
        }
    }

    fn peek_next_kind(&self) -> &TokenKind {
        let idx = (self.pos + 1).min(self.tokens.len() - 1);
        &self.tokens[idx].kind
    }

    /// Error if another binding operator follows a complete binding.
    fn reject_chain(&self, a: OperatorId, b: OperatorId) -> Result<(), CompileError> {
        if self.check_op(a) || self.check_op(b) {
            Err(CompileError::syntax(
                "Binding operators cannot be chained".to_string(),
                self.current_span(),
            ))
        } else {
            Ok(())
        }
    }
}
