/// Package and rule parsing.
///
/// ```text
/// module := "package" ident ("." ident)* NEWLINE rule*
/// rule   := ["default"] ident ["=" expr] ["{" body "}"] (NEWLINE | EOF)
/// body   := body_expr ((";" | NEWLINE) body_expr)*
/// body_expr := ["not"] expr
/// ```
impl<'a> Parser<'a> {
    // ========================================================================
    // Declarations
    // ========================================================================

    fn package_decl(&mut self) -> Result<Spanned<Vec<Ident>>, CompileError> {
        let start = self
            .expect_keyword(KeywordId::Package, "Expected 'package' declaration")?
            .span
            .start;

        let mut path = vec![self.identifier()?];
        while self.match_punct(PunctuationId::Dot) {
            path.push(self.identifier()?);
        }
        let span = Span::new(start, self.previous_span().end);
        self.end_of_line("package declaration")?;
        Ok(Spanned::new(path, span))
    }

    fn rule(&mut self) -> Result<Spanned<Rule>, CompileError> {
        let start = self.current_span().start;
        let is_default = self.match_keyword(KeywordId::Default);
        let name = self.identifier_spanned()?;

        let value = if self.match_op(OperatorId::Unify) {
            Some(self.expression()?)
        } else {
            None
        };

        let body = if self.check_punct(PunctuationId::LBrace) {
            Some(self.rule_body()?)
        } else {
            None
        };

        if value.is_none() && body.is_none() {
            return Err(CompileError::syntax(
                format!("Rule '{}' needs a value or a body", name.node),
                name.span,
            )
            .with_hint("Write `name = value`, `name { ... }`, or both."));
        }

        let span = Span::new(start, self.previous_span().end);
        self.end_of_line("rule")?;

        Ok(Spanned::new(
            Rule {
                is_default,
                name,
                value,
                body,
            },
            span,
        ))
    }

    fn rule_body(&mut self) -> Result<Vec<Spanned<BodyExpr>>, CompileError> {
        let open = self.expect_punct(PunctuationId::LBrace, "Expected '{'")?.span;
        let mut exprs = Vec::new();

        self.skip_separators();
        while !self.check_punct(PunctuationId::RBrace) {
            if self.is_at_end() {
                return Err(CompileError::syntax(
                    "Unterminated rule body, expected '}'".to_string(),
                    open,
                ));
            }
            exprs.push(self.body_expr()?);

            if !self.peek().kind.is_separator() && !self.check_punct(PunctuationId::RBrace) {
                return Err(CompileError::syntax(
                    format!("Expected ';' or newline between expressions, found {:?}", self.peek().kind),
                    self.current_span(),
                ));
            }
            self.skip_separators();
        }
        let close = self.expect_punct(PunctuationId::RBrace, "Expected '}'")?.span;

        if exprs.is_empty() {
            return Err(CompileError::syntax(
                "Found empty rule body".to_string(),
                open.merge(close),
            ));
        }
        Ok(exprs)
    }

    fn body_expr(&mut self) -> Result<Spanned<BodyExpr>, CompileError> {
        let start = self.current_span().start;
        let negated = self.match_keyword(KeywordId::Not);
        let expr = self.expression()?;
        let span = Span::new(start, expr.span.end);
        Ok(Spanned::new(BodyExpr { negated, expr }, span))
    }

    /// Require a newline (or end of input) after a top-level item.
    fn end_of_line(&mut self, what: &str) -> Result<(), CompileError> {
        if self.is_at_end() || matches!(self.peek().kind, TokenKind::Newline) {
            Ok(())
        } else {
            Err(CompileError::syntax(
                format!("Expected newline after {}, found {:?}", what, self.peek().kind),
                self.current_span(),
            ))
        }
    }
}
