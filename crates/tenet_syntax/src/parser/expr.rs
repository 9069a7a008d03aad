/// Expression parsing methods.
///
/// This chunk implements the expression grammar using a precedence ladder:
/// binding (`:=`, `=`) → comparison → additive → multiplicative → unary → postfix → primary.
///
/// ## Notes
/// - Binding and comparison operators do not chain: `a == b == c` is a syntax error.
/// - Newlines are insignificant inside `()`, `[]`, `{}` and call arguments.
impl<'a> Parser<'a> {
    // ========================================================================
    // Expressions
    // ========================================================================

    fn expression(&mut self) -> Result<Spanned<Expr>, CompileError> {
        self.binding()
    }

    fn binding(&mut self) -> Result<Spanned<Expr>, CompileError> {
        let left = self.comparison()?;

        let op = if self.match_op(OperatorId::Assign) {
            BinaryOp::Assign
        } else if self.match_op(OperatorId::Unify) {
            BinaryOp::Unify
        } else {
            return Ok(left);
        };

        let right = self.comparison()?;
        self.reject_chain(OperatorId::Assign, OperatorId::Unify)?;
        let span = left.span.merge(right.span);
        Ok(Spanned::new(Expr::Binary(Box::new(left), op, Box::new(right)), span))
    }

    fn comparison(&mut self) -> Result<Spanned<Expr>, CompileError> {
        let left = self.additive()?;

        let op = if self.match_op(OperatorId::EqEq) {
            BinaryOp::Eq
        } else if self.match_op(OperatorId::NotEq) {
            BinaryOp::NotEq
        } else if self.match_op(OperatorId::LtEq) {
            BinaryOp::LtEq
        } else if self.match_op(OperatorId::Lt) {
            BinaryOp::Lt
        } else if self.match_op(OperatorId::GtEq) {
            BinaryOp::GtEq
        } else if self.match_op(OperatorId::Gt) {
            BinaryOp::Gt
        } else {
            return Ok(left);
        };

        let right = self.additive()?;
        if self.peek().operator_id().is_some_and(|id| {
            matches!(
                id,
                OperatorId::EqEq | OperatorId::NotEq | OperatorId::Lt | OperatorId::LtEq | OperatorId::Gt | OperatorId::GtEq
            )
        }) {
            return Err(CompileError::syntax(
                "Comparison operators cannot be chained".to_string(),
                self.current_span(),
            )
            .with_hint("Split the comparison into separate body expressions."));
        }
        let span = left.span.merge(right.span);
        Ok(Spanned::new(Expr::Binary(Box::new(left), op, Box::new(right)), span))
    }

    fn additive(&mut self) -> Result<Spanned<Expr>, CompileError> {
        let mut left = self.multiplicative()?;

        loop {
            let op = if self.match_op(OperatorId::Plus) {
                BinaryOp::Add
            } else if self.match_op(OperatorId::Minus) {
                BinaryOp::Sub
            } else {
                break;
            };

            let right = self.multiplicative()?;
            let span = left.span.merge(right.span);
            left = Spanned::new(Expr::Binary(Box::new(left), op, Box::new(right)), span);
        }

        Ok(left)
    }

    fn multiplicative(&mut self) -> Result<Spanned<Expr>, CompileError> {
        let mut left = self.unary()?;

        loop {
            let op = if self.match_op(OperatorId::Star) {
                BinaryOp::Mul
            } else if self.match_op(OperatorId::Slash) {
                BinaryOp::Div
            } else if self.match_op(OperatorId::Percent) {
                BinaryOp::Mod
            } else {
                break;
            };

            let right = self.unary()?;
            let span = left.span.merge(right.span);
            left = Spanned::new(Expr::Binary(Box::new(left), op, Box::new(right)), span);
        }

        Ok(left)
    }

    fn unary(&mut self) -> Result<Spanned<Expr>, CompileError> {
        if self.match_op(OperatorId::Minus) {
            let start = self.previous_span().start;
            let expr = self.unary()?;
            let span = Span::new(start, expr.span.end);
            // Fold negative number literals so `-1` prints and compares as a literal.
            if let Expr::Literal(Literal::Number(n)) = expr.node {
                return Ok(Spanned::new(Expr::Literal(Literal::Number(-n)), span));
            }
            Ok(Spanned::new(Expr::Neg(Box::new(expr)), span))
        } else {
            self.postfix()
        }
    }

    /// Parse a reference or call: `a.b.c`, `a.b(x)`, `input.xs[0].name`.
    fn postfix(&mut self) -> Result<Spanned<Expr>, CompileError> {
        if !matches!(self.peek().kind, TokenKind::Ident(_)) {
            return self.primary();
        }

        let head = self.identifier_spanned()?;
        let mut names = vec![head.node];
        let mut path: Vec<Spanned<RefSegment>> = Vec::new();
        let start = head.span.start;

        // Dotted prefix, which may still turn out to be a function name.
        while self.check_punct(PunctuationId::Dot) && matches!(self.peek_next_kind(), TokenKind::Ident(_)) {
            self.advance();
            let field = self.identifier_spanned()?;
            names.push(field.node.clone());
            path.push(Spanned::new(RefSegment::Field(field.node), field.span));
        }

        if self.match_punct(PunctuationId::LParen) {
            let args = self.call_args()?;
            let span = Span::new(start, self.previous_span().end);
            return Ok(Spanned::new(Expr::Call { name: names, args }, span));
        }

        loop {
            if self.match_punct(PunctuationId::LBracket) {
                let seg_start = self.previous_span().start;
                self.skip_newlines();
                let index = self.expression()?;
                self.skip_newlines();
                self.expect_punct(PunctuationId::RBracket, "Expected ']' after index")?;
                let seg_span = Span::new(seg_start, self.previous_span().end);
                path.push(Spanned::new(RefSegment::Index(Box::new(index)), seg_span));
            } else if self.match_punct(PunctuationId::Dot) {
                let field = self.identifier_spanned()?;
                path.push(Spanned::new(RefSegment::Field(field.node), field.span));
            } else {
                break;
            }
        }

        let span = Span::new(start, self.previous_span().end);
        let head = names.swap_remove(0);
        Ok(Spanned::new(Expr::Ref(Ref { head, path }), span))
    }

    fn primary(&mut self) -> Result<Spanned<Expr>, CompileError> {
        let start = self.current_span().start;

        if let Some(lit) = self.try_literal() {
            return Ok(Spanned::new(Expr::Literal(lit), self.previous_span()));
        }

        if self.match_punct(PunctuationId::LParen) {
            self.skip_newlines();
            let inner = self.expression()?;
            self.skip_newlines();
            self.expect_punct(PunctuationId::RParen, "Expected ')'")?;
            let span = Span::new(start, self.previous_span().end);
            return Ok(Spanned::new(Expr::Paren(Box::new(inner)), span));
        }

        if self.match_punct(PunctuationId::LBracket) {
            let items = self.comma_list(PunctuationId::RBracket, "Expected ']' after array items", |p| p.expression())?;
            let span = Span::new(start, self.previous_span().end);
            return Ok(Spanned::new(Expr::Array(items), span));
        }

        if self.match_punct(PunctuationId::LBrace) {
            let pairs = self.comma_list(PunctuationId::RBrace, "Expected '}' after object items", |p| {
                let key = p.comparison()?;
                p.skip_newlines();
                p.expect_punct(PunctuationId::Colon, "Expected ':' after object key")?;
                p.skip_newlines();
                let value = p.comparison()?;
                Ok((key, value))
            })?;
            let span = Span::new(start, self.previous_span().end);
            return Ok(Spanned::new(Expr::Object(pairs), span));
        }

        Err(CompileError::syntax(
            format!("Expected expression, found {:?}", self.peek().kind),
            self.current_span(),
        ))
    }

    fn try_literal(&mut self) -> Option<Literal> {
        let lit = match &self.peek().kind {
            TokenKind::Number(n) => Literal::Number(*n),
            TokenKind::String(s) => Literal::String(s.clone()),
            TokenKind::Keyword(KeywordId::True) => Literal::Bool(true),
            TokenKind::Keyword(KeywordId::False) => Literal::Bool(false),
            TokenKind::Keyword(KeywordId::Null) => Literal::Null,
            _ => return None,
        };
        self.advance();
        Some(lit)
    }

    fn call_args(&mut self) -> Result<Vec<Spanned<Expr>>, CompileError> {
        self.comma_list(PunctuationId::RParen, "Expected ')' after arguments", |p| p.expression())
    }

    /// Parse `item (, item)* [,] close`, with the opening token already consumed.
    fn comma_list<T>(
        &mut self,
        close: PunctuationId,
        msg: &str,
        mut item: impl FnMut(&mut Self) -> Result<T, CompileError>,
    ) -> Result<Vec<T>, CompileError> {
        let mut items = Vec::new();
        self.skip_newlines();
        while !self.check_punct(close) {
            if !self.is_at_expr_start() {
                return Err(CompileError::syntax(
                    format!("{}, found {:?}", msg, self.peek().kind),
                    self.current_span(),
                ));
            }
            items.push(item(self)?);
            self.skip_newlines();
            if !self.match_punct(PunctuationId::Comma) {
                break;
            }
            self.skip_newlines();
        }
        self.expect_punct(close, msg)?;
        Ok(items)
    }
}
