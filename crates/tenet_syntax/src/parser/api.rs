/// Parse a token stream into a [`Module`].
///
/// This is the main public entrypoint for parsing.
///
/// ## Parameters
/// - `tokens`: Token stream produced by `tenet_syntax::lexer`.
///
/// ## Errors
/// Returns `Err(Vec<CompileError>)` if parsing fails.
#[tracing::instrument(skip_all, fields(token_count = tokens.len()))]
pub fn parse(tokens: &[Token]) -> Result<Module, Vec<CompileError>> {
    if tokens.is_empty() {
        return Err(vec![CompileError::syntax("Empty token stream".to_string(), Span::default())]);
    }
    Parser::new(tokens).parse()
}

/// Lex and parse a source string in one step.
pub fn parse_source(source: &str) -> Result<Module, Vec<CompileError>> {
    let tokens = crate::lexer::lex(source)?;
    parse(&tokens)
}
