// Parser core types and entrypoint. This chunk is `include!`'d into `crate::parser`.

/// Parser state.
///
/// ## Notes
/// - The parser is single-pass and recovers from errors by synchronizing at rule boundaries,
///   so one run can report several problems.
pub struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    errors: Vec<CompileError>,
}

impl<'a> Parser<'a> {
    /// Create a new parser for a token stream.
    ///
    /// ## Parameters
    /// - `tokens`: Token stream produced by `tenet_syntax::lexer`. Must end with `Eof`.
    pub fn new(tokens: &'a [Token]) -> Self {
        Self {
            tokens,
            pos: 0,
            errors: Vec::new(),
        }
    }

    /// Parse the entire token stream into a [`Module`].
    ///
    /// ## Errors
    /// Returns a list of [`CompileError`]s if parsing fails.
    pub fn parse(mut self) -> Result<Module, Vec<CompileError>> {
        self.skip_newlines();

        let package = match self.package_decl() {
            Ok(package) => package,
            Err(e) => {
                // Without a package nothing else can be attributed; stop here.
                self.errors.push(e);
                return Err(self.errors);
            }
        };

        let mut rules = Vec::new();
        self.skip_newlines();
        while !self.is_at_end() {
            match self.rule() {
                Ok(rule) => rules.push(rule),
                Err(e) => {
                    self.errors.push(e);
                    self.synchronize();
                }
            }
            self.skip_newlines();
        }

        if self.errors.is_empty() {
            Ok(Module { package, rules })
        } else {
            Err(self.errors)
        }
    }
}
