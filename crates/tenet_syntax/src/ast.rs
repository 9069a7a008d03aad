//! Abstract Syntax Tree definitions for Tenet
//!
//! A module is a package declaration followed by rules. A rule has an optional head value and an optional body; the
//! body is a conjunction of expressions evaluated in source order.

use std::fmt;

/// Source location span (byte offsets)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

/// A node with source location
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }
}

pub type Ident = String;

/// A parsed source file: one package declaration and its rules in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub package: Spanned<Vec<Ident>>,
    pub rules: Vec<Spanned<Rule>>,
}

impl Module {
    /// Dotted package path, e.g. `foo.bar`.
    pub fn package_path(&self) -> String {
        self.package.node.join(".")
    }
}

/// One rule definition.
///
/// Several definitions may share a name; each is a separate disjunct.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub is_default: bool,
    pub name: Spanned<Ident>,
    /// Head value (`name = value`); `None` means the rule yields `true`.
    pub value: Option<Spanned<Expr>>,
    /// Body expressions; `None` for constant rules such as `x = 1`.
    pub body: Option<Vec<Spanned<BodyExpr>>>,
}

impl Rule {
    pub fn body_exprs(&self) -> &[Spanned<BodyExpr>] {
        self.body.as_deref().unwrap_or(&[])
    }
}

/// One conjunct of a rule body.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyExpr {
    pub negated: bool,
    pub expr: Spanned<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Literal),
    Ref(Ref),
    Call { name: Vec<Ident>, args: Vec<Spanned<Expr>> },
    Array(Vec<Spanned<Expr>>),
    Object(Vec<(Spanned<Expr>, Spanned<Expr>)>),
    Binary(Box<Spanned<Expr>>, BinaryOp, Box<Spanned<Expr>>),
    Neg(Box<Spanned<Expr>>),
    Paren(Box<Spanned<Expr>>),
}

impl Expr {
    /// Return the variable name if this is a bare identifier with no path.
    pub fn as_var(&self) -> Option<&str> {
        match self {
            Expr::Ref(r) if r.path.is_empty() => Some(r.head.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
}

/// A reference such as `input.user.roles[0]` or `data.foo.allow`.
#[derive(Debug, Clone, PartialEq)]
pub struct Ref {
    pub head: Ident,
    pub path: Vec<Spanned<RefSegment>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RefSegment {
    Field(Ident),
    Index(Box<Spanned<Expr>>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Assign,
    Unify,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl BinaryOp {
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Eq | BinaryOp::NotEq | BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOp::Assign => ":=",
            BinaryOp::Unify => "=",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
        }
    }
}

// ============================================================================
// Display (used by `--parse` and trace descriptions)
// ============================================================================

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Null => write!(f, "null"),
            Literal::Bool(b) => write!(f, "{}", b),
            Literal::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Literal::Number(n) => write!(f, "{}", n),
            Literal::String(s) => write!(f, "{:?}", s),
        }
    }
}

impl fmt::Display for Ref {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.head)?;
        for seg in &self.path {
            match &seg.node {
                RefSegment::Field(name) => write!(f, ".{}", name)?,
                RefSegment::Index(expr) => write!(f, "[{}]", expr.node)?,
            }
        }
        Ok(())
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(lit) => write!(f, "{}", lit),
            Expr::Ref(r) => write!(f, "{}", r),
            Expr::Call { name, args } => {
                write!(f, "{}(", name.join("."))?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg.node)?;
                }
                write!(f, ")")
            }
            Expr::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item.node)?;
                }
                write!(f, "]")
            }
            Expr::Object(pairs) => {
                write!(f, "{{")?;
                for (i, (k, v)) in pairs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", k.node, v.node)?;
                }
                write!(f, "}}")
            }
            Expr::Binary(l, op, r) => write!(f, "{} {} {}", l.node, op.as_str(), r.node),
            Expr::Neg(inner) => write!(f, "-{}", inner.node),
            Expr::Paren(inner) => write!(f, "({})", inner.node),
        }
    }
}

impl fmt::Display for BodyExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            write!(f, "not ")?;
        }
        write!(f, "{}", self.expr.node)
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_default {
            write!(f, "default ")?;
        }
        write!(f, "{}", self.name.node)?;
        if let Some(value) = &self.value {
            write!(f, " = {}", value.node)?;
        }
        if let Some(body) = &self.body {
            write!(f, " {{ ")?;
            for (i, expr) in body.iter().enumerate() {
                if i > 0 {
                    write!(f, "; ")?;
                }
                write!(f, "{}", expr.node)?;
            }
            write!(f, " }}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "package {}", self.package_path())?;
        for rule in &self.rules {
            writeln!(f, "{}", rule.node)?;
        }
        Ok(())
    }
}
