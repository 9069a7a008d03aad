//! Compilation: group parsed files into packages and reject ill-formed rules.
//!
//! A package may span several files. Rules keep a stable source order: file path ascending, then position within
//! the file. Every error is reported at once; a compile failure aborts the whole run before any test is evaluated.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use thiserror::Error;

use tenet_core::{DATA_ROOT, INPUT_ROOT};
use tenet_syntax::ast::{BinaryOp, BodyExpr, Expr, Module, RefSegment, Rule, Span, Spanned};
use tenet_syntax::diagnostics::{CompileError, errors};
use tenet_syntax::source::{Location, SourceFile};

use super::Builtins;

/// A parsed file together with its source text (for locations).
#[derive(Debug, Clone)]
pub struct ParsedModule {
    pub source: Arc<SourceFile>,
    pub module: Module,
}

/// A compile error resolved to a file location.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{location}: {error}")]
pub struct LocatedError {
    pub location: Location,
    pub error: CompileError,
}

/// One rule definition inside a compiled package.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    /// Dotted package path without the `data.` root, e.g. `foo.bar`.
    pub package: String,
    /// Position among all definitions of the package.
    pub index: usize,
    pub file: Arc<SourceFile>,
    pub rule: Spanned<Rule>,
}

impl CompiledRule {
    pub fn name(&self) -> &str {
        &self.rule.node.name.node
    }

    /// Fully qualified reference, e.g. `data.foo.allow`.
    pub fn path(&self) -> String {
        format!("{}.{}.{}", DATA_ROOT, self.package, self.name())
    }

    /// Location of the rule head.
    pub fn location(&self) -> Location {
        self.file.location(self.rule.node.name.span)
    }

    pub fn location_of(&self, span: Span) -> Location {
        self.file.location(span)
    }
}

#[derive(Debug, Clone, Default)]
pub struct CompiledPackage {
    pub path: String,
    pub rules: Vec<CompiledRule>,
    by_name: BTreeMap<String, Vec<usize>>,
}

impl CompiledPackage {
    /// All definitions sharing `name`, in source order.
    pub fn definitions<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a CompiledRule> + 'a {
        self.by_name
            .get(name)
            .into_iter()
            .flatten()
            .map(move |&i| &self.rules[i])
    }

    pub fn has_rule(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }
}

/// The compiled set of packages, keyed by dotted path.
#[derive(Debug, Clone, Default)]
pub struct Compiled {
    packages: BTreeMap<String, CompiledPackage>,
}

impl Compiled {
    /// Packages in ascending path order.
    pub fn packages(&self) -> impl Iterator<Item = &CompiledPackage> {
        self.packages.values()
    }

    pub fn package(&self, path: &str) -> Option<&CompiledPackage> {
        self.packages.get(path)
    }

    pub fn rule(&self, package: &str, index: usize) -> Option<&CompiledRule> {
        self.packages.get(package).and_then(|p| p.rules.get(index))
    }

    fn push(&mut self, package: &str, file: &Arc<SourceFile>, rule: &Spanned<Rule>) {
        let pkg = self.packages.entry(package.to_string()).or_insert_with(|| CompiledPackage {
            path: package.to_string(),
            ..Default::default()
        });
        let index = pkg.rules.len();
        pkg.by_name.entry(rule.node.name.node.clone()).or_default().push(index);
        pkg.rules.push(CompiledRule {
            package: package.to_string(),
            index,
            file: Arc::clone(file),
            rule: rule.clone(),
        });
    }
}

/// Compile a set of parsed files.
///
/// ## Errors
/// Returns every [`LocatedError`] found: unknown functions, arity mismatches, unsafe or re-declared variables,
/// misplaced bindings, `default` rules with bodies or duplicates, and rules that collide with package names.
#[tracing::instrument(skip_all, fields(files = modules.len()))]
pub fn compile(modules: &BTreeMap<String, ParsedModule>, builtins: &Builtins) -> Result<Compiled, Vec<LocatedError>> {
    let mut compiled = Compiled::default();
    for parsed in modules.values() {
        let package = parsed.module.package_path();
        for rule in &parsed.module.rules {
            compiled.push(&package, &parsed.source, rule);
        }
    }

    let mut located = Vec::new();
    for package in compiled.packages() {
        let mut checker = Checker {
            compiled: &compiled,
            package,
            builtins,
            errors: Vec::new(),
        };
        checker.check_package();
        located.extend(checker.errors);
    }

    if located.is_empty() {
        tracing::debug!(packages = compiled.packages.len(), "compiled");
        Ok(compiled)
    } else {
        Err(located)
    }
}

// ============================================================================
// Checks
// ============================================================================

struct Checker<'a> {
    compiled: &'a Compiled,
    package: &'a CompiledPackage,
    builtins: &'a Builtins,
    errors: Vec<LocatedError>,
}

impl Checker<'_> {
    fn check_package(&mut self) {
        let package = self.package;
        let mut defaults = BTreeSet::new();
        for rule in &package.rules {
            let mut errs = Vec::new();
            self.check_rule(&rule.rule.node, &mut defaults, &mut errs);
            self.errors.extend(errs.into_iter().map(|error| LocatedError {
                location: rule.file.location(error.span),
                error,
            }));
        }
    }

    fn check_rule(&self, rule: &Rule, defaults: &mut BTreeSet<String>, errs: &mut Vec<CompileError>) {
        let name = &rule.name.node;

        if rule.is_default {
            if rule.body.is_some() {
                errs.push(CompileError::semantic(
                    format!("default rule {} must not have a body", name),
                    rule.name.span,
                ));
            }
            if !defaults.insert(name.clone()) {
                errs.push(CompileError::semantic(
                    format!("multiple default rules {} found", name),
                    rule.name.span,
                ));
            }
        }

        let nested = format!("{}.{}", self.package.path, name);
        if self
            .compiled
            .packages
            .keys()
            .any(|p| p == &nested || p.starts_with(&format!("{}.", nested)))
        {
            errs.push(CompileError::semantic(
                format!("rule {} conflicts with package {}.{}", name, DATA_ROOT, nested),
                rule.name.span,
            ));
        }

        let mut scope = BTreeSet::new();
        for expr in rule.body_exprs() {
            self.check_body_expr(&mut scope, &expr.node, errs);
        }
        if let Some(value) = &rule.value {
            self.check_expr(&scope, value, errs);
        }
    }

    fn is_bound(&self, scope: &BTreeSet<String>, name: &str) -> bool {
        scope.contains(name) || name == INPUT_ROOT || name == DATA_ROOT || self.package.has_rule(name)
    }

    /// Name of a bare variable that is not bound yet.
    fn unbound_var<'e>(&self, scope: &BTreeSet<String>, expr: &'e Spanned<Expr>) -> Option<&'e str> {
        expr.node.as_var().filter(|v| !self.is_bound(scope, v))
    }

    fn check_body_expr(&self, scope: &mut BTreeSet<String>, body: &BodyExpr, errs: &mut Vec<CompileError>) {
        match &body.expr.node {
            Expr::Binary(lhs, BinaryOp::Assign, rhs) => {
                if body.negated {
                    errs.push(CompileError::semantic(
                        "cannot assign in a negated expression".to_string(),
                        body.expr.span,
                    ));
                }
                self.check_expr(scope, rhs, errs);
                match lhs.node.as_var() {
                    Some(var) if self.is_bound(scope, var) => {
                        errs.push(errors::redeclared_var(var, lhs.span));
                    }
                    Some(var) => {
                        if !body.negated {
                            scope.insert(var.to_string());
                        }
                    }
                    None => errs.push(CompileError::semantic(
                        format!("cannot assign to {}", lhs.node),
                        lhs.span,
                    )),
                }
            }
            Expr::Binary(lhs, BinaryOp::Unify, rhs) => {
                match (self.unbound_var(scope, lhs), self.unbound_var(scope, rhs)) {
                    (Some(var), Some(_)) => errs.push(errors::unsafe_var(var, lhs.span)),
                    (Some(var), None) => self.bind(scope, var, lhs.span, rhs, body.negated, errs),
                    (None, Some(var)) => self.bind(scope, var, rhs.span, lhs, body.negated, errs),
                    (None, None) => {
                        self.check_expr(scope, lhs, errs);
                        self.check_expr(scope, rhs, errs);
                    }
                }
            }
            _ => self.check_expr(scope, &body.expr, errs),
        }
    }

    fn bind(
        &self,
        scope: &mut BTreeSet<String>,
        var: &str,
        var_span: Span,
        other: &Spanned<Expr>,
        negated: bool,
        errs: &mut Vec<CompileError>,
    ) {
        self.check_expr(scope, other, errs);
        if negated {
            errs.push(errors::unsafe_var(var, var_span));
        } else {
            scope.insert(var.to_string());
        }
    }

    fn check_expr(&self, scope: &BTreeSet<String>, expr: &Spanned<Expr>, errs: &mut Vec<CompileError>) {
        match &expr.node {
            Expr::Literal(_) => {}
            Expr::Ref(r) => {
                if !self.is_bound(scope, &r.head) {
                    errs.push(errors::unsafe_var(&r.head, expr.span));
                }
                for seg in &r.path {
                    if let RefSegment::Index(index) = &seg.node {
                        self.check_expr(scope, index, errs);
                    }
                }
            }
            Expr::Call { name, args } => {
                let name = name.join(".");
                match self.builtins.get(&name) {
                    None => errs.push(errors::unknown_function(&name, expr.span)),
                    Some(b) if b.arity != args.len() => {
                        errs.push(errors::arity_mismatch(&name, b.arity, args.len(), expr.span));
                    }
                    Some(_) => {}
                }
                for arg in args {
                    self.check_expr(scope, arg, errs);
                }
            }
            Expr::Array(items) => {
                for item in items {
                    self.check_expr(scope, item, errs);
                }
            }
            Expr::Object(pairs) => {
                for (k, v) in pairs {
                    self.check_expr(scope, k, errs);
                    self.check_expr(scope, v, errs);
                }
            }
            Expr::Binary(_, op @ (BinaryOp::Assign | BinaryOp::Unify), _) => {
                errs.push(CompileError::semantic(
                    format!("{} is only allowed at the top of a body expression", op.as_str()),
                    expr.span,
                ));
            }
            Expr::Binary(lhs, _, rhs) => {
                self.check_expr(scope, lhs, errs);
                self.check_expr(scope, rhs, errs);
            }
            Expr::Neg(inner) | Expr::Paren(inner) => self.check_expr(scope, inner, errs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::test_support::modules;

    fn compile_errs(text: &str) -> Vec<String> {
        compile(&modules(&[("p.tnt", text)]), &Builtins::standard())
            .unwrap_err()
            .iter()
            .map(|e| e.error.message.clone())
            .collect()
    }

    #[test]
    fn test_package_spans_files_in_path_order() {
        let compiled = compile(
            &modules(&[
                ("b.tnt", "package p\ntest_b { true }\n"),
                ("a.tnt", "package p\ntest_a { true }\n"),
            ]),
            &Builtins::standard(),
        )
        .unwrap();
        let pkg = compiled.package("p").unwrap();
        let names: Vec<_> = pkg.rules.iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["test_a", "test_b"]);
        assert_eq!(pkg.rules[1].file.name(), "b.tnt");
        assert_eq!(pkg.rules[1].index, 1);
    }

    #[test]
    fn test_definitions_group_by_name() {
        let compiled = compile(
            &modules(&[("a.tnt", "package p\nx = 1\ny = 2\nx = 3\n")]),
            &Builtins::standard(),
        )
        .unwrap();
        let pkg = compiled.package("p").unwrap();
        let idx: Vec<_> = pkg.definitions("x").map(|r| r.index).collect();
        assert_eq!(idx, vec![0, 2]);
        assert_eq!(pkg.rules[0].path(), "data.p.x");
    }

    #[test]
    fn test_unknown_function() {
        let errs = compile_errs("package p\nr { nope(1) }\n");
        assert_eq!(errs, vec!["undefined function nope".to_string()]);
    }

    #[test]
    fn test_arity_mismatch() {
        let errs = compile_errs("package p\nr { count(1, 2) }\n");
        assert!(errs[0].contains("expected 1 argument(s), found 2"));
    }

    #[test]
    fn test_unsafe_var() {
        let errs = compile_errs("package p\nr { x == 1 }\n");
        assert_eq!(errs, vec!["var x is unsafe".to_string()]);
    }

    #[test]
    fn test_unify_binds_var() {
        let ok = compile(
            &modules(&[("a.tnt", "package p\nr { x = input.a; x > 1 }\n")]),
            &Builtins::standard(),
        );
        assert!(ok.is_ok());
    }

    #[test]
    fn test_redeclared_var() {
        let errs = compile_errs("package p\nr { x := 1; x := 2 }\n");
        assert_eq!(errs, vec!["var x assigned above".to_string()]);
    }

    #[test]
    fn test_default_with_body() {
        let errs = compile_errs("package p\ndefault allow = false { true }\n");
        assert!(errs[0].contains("must not have a body"));
    }

    #[test]
    fn test_nested_binding_rejected() {
        let errs = compile_errs("package p\nr { count([x := 1]) }\n");
        assert!(errs[0].contains("only allowed at the top"));
    }

    #[test]
    fn test_rule_package_conflict() {
        let result = compile(
            &modules(&[
                ("a.tnt", "package a\nb = 1\n"),
                ("b.tnt", "package a.b\nc = 1\n"),
            ]),
            &Builtins::standard(),
        );
        let errs = result.unwrap_err();
        assert_eq!(errs.len(), 1);
        assert!(errs[0].error.message.contains("conflicts with package data.a.b"));
        assert_eq!(errs[0].location.to_string(), "a.tnt:2:1");
    }

    #[test]
    fn test_custom_builtin_accepted() {
        let mut builtins = Builtins::standard();
        builtins.register("test.sleep", 1, |_| Ok(crate::eval::Value::Null));
        let ok = compile(&modules(&[("a.tnt", "package p\nr { test.sleep(1) }\n")]), &builtins);
        assert!(ok.is_ok());
    }
}
