//! Top-down rule evaluator.
//!
//! Rule bodies are conjunctions evaluated in source order. Each body expression either holds or not; the first one
//! that is false or undefined stops the body and the definition yields no value. Definitions that share a name are
//! evaluated one by one and their values merged: more than one distinct value is a conflict, none falls back to the
//! `default` definition.
//!
//! ## Cancellation
//!
//! The context is checked on rule entry, before every body expression and after every builtin call. A builtin that
//! blocks is therefore only interrupted once it returns.
//!
//! ## Tracing
//!
//! Events are emitted for the definition being evaluated (`depth` 0) and for every rule it pulls in (`depth` + 1 per
//! level). Event payloads are only built when the tracer is enabled.
//!
//! ## Indexing
//!
//! A body expression that compares an `input` or `data` reference with a literal (`input.x = 1`, `data.a.b == "y"`)
//! acts as an index on its definition. If the document does not match, the definition is skipped before its body
//! runs and emits no events.

use std::collections::BTreeMap;

use tenet_core::{DATA_ROOT, INPUT_ROOT};
use tenet_syntax::ast::{BinaryOp, BodyExpr, Expr, Literal, Ref, RefSegment, Span, Spanned};

use super::compile::{Compiled, CompiledPackage, CompiledRule};
use super::trace::{NoopTracer, TraceEvent, TraceOp, Tracer};
use super::{Builtins, Context, EvalError, Store, Value};

type Env = BTreeMap<String, Value>;
type EvalResult = Result<Option<Value>, EvalError>;

/// Evaluates compiled rules against a store and an optional input document.
///
/// An evaluator caches rule values; create a fresh one for every independent query.
pub struct Evaluator<'a> {
    compiled: &'a Compiled,
    store: &'a dyn Store,
    builtins: &'a Builtins,
    ctx: &'a Context,
    input: Option<&'a Value>,
    cache: BTreeMap<(String, String), Option<Value>>,
    stack: Vec<(String, String)>,
    depth: usize,
}

impl<'a> Evaluator<'a> {
    pub fn new(compiled: &'a Compiled, store: &'a dyn Store, builtins: &'a Builtins, ctx: &'a Context) -> Self {
        Self {
            compiled,
            store,
            builtins,
            ctx,
            input: None,
            cache: BTreeMap::new(),
            stack: Vec::new(),
            depth: 0,
        }
    }

    pub fn with_input(mut self, input: Option<&'a Value>) -> Self {
        self.input = input;
        self
    }

    /// Evaluate one definition on its own, ignoring other definitions that share its name.
    ///
    /// Returns `Ok(None)` when the body does not hold.
    pub fn eval_rule(&mut self, rule: &CompiledRule, tracer: &mut dyn Tracer) -> EvalResult {
        self.depth = 0;
        self.stack.push((rule.package.clone(), rule.name().to_string()));
        let result = self.eval_definition(rule, tracer);
        self.stack.pop();
        result
    }

    /// Evaluate the full value of `data.<package>.<name>` (all definitions merged).
    pub fn eval_value(&mut self, package: &str, name: &str, tracer: &mut dyn Tracer) -> EvalResult {
        self.eval_named(package, name, tracer)
    }

    // ========================================================================
    // Rules
    // ========================================================================

    fn checkpoint(&self) -> Result<(), EvalError> {
        match self.ctx.err() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn emit(&self, tracer: &mut dyn Tracer, op: TraceOp, rule: &CompiledRule, span: Span, node: impl FnOnce() -> String) {
        if tracer.enabled() {
            tracer.trace(TraceEvent {
                op,
                depth: self.depth,
                node: node(),
                location: Some(rule.location_of(span)),
            });
        }
    }

    fn eval_definition(&mut self, rule: &CompiledRule, tracer: &mut dyn Tracer) -> EvalResult {
        self.checkpoint()?;
        if self.indexed_out(rule)? {
            return Ok(None);
        }
        let head_span = rule.rule.node.name.span;
        self.emit(tracer, TraceOp::Enter, rule, head_span, || rule.path());

        let mut env = Env::new();
        for expr in rule.rule.node.body_exprs() {
            self.checkpoint()?;
            self.emit(tracer, TraceOp::Eval, rule, expr.span, || expr.node.to_string());
            if !self.eval_body_expr(rule, &mut env, &expr.node, tracer)? {
                self.emit(tracer, TraceOp::Fail, rule, expr.span, || expr.node.to_string());
                self.emit(tracer, TraceOp::Exit, rule, head_span, || rule.path());
                return Ok(None);
            }
        }

        let value = match &rule.rule.node.value {
            Some(value) => self.eval_expr(rule, &env, value, tracer)?,
            None => Some(Value::Bool(true)),
        };
        self.emit(tracer, TraceOp::Exit, rule, head_span, || rule.path());
        Ok(value)
    }

    /// `true` when an indexed body expression cannot match the current documents.
    fn indexed_out(&mut self, rule: &CompiledRule) -> Result<bool, EvalError> {
        for body in rule.rule.node.body_exprs() {
            if body.node.negated {
                continue;
            }
            let Expr::Binary(lhs, BinaryOp::Unify | BinaryOp::Eq, rhs) = &body.node.expr.node else {
                continue;
            };
            let Some((r, expected)) = index_key(&lhs.node, &rhs.node).or_else(|| index_key(&rhs.node, &lhs.node))
            else {
                continue;
            };
            let actual = self.eval_ref(rule, &Env::new(), r, &mut NoopTracer)?;
            if actual.as_ref() != Some(&expected) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn eval_named(&mut self, package: &str, name: &str, tracer: &mut dyn Tracer) -> EvalResult {
        let key = (package.to_string(), name.to_string());
        if let Some(value) = self.cache.get(&key) {
            return Ok(value.clone());
        }
        if self.stack.contains(&key) {
            return Err(EvalError::Recursion {
                rule: format!("{}.{}.{}", DATA_ROOT, package, name),
            });
        }
        let compiled = self.compiled;
        let Some(pkg) = compiled.package(package) else {
            return Ok(None);
        };

        self.stack.push(key.clone());
        self.depth += 1;
        let result = self.eval_definitions(pkg, name, tracer);
        self.depth -= 1;
        self.stack.pop();

        let value = result?;
        self.cache.insert(key, value.clone());
        Ok(value)
    }

    fn eval_definitions(&mut self, pkg: &CompiledPackage, name: &str, tracer: &mut dyn Tracer) -> EvalResult {
        let mut values: Vec<Value> = Vec::new();
        let mut default = None;
        for def in pkg.definitions(name) {
            if def.rule.node.is_default {
                default = Some(def);
                continue;
            }
            if let Some(value) = self.eval_definition(def, tracer)? {
                if !values.contains(&value) {
                    values.push(value);
                }
            }
        }

        match values.len() {
            0 => match default.and_then(|def| def.rule.node.value.as_ref().map(|v| (def, v))) {
                Some((def, value)) => self.eval_expr(def, &Env::new(), value, tracer),
                None => Ok(None),
            },
            1 => Ok(values.pop()),
            _ => Err(EvalError::Conflict {
                rule: format!("{}.{}.{}", DATA_ROOT, pkg.path, name),
            }),
        }
    }

    // ========================================================================
    // Body expressions
    // ========================================================================

    fn eval_body_expr(
        &mut self,
        rule: &CompiledRule,
        env: &mut Env,
        body: &BodyExpr,
        tracer: &mut dyn Tracer,
    ) -> Result<bool, EvalError> {
        if body.negated {
            // Bindings made under `not` never escape.
            let mut scratch = env.clone();
            return Ok(!self.eval_positive(rule, &mut scratch, &body.expr, tracer)?);
        }
        self.eval_positive(rule, env, &body.expr, tracer)
    }

    fn eval_positive(
        &mut self,
        rule: &CompiledRule,
        env: &mut Env,
        expr: &Spanned<Expr>,
        tracer: &mut dyn Tracer,
    ) -> Result<bool, EvalError> {
        match &expr.node {
            Expr::Binary(lhs, BinaryOp::Assign, rhs) => {
                let var = lhs
                    .node
                    .as_var()
                    .ok_or_else(|| EvalError::Type(format!("cannot assign to {}", lhs.node)))?;
                self.bind(rule, env, var, rhs, tracer)
            }
            Expr::Binary(lhs, BinaryOp::Unify, rhs) => {
                if let Some(var) = self.unbound_var(rule, env, lhs) {
                    return self.bind(rule, env, var, rhs, tracer);
                }
                if let Some(var) = self.unbound_var(rule, env, rhs) {
                    return self.bind(rule, env, var, lhs, tracer);
                }
                let Some(a) = self.eval_expr(rule, env, lhs, tracer)? else {
                    return Ok(false);
                };
                let Some(b) = self.eval_expr(rule, env, rhs, tracer)? else {
                    return Ok(false);
                };
                Ok(a == b)
            }
            _ => Ok(self.eval_expr(rule, env, expr, tracer)?.is_some_and(|v| v.is_truthy())),
        }
    }

    fn bind(
        &mut self,
        rule: &CompiledRule,
        env: &mut Env,
        var: &str,
        value: &Spanned<Expr>,
        tracer: &mut dyn Tracer,
    ) -> Result<bool, EvalError> {
        match self.eval_expr(rule, env, value, tracer)? {
            Some(v) => {
                env.insert(var.to_string(), v);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn unbound_var<'e>(&self, rule: &CompiledRule, env: &Env, expr: &'e Spanned<Expr>) -> Option<&'e str> {
        expr.node.as_var().filter(|v| {
            !env.contains_key(*v)
                && *v != INPUT_ROOT
                && *v != DATA_ROOT
                && !self.compiled.package(&rule.package).is_some_and(|p| p.has_rule(v))
        })
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn eval_expr(&mut self, rule: &CompiledRule, env: &Env, expr: &Spanned<Expr>, tracer: &mut dyn Tracer) -> EvalResult {
        match &expr.node {
            Expr::Literal(lit) => Ok(Some(literal_value(lit))),
            Expr::Ref(r) => self.eval_ref(rule, env, r, tracer),
            Expr::Call { name, args } => {
                let name = name.join(".");
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    match self.eval_expr(rule, env, arg, tracer)? {
                        Some(v) => values.push(v),
                        None => return Ok(None),
                    }
                }
                let result = self.call(&name, &values);
                self.checkpoint()?;
                result.map(Some)
            }
            Expr::Array(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    match self.eval_expr(rule, env, item, tracer)? {
                        Some(v) => values.push(v),
                        None => return Ok(None),
                    }
                }
                Ok(Some(Value::Array(values)))
            }
            Expr::Object(pairs) => {
                let mut map = BTreeMap::new();
                for (k, v) in pairs {
                    let Some(key) = self.eval_expr(rule, env, k, tracer)? else {
                        return Ok(None);
                    };
                    let Value::String(key) = key else {
                        return Err(EvalError::Type(format!(
                            "object keys must be strings, got {}",
                            key.type_name()
                        )));
                    };
                    let Some(value) = self.eval_expr(rule, env, v, tracer)? else {
                        return Ok(None);
                    };
                    map.insert(key, value);
                }
                Ok(Some(Value::Object(map)))
            }
            Expr::Binary(lhs, op, rhs) => {
                let Some(a) = self.eval_expr(rule, env, lhs, tracer)? else {
                    return Ok(None);
                };
                let Some(b) = self.eval_expr(rule, env, rhs, tracer)? else {
                    return Ok(None);
                };
                binary(*op, &a, &b).map(Some)
            }
            Expr::Neg(inner) => match self.eval_expr(rule, env, inner, tracer)? {
                Some(Value::Number(n)) => Ok(Some(Value::Number(-n))),
                Some(other) => Err(EvalError::Type(format!("cannot negate {}", other.type_name()))),
                None => Ok(None),
            },
            Expr::Paren(inner) => self.eval_expr(rule, env, inner, tracer),
        }
    }

    fn call(&self, name: &str, args: &[Value]) -> Result<Value, EvalError> {
        let builtin_error = |message: String| EvalError::Builtin {
            name: name.to_string(),
            message,
        };
        let builtin = self
            .builtins
            .get(name)
            .ok_or_else(|| builtin_error("undefined function".to_string()))?;
        if builtin.arity != args.len() {
            return Err(builtin_error(format!(
                "expected {} argument(s), found {}",
                builtin.arity,
                args.len()
            )));
        }
        builtin.call(args).map_err(builtin_error)
    }

    fn eval_ref(&mut self, rule: &CompiledRule, env: &Env, r: &Ref, tracer: &mut dyn Tracer) -> EvalResult {
        let head = r.head.as_str();
        if let Some(value) = env.get(head) {
            return self.walk(rule, env, value.clone(), &r.path, tracer);
        }
        match head {
            INPUT_ROOT => match self.input {
                Some(input) => self.walk(rule, env, input.clone(), &r.path, tracer),
                None => Ok(None),
            },
            DATA_ROOT => self.eval_data_ref(rule, env, &r.path, tracer),
            _ if self.compiled.package(&rule.package).is_some_and(|p| p.has_rule(head)) => {
                match self.eval_named(&rule.package, head, tracer)? {
                    Some(value) => self.walk(rule, env, value, &r.path, tracer),
                    None => Ok(None),
                }
            }
            _ => Err(EvalError::UnsafeVar(head.to_string())),
        }
    }

    /// Resolve `data.<path>`: the longest package/rule prefix wins, otherwise the store is read.
    fn eval_data_ref(
        &mut self,
        rule: &CompiledRule,
        env: &Env,
        path: &[Spanned<RefSegment>],
        tracer: &mut dyn Tracer,
    ) -> EvalResult {
        let fields: Vec<&str> = path
            .iter()
            .map_while(|seg| match &seg.node {
                RefSegment::Field(name) => Some(name.as_str()),
                RefSegment::Index(_) => None,
            })
            .collect();

        let compiled = self.compiled;
        for split in (2..=fields.len()).rev() {
            let package = fields[..split - 1].join(".");
            let name = fields[split - 1];
            if compiled.package(&package).is_some_and(|p| p.has_rule(name)) {
                return match self.eval_named(&package, name, tracer)? {
                    Some(value) => self.walk(rule, env, value, &path[split..], tracer),
                    None => Ok(None),
                };
            }
        }

        let store_path: Vec<String> = fields.iter().map(|s| s.to_string()).collect();
        match self.store.read(&store_path) {
            Some(value) => self.walk(rule, env, value, &path[fields.len()..], tracer),
            None => Ok(None),
        }
    }

    fn walk(
        &mut self,
        rule: &CompiledRule,
        env: &Env,
        value: Value,
        path: &[Spanned<RefSegment>],
        tracer: &mut dyn Tracer,
    ) -> EvalResult {
        let mut current = value;
        for seg in path {
            let key = match &seg.node {
                RefSegment::Field(name) => Value::String(name.clone()),
                RefSegment::Index(index) => match self.eval_expr(rule, env, index, tracer)? {
                    Some(key) => key,
                    None => return Ok(None),
                },
            };
            match current.get(&key) {
                Some(next) => current = next.clone(),
                None => return Ok(None),
            }
        }
        Ok(Some(current))
    }
}

/// A ground document reference paired with the literal it must equal.
fn index_key<'e>(reference: &'e Expr, ground: &Expr) -> Option<(&'e Ref, Value)> {
    let Expr::Ref(r) = reference else {
        return None;
    };
    if r.head != INPUT_ROOT && r.head != DATA_ROOT {
        return None;
    }
    if !r.path.iter().all(|seg| matches!(seg.node, RefSegment::Field(_))) {
        return None;
    }
    match ground {
        Expr::Literal(lit) => Some((r, literal_value(lit))),
        _ => None,
    }
}

fn literal_value(lit: &Literal) -> Value {
    match lit {
        Literal::Null => Value::Null,
        Literal::Bool(b) => Value::Bool(*b),
        Literal::Number(n) => Value::Number(*n),
        Literal::String(s) => Value::String(s.clone()),
    }
}

fn binary(op: BinaryOp, a: &Value, b: &Value) -> Result<Value, EvalError> {
    match op {
        BinaryOp::Eq => Ok(Value::Bool(a == b)),
        BinaryOp::NotEq => Ok(Value::Bool(a != b)),
        BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq => {
            let ord = a.partial_cmp_same_type(b).ok_or_else(|| {
                EvalError::Type(format!("cannot compare {} and {}", a.type_name(), b.type_name()))
            })?;
            Ok(Value::Bool(match op {
                BinaryOp::Lt => ord.is_lt(),
                BinaryOp::LtEq => ord.is_le(),
                BinaryOp::Gt => ord.is_gt(),
                _ => ord.is_ge(),
            }))
        }
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => {
            let (Value::Number(x), Value::Number(y)) = (a, b) else {
                return Err(EvalError::Type(format!(
                    "{}: operands must be numbers, got {} and {}",
                    op.as_str(),
                    a.type_name(),
                    b.type_name()
                )));
            };
            if matches!(op, BinaryOp::Div | BinaryOp::Mod) && *y == 0.0 {
                return Err(EvalError::Type("divide by zero".to_string()));
            }
            Ok(Value::Number(match op {
                BinaryOp::Add => x + y,
                BinaryOp::Sub => x - y,
                BinaryOp::Mul => x * y,
                BinaryOp::Div => x / y,
                _ => x % y,
            }))
        }
        BinaryOp::Assign | BinaryOp::Unify => Err(EvalError::Type(format!(
            "{} is only allowed at the top of a body expression",
            op.as_str()
        ))),
    }
}
