//! Evaluation adapter: run one test definition and classify the outcome.

use crate::eval::{BufferTracer, Compiled, Context, EvalError, Evaluator, NoopTracer, TraceEvent, Value};

use super::config::RunnerConfig;
use super::discovery::TestRule;
use super::result::Outcome;

/// Outcome of evaluating a single test, plus its trace when one was requested.
#[derive(Debug)]
pub struct Evaluation {
    pub outcome: Outcome,
    pub error: Option<EvalError>,
    pub trace: Vec<TraceEvent>,
}

/// Evaluate `test` under `ctx`.
///
/// `true` passes. Undefined or any other value fails. Engine errors, including cancellation, are errors.
/// Each call uses a fresh evaluator and trace buffer.
pub fn evaluate(test: &TestRule, compiled: &Compiled, config: &RunnerConfig, ctx: &Context, want_trace: bool) -> Evaluation {
    let mut evaluator =
        Evaluator::new(compiled, config.store.as_ref(), &config.builtins, ctx).with_input(config.input.as_ref());

    let (result, trace) = if want_trace {
        let mut tracer = BufferTracer::new();
        let result = evaluator.eval_rule(&test.rule, &mut tracer);
        (result, tracer.into_events())
    } else {
        (evaluator.eval_rule(&test.rule, &mut NoopTracer), Vec::new())
    };

    let (outcome, error) = match result {
        Ok(Some(Value::Bool(true))) => (Outcome::Pass, None),
        Ok(_) => (Outcome::Fail, None),
        Err(err) => (Outcome::Error, Some(err)),
    };
    Evaluation { outcome, error, trace }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::test_support::compile_one;
    use crate::eval::Builtins;
    use crate::tester::discovery::discover;

    fn run(src: &str, name: &str, want_trace: bool) -> Evaluation {
        let config = RunnerConfig::default();
        let compiled = compile_one(src, &Builtins::standard());
        let tests = discover(&compiled, None);
        let test = tests.iter().find(|t| t.name == name).unwrap();
        evaluate(test, &compiled, &config, &Context::background(), want_trace)
    }

    #[test]
    fn test_classification() {
        let src = "package p\ntest_pass { true }\ntest_fail { false }\ntest_number = 100\nx = 1\nx = 2\ntest_err { x }\n";
        assert_eq!(run(src, "test_pass", false).outcome, Outcome::Pass);
        assert_eq!(run(src, "test_fail", false).outcome, Outcome::Fail);
        assert_eq!(run(src, "test_number", false).outcome, Outcome::Fail);

        let err = run(src, "test_err", false);
        assert_eq!(err.outcome, Outcome::Error);
        assert_eq!(err.error, Some(EvalError::Conflict { rule: "data.p.x".into() }));
    }

    #[test]
    fn test_trace_only_when_requested() {
        let src = "package p\ntest_fail { false }\n";
        assert!(run(src, "test_fail", false).trace.is_empty());
        assert!(!run(src, "test_fail", true).trace.is_empty());
    }

    #[test]
    fn test_duplicate_definitions_evaluated_separately() {
        let src = "package p\ntest_dup { true }\ntest_dup { false }\n";
        assert_eq!(run(src, "test_dup", false).outcome, Outcome::Pass);
        assert_eq!(run(src, "test_dup#01", false).outcome, Outcome::Fail);
    }
}
