//! End-to-end runner tests: parse sources, run them, and check the streamed results.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tenet::eval::{Builtins, Context, InMemoryStore, ParsedModule, Value};
use tenet::tester::{self, Outcome, Runner, TestError, TestResult};

fn parse(files: &[(&str, &str)]) -> BTreeMap<String, ParsedModule> {
    let files: BTreeMap<String, String> = files
        .iter()
        .map(|(name, text)| (name.to_string(), text.to_string()))
        .collect();
    tester::parse_sources(&files).expect("sources should parse")
}

async fn collect(runner: &Runner, ctx: &Context, modules: &BTreeMap<String, ParsedModule>) -> Vec<TestResult> {
    let mut rx = runner.run(ctx, modules).expect("run should start");
    let mut results = Vec::new();
    while let Some(result) = rx.recv().await {
        results.push(result);
    }
    results
}

fn outcomes(results: &[TestResult]) -> Vec<(String, Outcome)> {
    results.iter().map(|r| (r.id(), r.outcome)).collect()
}

fn sleepy_builtins() -> Builtins {
    let mut builtins = Builtins::standard();
    builtins.register("test.sleep", 1, |args| {
        let ms = args[0].as_f64().unwrap_or(0.0) as u64;
        std::thread::sleep(Duration::from_millis(ms));
        Ok(Value::Null)
    });
    builtins
}

const FAILURE_LINES: &str = r#"package test

test_straight_line {
    x := 1
    y := 2
    x == y
}

helper {
    false
}

test_calls_helper {
    true
    helper
    true
}

test_second_expr {
    input.user == "alice"
    1 > 2
}

test_passes {
    true
}
"#;

#[tokio::test]
async fn failure_lines_point_at_failing_expression() {
    let modules = parse(&[("test.tnt", FAILURE_LINES)]);
    let mut runner = Runner::new();
    runner
        .enable_failure_line(true)
        .set_input(Value::from(serde_json::json!({"user": "alice"})));
    let results = collect(&runner, &Context::background(), &modules).await;

    let rows: Vec<_> = results
        .iter()
        .map(|r| (r.name.as_str(), r.failed_at.as_ref().map(|loc| loc.row)))
        .collect();
    assert_eq!(
        rows,
        vec![
            ("test_straight_line", Some(6)),
            ("test_calls_helper", Some(15)),
            ("test_second_expr", Some(21)),
            ("test_passes", None),
        ]
    );
    let failed_at = results[0].failed_at.as_ref().expect("failure location");
    assert_eq!(failed_at.file, "test.tnt");
    assert_eq!(failed_at.text, "x == y");
}

const INDEXED: &str = r#"package foo
test_a {
    true
    false
    true
}
test_b {
    false
    true
}
test_c {
    input.x = 1
}
"#;

#[tokio::test]
async fn unmatched_input_index_has_no_failure_line() {
    let modules = parse(&[("a_test.tnt", INDEXED)]);
    let mut runner = Runner::new();
    runner.enable_failure_line(true);
    let results = collect(&runner, &Context::background(), &modules).await;

    let rows: Vec<_> = results
        .iter()
        .map(|r| (r.name.as_str(), r.outcome, r.failed_at.as_ref().map(|loc| loc.row)))
        .collect();
    assert_eq!(
        rows,
        vec![
            ("test_a", Outcome::Fail, Some(4)),
            ("test_b", Outcome::Fail, Some(8)),
            ("test_c", Outcome::Fail, None),
        ]
    );
}

#[tokio::test]
async fn errors_never_carry_failure_line() {
    let src = "package p\ntest_e {\n    true\n    conflict\n}\ntest_slow {\n    test.sleep(200)\n}\nconflict = 1 { true }\nconflict = 2 { true }\n";
    let modules = parse(&[("p.tnt", src)]);
    let mut runner = Runner::new();
    runner
        .enable_failure_line(true)
        .set_builtins(sleepy_builtins())
        .set_timeout(Duration::from_millis(15));
    let results = collect(&runner, &Context::background(), &modules).await;

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].name, "test_e");
    assert_eq!(results[0].outcome, Outcome::Error);
    assert!(results[0].error.as_ref().is_some_and(|e| !e.is_cancel()));
    assert!(results[0].failed_at.is_none());

    assert_eq!(results[1].name, "test_slow");
    assert_eq!(results[1].outcome, Outcome::Error);
    assert!(results[1].error.as_ref().is_some_and(|e| e.is_cancel()));
    assert!(results[1].failed_at.is_none());
}

#[tokio::test]
async fn failure_lines_disabled_by_default() {
    let modules = parse(&[("test.tnt", FAILURE_LINES)]);
    let results = collect(&Runner::new(), &Context::background(), &modules).await;
    assert!(results.iter().all(|r| r.failed_at.is_none()));
    assert_eq!(results[0].outcome, Outcome::Fail);
}

#[tokio::test]
async fn run_reports_every_outcome() {
    let foo = r#"package foo

test_pass { true }
test_fail { false }
test_fail_undefined { input.missing == 1 }
test_err_conflict { conflict }
test_duplicate { false }
test_duplicate { true }
test_duplicate { 1 == 1 }
test_data { data.bar.x == 1 }

conflict = 1 { true }
conflict = 2 { true }
"#;
    let bar = "package bar\nx = 1\n";
    let modules = parse(&[("foo.tnt", foo), ("bar.tnt", bar)]);
    let results = collect(&Runner::new(), &Context::background(), &modules).await;

    let expected = vec![
        ("data.foo.test_pass".to_string(), Outcome::Pass),
        ("data.foo.test_fail".to_string(), Outcome::Fail),
        ("data.foo.test_fail_undefined".to_string(), Outcome::Fail),
        ("data.foo.test_err_conflict".to_string(), Outcome::Error),
        ("data.foo.test_duplicate".to_string(), Outcome::Fail),
        ("data.foo.test_duplicate#01".to_string(), Outcome::Pass),
        ("data.foo.test_duplicate#02".to_string(), Outcome::Pass),
        ("data.foo.test_data".to_string(), Outcome::Pass),
    ];
    assert_eq!(outcomes(&results), expected);

    let conflict = results[3].error.as_ref().expect("conflict error");
    assert!(!conflict.is_cancel());
    assert!(conflict.to_string().contains("data.foo.conflict"));
}

#[tokio::test]
async fn store_documents_are_visible_to_tests() {
    let src = "package authz\ntest_admin { data.roles.admin[0] == \"alice\" }\n";
    let modules = parse(&[("authz.tnt", src)]);
    let store = InMemoryStore::from_json(serde_json::json!({"roles": {"admin": ["alice"]}}));
    let mut runner = Runner::new();
    runner.set_store(Arc::new(store));
    let results = collect(&runner, &Context::background(), &modules).await;
    assert_eq!(outcomes(&results), vec![("data.authz.test_admin".to_string(), Outcome::Pass)]);
}

#[tokio::test]
async fn cancelled_context_reports_every_test_as_cancelled() {
    let src = "package p\ntest_a { true }\ntest_b { false }\ntest_c { 1 / 0 }\n";
    let modules = parse(&[("p.tnt", src)]);
    let ctx = Context::background();
    ctx.cancel();
    let results = collect(&Runner::new(), &ctx, &modules).await;

    assert_eq!(results.len(), 3);
    for result in &results {
        assert_eq!(result.outcome, Outcome::Error);
        assert!(result.error.as_ref().is_some_and(|e| e.is_cancel()), "{:?}", result);
        assert_eq!(result.duration, Duration::ZERO);
    }
}

#[tokio::test]
async fn timeout_is_per_test() {
    let src = "package p\ntest_slow { test.sleep(200) }\ntest_fast { true }\ntest_after { false }\n";
    let modules = parse(&[("p.tnt", src)]);
    let mut runner = Runner::new();
    runner.set_builtins(sleepy_builtins()).set_timeout(Duration::from_millis(15));
    let results = collect(&runner, &Context::background(), &modules).await;

    assert_eq!(results[0].outcome, Outcome::Error);
    assert!(results[0].error.as_ref().is_some_and(|e| e.is_cancel()));
    assert_eq!(results[1].outcome, Outcome::Pass);
    assert_eq!(results[2].outcome, Outcome::Fail);
}

#[tokio::test]
async fn cancel_during_run_stops_remaining_tests() {
    let src = "package p\ntest_a { true }\ntest_slow { test.sleep(200); true }\ntest_b { true }\ntest_c { true }\n";
    let modules = parse(&[("p.tnt", src)]);
    let mut runner = Runner::new();
    runner.set_builtins(sleepy_builtins());
    let ctx = Context::background();
    let mut rx = runner.run(&ctx, &modules).expect("run should start");

    let first = rx.recv().await.expect("first result");
    assert_eq!(first.outcome, Outcome::Pass);
    ctx.cancel();

    let mut rest = Vec::new();
    while let Some(result) = rx.recv().await {
        rest.push(result);
    }
    assert_eq!(rest.len(), 3);
    assert!(rest[0].error.as_ref().is_some_and(|e| e.is_cancel()), "{:?}", rest[0]);
    let tail = &rest[1..];
    assert!(tail.iter().all(|r| r.error.as_ref().is_some_and(|e| e.is_cancel())));
}

#[tokio::test]
async fn runs_are_repeatable() {
    let modules = parse(&[("test.tnt", FAILURE_LINES)]);
    let mut runner = Runner::new();
    runner.enable_failure_line(true);
    let first = collect(&runner, &Context::background(), &modules).await;
    let second = collect(&runner, &Context::background(), &modules).await;
    assert_eq!(outcomes(&first), outcomes(&second));
    let rows = |rs: &[TestResult]| rs.iter().map(|r| r.failed_at.clone()).collect::<Vec<_>>();
    assert_eq!(rows(&first), rows(&second));
}

#[tokio::test]
async fn filter_keeps_duplicate_numbering() {
    let src = "package p\ntest_x { true }\ntest_y { true }\ntest_x { false }\n";
    let modules = parse(&[("p.tnt", src)]);
    let mut runner = Runner::new();
    runner.set_filter("#01");
    let results = collect(&runner, &Context::background(), &modules).await;
    assert_eq!(outcomes(&results), vec![("data.p.test_x#01".to_string(), Outcome::Fail)]);
}

#[tokio::test]
async fn compile_errors_stop_the_run() {
    let modules = parse(&[("p.tnt", "package p\ntest_x { y }\n")]);
    let err = Runner::new().run(&Context::background(), &modules).unwrap_err();
    assert!(matches!(err, TestError::Compile(ref errs) if errs[0].location.row == 2));
}

#[tokio::test]
async fn no_tests_closes_channel_immediately() {
    let modules = parse(&[("p.tnt", "package p\nallow { true }\n")]);
    let results = collect(&Runner::new(), &Context::background(), &modules).await;
    assert!(results.is_empty());
}
