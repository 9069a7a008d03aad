//! Policy test runner.
//!
//! ## Modules
//!
//! - `discovery` - Find `test_` rules and give duplicates unique names
//! - `adapter` - Evaluate one test and classify it as pass, fail or error
//! - `locator` - Find where a failing test stopped from its trace
//! - `runner` - Schedule tests with cancellation and per-test timeouts
//! - `reporter` - Pretty and JSON output
//!
//! ## Examples
//!
//! ```rust,no_run
//! use std::collections::BTreeMap;
//! use tenet::eval::Context;
//!
//! # async fn demo() -> Result<(), tenet::tester::TestError> {
//! let mut files = BTreeMap::new();
//! files.insert("authz.tnt".to_string(), "package authz\ntest_ok { true }\n".to_string());
//! let results = tenet::tester::run_sources(&Context::background(), &files).await?;
//! assert!(results[0].is_pass());
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod config;
pub mod discovery;
pub mod locator;
pub mod reporter;
pub mod result;
pub mod runner;

use std::collections::BTreeMap;
use std::sync::Arc;

use thiserror::Error;

use tenet_syntax::parser;
use tenet_syntax::source::SourceFile;

use crate::eval::{Context, LocatedError, ParsedModule};

pub use config::RunnerConfig;
pub use discovery::{TestRule, discover};
pub use reporter::{JsonReporter, PrettyReporter, TestReporter};
pub use result::{Outcome, TestResult, TestSummary};
pub use runner::Runner;

/// Errors that stop a run before any test executes
#[derive(Debug, Error)]
pub enum TestError {
    #[error("{}", join_errors(.0))]
    Parse(Vec<LocatedError>),

    #[error("{}", join_errors(.0))]
    Compile(Vec<LocatedError>),

    #[error("setup failed: {0}")]
    Setup(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn join_errors(errors: &[LocatedError]) -> String {
    errors.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("\n")
}

/// Parse a map of file path to source text.
///
/// ## Errors
/// Returns [`TestError::Parse`] with every syntax error from every file.
pub fn parse_sources(files: &BTreeMap<String, String>) -> Result<BTreeMap<String, ParsedModule>, TestError> {
    let mut modules = BTreeMap::new();
    let mut errors = Vec::new();
    for (path, text) in files {
        let source = Arc::new(SourceFile::new(path.as_str(), text.as_str()));
        match parser::parse_source(text) {
            Ok(module) => {
                modules.insert(path.clone(), ParsedModule { source, module });
            }
            Err(errs) => errors.extend(errs.into_iter().map(|error| LocatedError {
                location: source.location(error.span),
                error,
            })),
        }
    }
    if errors.is_empty() {
        Ok(modules)
    } else {
        Err(TestError::Parse(errors))
    }
}

/// Parse and run `files` with default settings, collecting every result.
pub async fn run_sources(ctx: &Context, files: &BTreeMap<String, String>) -> Result<Vec<TestResult>, TestError> {
    let modules = parse_sources(files)?;
    let mut rx = Runner::new().run(ctx, &modules)?;
    let mut results = Vec::new();
    while let Some(result) = rx.recv().await {
        results.push(result);
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sources_reports_all_files() {
        let mut files = BTreeMap::new();
        files.insert("a.tnt".to_string(), "package a\nr { 1 + }\n".to_string());
        files.insert("b.tnt".to_string(), "r { true }\n".to_string());
        files.insert("c.tnt".to_string(), "package c\nr { true }\n".to_string());
        match parse_sources(&files).unwrap_err() {
            TestError::Parse(errs) => {
                let files: Vec<_> = errs.iter().map(|e| e.location.file.as_str()).collect();
                assert_eq!(files, vec!["a.tnt", "b.tnt"]);
                assert!(errs[0].to_string().starts_with("a.tnt:2:"));
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_run_sources_collects_in_order() {
        let mut files = BTreeMap::new();
        files.insert(
            "p.tnt".to_string(),
            "package p\ntest_b { true }\ntest_a { false }\n".to_string(),
        );
        let results = run_sources(&Context::background(), &files).await.unwrap();
        let names: Vec<_> = results.iter().map(|r| (r.name.as_str(), r.outcome)).collect();
        assert_eq!(names, vec![("test_b", Outcome::Pass), ("test_a", Outcome::Fail)]);
    }
}
