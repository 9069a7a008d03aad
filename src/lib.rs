#![forbid(unsafe_code)]
//! Tenet policy test runner
//!
//! Tenet policies are packages of rules. Rules whose name starts with `test_` are unit tests: the runner discovers
//! them, evaluates each one against a shared data store with an optional per-test timeout, and streams a
//! [`tester::TestResult`] for every test as it completes.
//!
//! - [`eval`]: compilation of parsed modules, the evaluator, cancellation contexts and traces
//! - [`tester`]: discovery, the evaluation adapter, failure location and the runner
//! - [`cli`]: the `tenet` command line
//!
//! ## Panic Policy
//!
//! This codebase follows explicit error handling:
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` module enforces
//!   `#![deny(clippy::unwrap_used)]`.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.
//!
//! - **True invariants**: registry lookups by ID in `tenet_core` use `.expect(..)`, since every ID has exactly one
//!   registry entry.

pub mod cli;
pub mod eval;
pub mod tester;

pub use tenet_syntax::ast;
pub use tenet_syntax::diagnostics;
pub use tenet_syntax::lexer;
pub use tenet_syntax::parser;
pub use tenet_syntax::source;
