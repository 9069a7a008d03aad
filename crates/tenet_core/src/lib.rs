//! Provide the canonical language vocabulary for the Tenet policy language.
//!
//! This crate is intentionally small and dependency-free. It is shared by the syntax frontend (lexer/parser) and by
//! the evaluator so that both agree on keyword spellings, operator identities, and the standard builtin set.
//!
//! ## Notes
//!
//! - This is a “vocabulary” crate: **no IO**, no global state, no AST types.
//! - The reserved test prefix lives here because both tooling and the runner need the same spelling.

pub mod lang;

/// Prefix that marks a rule as an executable unit test.
pub const TEST_PREFIX: &str = "test_";

/// Root document for base data and rules (`data.<package>.<rule>`).
pub const DATA_ROOT: &str = "data";

/// Root document for the query input (`input.<path>`).
pub const INPUT_ROOT: &str = "input";

/// Return `true` if a rule name denotes a test.
///
/// ## Examples
/// ```rust
/// assert!(tenet_core::is_test_name("test_allow"));
/// assert!(!tenet_core::is_test_name("allow"));
/// ```
pub fn is_test_name(name: &str) -> bool {
    name.starts_with(TEST_PREFIX)
}
