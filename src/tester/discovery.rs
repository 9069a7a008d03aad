//! Test discovery.
//!
//! A rule is a test when its name starts with `test_`. Tests are ordered by package path, then by source order
//! inside the package. A package may define the same test name more than once; the first definition keeps the bare
//! name and later ones get `#01`, `#02`, ... so every result has a unique key.

use std::collections::BTreeMap;

use tenet_core::{DATA_ROOT, is_test_name};

use crate::eval::{Compiled, CompiledRule};

/// A test ready to be scheduled.
#[derive(Debug, Clone)]
pub struct TestRule {
    /// Dotted package path, e.g. `foo.bar`.
    pub package: String,
    /// Name as written in the source.
    pub declared_name: String,
    /// Unique name within the package.
    pub name: String,
    /// The single definition this test evaluates.
    pub rule: CompiledRule,
}

impl TestRule {
    /// Package rendered under the data root, e.g. `data.foo.bar`.
    pub fn package_ref(&self) -> String {
        format!("{}.{}", DATA_ROOT, self.package)
    }
}

/// Find all tests in `compiled`, optionally keeping only those whose name contains `filter`.
///
/// The filter is applied after duplicate names are numbered, so a test keeps the same name whether or not a filter
/// is used.
pub fn discover(compiled: &Compiled, filter: Option<&str>) -> Vec<TestRule> {
    let mut tests = Vec::new();
    for package in compiled.packages() {
        let mut seen: BTreeMap<&str, usize> = BTreeMap::new();
        for rule in &package.rules {
            let declared = rule.name();
            if !is_test_name(declared) {
                continue;
            }
            let count = seen.entry(declared).or_insert(0);
            let name = if *count == 0 {
                declared.to_string()
            } else {
                format!("{}#{:02}", declared, count)
            };
            *count += 1;
            tests.push(TestRule {
                package: package.path.clone(),
                declared_name: declared.to_string(),
                name,
                rule: rule.clone(),
            });
        }
    }

    if let Some(filter) = filter {
        tests.retain(|t| t.name.contains(filter));
    }
    tests
}
