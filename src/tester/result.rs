//! Test results.

use std::time::Duration;

use serde::{Serialize, Serializer};
use tenet_syntax::source::Location;

use crate::eval::EvalError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Pass,
    Fail,
    Error,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Pass => "PASS",
            Outcome::Fail => "FAIL",
            Outcome::Error => "ERROR",
        }
    }
}

/// The result of one test. Produced exactly once per discovered test.
#[derive(Debug, Clone, Serialize)]
pub struct TestResult {
    /// Package under the data root, e.g. `data.foo`.
    pub package: String,
    /// Test name after duplicate numbering.
    pub name: String,
    /// Where the test rule is defined.
    pub location: Location,
    pub outcome: Outcome,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "serialize_error")]
    pub error: Option<EvalError>,
    /// Expression the test stopped at; only set for failures when failure lines are enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_at: Option<Location>,
    #[serde(rename = "duration_ns", serialize_with = "serialize_duration")]
    pub duration: Duration,
}

impl TestResult {
    /// Fully qualified test name, e.g. `data.foo.test_allow`.
    pub fn id(&self) -> String {
        format!("{}.{}", self.package, self.name)
    }

    pub fn is_pass(&self) -> bool {
        self.outcome == Outcome::Pass
    }

    pub fn is_fail(&self) -> bool {
        self.outcome == Outcome::Fail
    }

    pub fn is_error(&self) -> bool {
        self.outcome == Outcome::Error
    }
}

fn serialize_error<S: Serializer>(error: &Option<EvalError>, s: S) -> Result<S::Ok, S::Error> {
    match error {
        Some(err) => s.serialize_str(&err.to_string()),
        None => s.serialize_none(),
    }
}

fn serialize_duration<S: Serializer>(duration: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX))
}

/// Summary of test run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub errored: usize,
    pub duration: Duration,
}

impl TestSummary {
    pub fn record(&mut self, result: &TestResult) {
        self.total += 1;
        match result.outcome {
            Outcome::Pass => self.passed += 1,
            Outcome::Fail => self.failed += 1,
            Outcome::Error => self.errored += 1,
        }
    }

    pub fn from_results<'r>(results: impl IntoIterator<Item = &'r TestResult>) -> Self {
        let mut summary = Self::default();
        for result in results {
            summary.record(result);
        }
        summary
    }

    pub fn is_success(&self) -> bool {
        self.failed == 0 && self.errored == 0
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn result(name: &str, outcome: Outcome) -> TestResult {
        TestResult {
            package: "data.foo".into(),
            name: name.into(),
            location: Location {
                file: "foo.tnt".into(),
                row: 3,
                col: 1,
                text: name.into(),
            },
            outcome,
            error: None,
            failed_at: None,
            duration: Duration::from_micros(1500),
        }
    }

    #[test]
    fn test_serialize_result() {
        let mut r = result("test_err", Outcome::Error);
        r.error = Some(EvalError::Conflict { rule: "data.foo.x".into() });
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["outcome"], "error");
        assert_eq!(json["error"], "conflicting values for rule data.foo.x");
        assert_eq!(json["duration_ns"], 1_500_000);
        assert!(json.get("failed_at").is_none());
    }

    #[test]
    fn test_summary() {
        let results = [
            result("test_a", Outcome::Pass),
            result("test_b", Outcome::Fail),
            result("test_c", Outcome::Error),
        ];
        let summary = TestSummary::from_results(&results);
        assert_eq!((summary.total, summary.passed, summary.failed, summary.errored), (3, 1, 1, 1));
        assert!(!summary.is_success());
    }
}
