//! Reporters that render a result stream.
//!
//! Reporting is separated from execution through the [`TestReporter`] trait. Reporters write to any
//! [`io::Write`], so the CLI hands them stdout and tests hand them a buffer.

use std::io::{self, Write};

use super::result::{TestResult, TestSummary};

/// Trait for reporting test execution results.
pub trait TestReporter {
    /// Called once the run has started, before the first result
    fn on_run_start(&mut self) -> io::Result<()> {
        Ok(())
    }

    /// Called when a test completes
    fn on_test_complete(&mut self, result: &TestResult) -> io::Result<()>;

    /// Called when all tests have completed
    fn on_run_complete(&mut self, summary: &TestSummary) -> io::Result<()>;
}

const SEPARATOR_WIDTH: usize = 80;

/// Human-readable output.
///
/// Without `verbose` only failures and errors are listed; with it every test is shown with its duration.
pub struct PrettyReporter<W: Write> {
    out: W,
    verbose: bool,
    current_file: Option<String>,
}

impl<W: Write> PrettyReporter<W> {
    pub fn new(out: W, verbose: bool) -> Self {
        Self {
            out,
            verbose,
            current_file: None,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> TestReporter for PrettyReporter<W> {
    fn on_test_complete(&mut self, result: &TestResult) -> io::Result<()> {
        if result.is_pass() && !self.verbose {
            return Ok(());
        }

        if self.current_file.as_deref() != Some(result.location.file.as_str()) {
            if self.current_file.is_some() {
                writeln!(self.out)?;
            }
            writeln!(self.out, "{}:", result.location.file)?;
            self.current_file = Some(result.location.file.clone());
        }

        if self.verbose {
            writeln!(
                self.out,
                "{}: {} ({:.3}ms)",
                result.id(),
                result.outcome.as_str(),
                result.duration.as_secs_f64() * 1000.0
            )?;
        } else {
            writeln!(self.out, "{}: {}", result.id(), result.outcome.as_str())?;
        }

        if let Some(err) = &result.error {
            writeln!(self.out, "  {}", err)?;
        }
        if let Some(loc) = &result.failed_at {
            writeln!(self.out, "  {}: {}", loc, loc.text)?;
        }
        Ok(())
    }

    fn on_run_complete(&mut self, summary: &TestSummary) -> io::Result<()> {
        if summary.total == 0 {
            return writeln!(self.out, "no tests found");
        }
        if self.current_file.is_some() {
            writeln!(self.out, "{}", "-".repeat(SEPARATOR_WIDTH))?;
        }
        writeln!(self.out, "PASS: {}/{}", summary.passed, summary.total)?;
        if summary.failed > 0 {
            writeln!(self.out, "FAIL: {}/{}", summary.failed, summary.total)?;
        }
        if summary.errored > 0 {
            writeln!(self.out, "ERROR: {}/{}", summary.errored, summary.total)?;
        }
        Ok(())
    }
}

/// Machine-readable output: one JSON array of all results, written when the run completes.
pub struct JsonReporter<W: Write> {
    out: W,
    results: Vec<TestResult>,
}

impl<W: Write> JsonReporter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            results: Vec::new(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> TestReporter for JsonReporter<W> {
    fn on_test_complete(&mut self, result: &TestResult) -> io::Result<()> {
        self.results.push(result.clone());
        Ok(())
    }

    fn on_run_complete(&mut self, _summary: &TestSummary) -> io::Result<()> {
        serde_json::to_writer_pretty(&mut self.out, &self.results)?;
        writeln!(self.out)
    }
}
