//! Scheduler: compile, discover, then run tests one at a time on a blocking worker.
//!
//! Results are streamed over a bounded channel in discovery order. Before each test the worker checks the run's
//! context; once it is done, every remaining test is reported as a cancellation error without being evaluated.
//! A per-test timeout derives a fresh child context when the test starts.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::runtime::Handle;
use tokio::sync::mpsc;

use crate::eval::{Builtins, Compiled, Context, EvalError, ParsedModule, Store, Value, compile};

use super::TestError;
use super::adapter::evaluate;
use super::config::RunnerConfig;
use super::discovery::{TestRule, discover};
use super::locator::failure_location;
use super::result::{Outcome, TestResult};

/// Results buffered between the worker and the consumer.
const RESULT_BUFFER: usize = 16;

/// Runs the tests found in a set of parsed modules.
#[derive(Debug, Clone, Default)]
pub struct Runner {
    config: RunnerConfig,
}

impl Runner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: RunnerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    pub fn set_timeout(&mut self, timeout: Duration) -> &mut Self {
        self.config.timeout = Some(timeout);
        self
    }

    pub fn enable_failure_line(&mut self, enabled: bool) -> &mut Self {
        self.config.enable_failure_line = enabled;
        self
    }

    pub fn set_store(&mut self, store: Arc<dyn Store>) -> &mut Self {
        self.config.store = store;
        self
    }

    pub fn set_input(&mut self, input: Value) -> &mut Self {
        self.config.input = Some(input);
        self
    }

    pub fn set_builtins(&mut self, builtins: Builtins) -> &mut Self {
        self.config.builtins = Arc::new(builtins);
        self
    }

    pub fn set_filter(&mut self, filter: impl Into<String>) -> &mut Self {
        self.config.filter = Some(filter.into());
        self
    }

    /// Compile `modules` and start running their tests.
    ///
    /// Must be called from within a Tokio runtime. The returned receiver yields one [`TestResult`] per discovered
    /// test and closes after the last one.
    ///
    /// ## Errors
    /// - [`TestError::Compile`] if the modules do not compile; no test runs.
    /// - [`TestError::Setup`] if there is no runtime to run on.
    #[tracing::instrument(skip_all, fields(files = modules.len()))]
    pub fn run(
        &self,
        ctx: &Context,
        modules: &BTreeMap<String, ParsedModule>,
    ) -> Result<mpsc::Receiver<TestResult>, TestError> {
        let handle = Handle::try_current().map_err(|e| TestError::Setup(e.to_string()))?;
        let compiled = compile(modules, &self.config.builtins).map_err(TestError::Compile)?;
        let tests = discover(&compiled, self.config.filter.as_deref());
        tracing::debug!(tests = tests.len(), "discovered tests");

        let (tx, rx) = mpsc::channel(RESULT_BUFFER);
        let config = self.config.clone();
        let ctx = ctx.clone();
        handle.spawn_blocking(move || run_schedule(&ctx, &compiled, &config, tests, &tx));
        Ok(rx)
    }
}

fn run_schedule(
    ctx: &Context,
    compiled: &Compiled,
    config: &RunnerConfig,
    tests: Vec<TestRule>,
    tx: &mpsc::Sender<TestResult>,
) {
    let mut skipped = 0usize;
    for test in tests {
        let result = match ctx.err() {
            Some(err) => {
                skipped += 1;
                cancelled_result(&test, err)
            }
            None => run_one(&test, compiled, config, ctx),
        };
        tracing::debug!(test = %result.id(), outcome = result.outcome.as_str(), "test finished");
        if tx.blocking_send(result).is_err() {
            tracing::debug!("result receiver dropped, stopping");
            return;
        }
    }
    if skipped > 0 {
        tracing::warn!(skipped, "run cancelled before all tests started");
    }
}

fn run_one(test: &TestRule, compiled: &Compiled, config: &RunnerConfig, ctx: &Context) -> TestResult {
    let start = Instant::now();
    let test_ctx = match config.timeout {
        Some(timeout) => ctx.with_timeout(timeout),
        None => ctx.clone(),
    };

    let evaluation = evaluate(test, compiled, config, &test_ctx, config.enable_failure_line);
    let failed_at = if evaluation.outcome == Outcome::Fail && config.enable_failure_line {
        failure_location(&evaluation.trace)
    } else {
        None
    };

    TestResult {
        package: test.package_ref(),
        name: test.name.clone(),
        location: test.rule.location(),
        outcome: evaluation.outcome,
        error: evaluation.error,
        failed_at,
        duration: start.elapsed(),
    }
}

fn cancelled_result(test: &TestRule, err: EvalError) -> TestResult {
    TestResult {
        package: test.package_ref(),
        name: test.name.clone(),
        location: test.rule.location(),
        outcome: Outcome::Error,
        error: Some(err),
        failed_at: None,
        duration: Duration::ZERO,
    }
}
