//! CLI command implementations
//!
//! All command functions return `CliResult<ExitCode>` instead of calling
//! `process::exit`. Error handling and exits happen in the top-level `run()`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tenet_syntax::diagnostics::{self, CompileError};
use tenet_syntax::source::SourceFile;
use tenet_syntax::{lexer, parser};

use crate::eval::{Context, Value};
use crate::tester::{self, JsonReporter, PrettyReporter, Runner, TestReporter, TestSummary};

use super::loader;
use super::{CliError, CliResult, ExitCode, OutputFormat};

/// Options for `tenet test`.
#[derive(Debug, Clone)]
pub struct TestOptions {
    pub paths: Vec<PathBuf>,
    pub verbose: bool,
    pub format: OutputFormat,
    pub timeout: Duration,
    pub explain_fails: bool,
    pub filter: Option<String>,
    pub input: Option<PathBuf>,
}

// ============================================================================
// Debug commands
// ============================================================================

fn read_source(file_path: &Path) -> CliResult<SourceFile> {
    let text = fs::read_to_string(file_path)
        .map_err(|e| CliError::failure(format!("Error reading {}: {}", file_path.display(), e)))?;
    Ok(SourceFile::new(file_path.to_string_lossy(), text))
}

fn render_errors(source: &SourceFile, errs: &[CompileError]) -> CliError {
    let mut msg = String::new();
    for err in errs {
        msg.push_str(&diagnostics::format_error(source, err));
    }
    CliError::failure(msg.trim_end())
}

/// Tokenize and print tokens.
pub fn lex_file(file_path: &Path) -> CliResult<ExitCode> {
    let source = read_source(file_path)?;
    let tokens = lexer::lex(source.text()).map_err(|errs| render_errors(&source, &errs))?;
    for tok in &tokens {
        println!("{:?}", tok);
    }
    Ok(ExitCode::SUCCESS)
}

/// Parse and print the module in canonical form.
pub fn parse_file(file_path: &Path) -> CliResult<ExitCode> {
    let source = read_source(file_path)?;
    let module = parser::parse_source(source.text()).map_err(|errs| render_errors(&source, &errs))?;
    print!("{}", module);
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// tenet test
// ============================================================================

/// Load, compile and run tests, streaming results to the chosen reporter.
///
/// Exits with [`ExitCode::TESTS_FAILED`] if any test fails or errors.
pub fn run_tests(opts: TestOptions) -> CliResult<ExitCode> {
    let loaded = loader::load(&opts.paths).map_err(|e| CliError::failure(e.to_string()))?;
    let modules = tester::parse_sources(&loaded.policies).map_err(|e| CliError::failure(e.to_string()))?;

    let mut runner = Runner::new();
    runner
        .set_timeout(opts.timeout)
        .enable_failure_line(opts.explain_fails)
        .set_store(Arc::new(loaded.store));
    if let Some(filter) = &opts.filter {
        runner.set_filter(filter.clone());
    }
    if let Some(path) = &opts.input {
        runner.set_input(read_input(path)?);
    }

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::failure(format!("Error starting runtime: {}", e)))?;

    let summary = rt.block_on(async {
        let ctx = Context::background();
        let signal_ctx = ctx.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupted, cancelling remaining tests");
                signal_ctx.cancel();
            }
        });

        let mut reporter: Box<dyn TestReporter> = match opts.format {
            OutputFormat::Pretty => Box::new(PrettyReporter::new(io::stdout(), opts.verbose)),
            OutputFormat::Json => Box::new(JsonReporter::new(io::stdout())),
        };

        let started = Instant::now();
        let mut rx = runner.run(&ctx, &modules).map_err(|e| CliError::failure(e.to_string()))?;
        reporter.on_run_start().map_err(report_error)?;

        let mut summary = TestSummary::default();
        while let Some(result) = rx.recv().await {
            summary.record(&result);
            reporter.on_test_complete(&result).map_err(report_error)?;
        }
        summary.duration = started.elapsed();
        reporter.on_run_complete(&summary).map_err(report_error)?;
        Ok::<_, CliError>(summary)
    })?;

    tracing::debug!(total = summary.total, duration = ?summary.duration, "run complete");
    if summary.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::TESTS_FAILED)
    }
}

fn read_input(path: &Path) -> CliResult<Value> {
    let text = fs::read_to_string(path)
        .map_err(|e| CliError::failure(format!("Error reading {}: {}", path.display(), e)))?;
    let doc: serde_json::Value = serde_json::from_str(&text)
        .map_err(|e| CliError::failure(format!("Error parsing {}: {}", path.display(), e)))?;
    Ok(Value::from(doc))
}

fn report_error(e: io::Error) -> CliError {
    CliError::failure(format!("Error writing report: {}", e))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn options(dir: &Path) -> TestOptions {
        TestOptions {
            paths: vec![dir.to_path_buf()],
            verbose: false,
            format: OutputFormat::Json,
            timeout: Duration::from_secs(5),
            explain_fails: true,
            filter: None,
            input: None,
        }
    }

    #[test]
    fn test_exit_code_reflects_failures() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("p.tnt"), "package p\ntest_ok { true }\ntest_bad { false }\n").unwrap();
        assert_eq!(run_tests(options(dir.path())).unwrap(), ExitCode::TESTS_FAILED);

        let mut opts = options(dir.path());
        opts.filter = Some("ok".into());
        assert_eq!(run_tests(opts).unwrap(), ExitCode::SUCCESS);
    }

    #[test]
    fn test_input_file() {
        let dir = tempfile::tempdir().unwrap();
        let policies = dir.path().join("policies");
        fs::create_dir_all(&policies).unwrap();
        fs::write(policies.join("p.tnt"), "package p\ntest_user { input.user == \"alice\" }\n").unwrap();
        let input = dir.path().join("input.data");
        fs::write(&input, r#"{"user": "alice"}"#).unwrap();

        let mut opts = options(&policies);
        opts.input = Some(input);
        assert_eq!(run_tests(opts).unwrap(), ExitCode::SUCCESS);
    }

    #[test]
    fn test_parse_error_is_failure() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("p.tnt"), "package p\ntest_x { 1 + }\n").unwrap();
        let err = run_tests(options(dir.path())).unwrap_err();
        assert_eq!(err.exit_code, ExitCode::FAILURE);
        assert!(err.message.contains("Expected expression"));
    }

    #[test]
    fn test_lex_and_parse_files() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("p.tnt");
        fs::write(&file, "package p\nallow = true\n").unwrap();
        assert_eq!(lex_file(&file).unwrap(), ExitCode::SUCCESS);
        assert_eq!(parse_file(&file).unwrap(), ExitCode::SUCCESS);

        fs::write(&file, "package p\nallow {\n").unwrap();
        let err = parse_file(&file).unwrap_err();
        assert!(err.message.contains("p.tnt:"));
    }
}
