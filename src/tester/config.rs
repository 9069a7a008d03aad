//! Runner configuration.

use std::sync::Arc;
use std::time::Duration;

use crate::eval::{Builtins, InMemoryStore, Store, Value};

/// Settings for a test run. Fixed before [`crate::tester::Runner::run`] and read-only afterwards.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Deadline for each test, measured from the moment it starts
    pub timeout: Option<Duration>,
    /// Record where failing tests stopped
    pub enable_failure_line: bool,
    /// Base documents under `data`
    pub store: Arc<dyn Store>,
    /// Document bound to `input`
    pub input: Option<Value>,
    /// Functions callable from policies
    pub builtins: Arc<Builtins>,
    /// Only run tests whose name contains this string
    pub filter: Option<String>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            timeout: None,
            enable_failure_line: false,
            store: Arc::new(InMemoryStore::new()),
            input: None,
            builtins: Arc::new(Builtins::standard()),
            filter: None,
        }
    }
}

impl RunnerConfig {
    /// Create a new config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_failure_line(mut self, enabled: bool) -> Self {
        self.enable_failure_line = enabled;
        self
    }

    pub fn with_store(mut self, store: Arc<dyn Store>) -> Self {
        self.store = store;
        self
    }

    pub fn with_input(mut self, input: Value) -> Self {
        self.input = Some(input);
        self
    }

    pub fn with_builtins(mut self, builtins: Builtins) -> Self {
        self.builtins = Arc::new(builtins);
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RunnerConfig::default();
        assert_eq!(config.timeout, None);
        assert!(!config.enable_failure_line);
        assert!(config.builtins.get("count").is_some());
        assert_eq!(config.store.read(&[]), Some(Value::Object(Default::default())));
    }

    #[test]
    fn test_builders() {
        let config = RunnerConfig::new()
            .with_timeout(Duration::from_millis(15))
            .with_failure_line(true)
            .with_filter("allow");
        assert_eq!(config.timeout, Some(Duration::from_millis(15)));
        assert!(config.enable_failure_line);
        assert_eq!(config.filter.as_deref(), Some("allow"));
    }
}
