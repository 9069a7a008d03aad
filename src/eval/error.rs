use thiserror::Error;

/// Errors raised while evaluating a rule.
///
/// A test whose evaluation returns one of these is reported as an error, never as a failure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("evaluation cancelled")]
    Cancelled,

    #[error("evaluation deadline exceeded")]
    DeadlineExceeded,

    #[error("conflicting values for rule {rule}")]
    Conflict { rule: String },

    #[error("{name}: {message}")]
    Builtin { name: String, message: String },

    #[error("type error: {0}")]
    Type(String),

    #[error("rule {rule} is recursive")]
    Recursion { rule: String },

    #[error("var {0} is unsafe")]
    UnsafeVar(String),
}

impl EvalError {
    /// `true` when evaluation stopped because its context was cancelled or timed out.
    pub fn is_cancel(&self) -> bool {
        matches!(self, EvalError::Cancelled | EvalError::DeadlineExceeded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_predicate() {
        assert!(EvalError::Cancelled.is_cancel());
        assert!(EvalError::DeadlineExceeded.is_cancel());
        assert!(!EvalError::Conflict { rule: "data.p.x".into() }.is_cancel());
    }

    #[test]
    fn test_messages() {
        let err = EvalError::Builtin {
            name: "to_number".into(),
            message: "invalid number \"x\"".into(),
        };
        assert_eq!(err.to_string(), "to_number: invalid number \"x\"");
    }
}
