//! Cancellation and deadlines for evaluation.
//!
//! A [`Context`] is a cheap, cloneable handle. Children derived with [`Context::with_timeout`] share the parent's
//! cancellation flag, so cancelling the parent stops every child, while a child's deadline never outlives the
//! parent's.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use super::EvalError;

#[derive(Debug, Clone)]
pub struct Context {
    cancelled: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl Context {
    /// A context that is never done unless cancelled.
    pub fn background() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            deadline: None,
        }
    }

    /// Signal cancellation to this context and everything derived from it.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Derive a child whose deadline is `timeout` from now, capped by this context's deadline.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        let candidate = Instant::now().checked_add(timeout);
        let deadline = match (self.deadline, candidate) {
            (Some(parent), Some(child)) => Some(parent.min(child)),
            (Some(parent), None) => Some(parent),
            (None, child) => child,
        };
        Self {
            cancelled: Arc::clone(&self.cancelled),
            deadline,
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    pub fn is_done(&self) -> bool {
        self.err().is_some()
    }

    /// Why the context is done, if it is.
    pub fn err(&self) -> Option<EvalError> {
        if self.is_cancelled() {
            Some(EvalError::Cancelled)
        } else if self.deadline.is_some_and(|d| Instant::now() >= d) {
            Some(EvalError::DeadlineExceeded)
        } else {
            None
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::background()
    }
}
