//! Failure location from an evaluation trace.

use tenet_syntax::source::Location;

use crate::eval::{TraceEvent, TraceOp};

/// Location of the body expression that stopped the test, if any.
///
/// Only events at depth 0 (the test's own body) count; failures inside helper rules surface as the call site.
pub fn failure_location(trace: &[TraceEvent]) -> Option<Location> {
    trace
        .iter()
        .rev()
        .find(|e| e.op == TraceOp::Fail && e.depth == 0)
        .and_then(|e| e.location.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(op: TraceOp, depth: usize, row: usize) -> TraceEvent {
        TraceEvent {
            op,
            depth,
            node: String::new(),
            location: Some(Location {
                file: "p.tnt".into(),
                row,
                col: 1,
                text: String::new(),
            }),
        }
    }

    #[test]
    fn test_last_top_level_fail_wins() {
        let trace = vec![
            event(TraceOp::Enter, 0, 1),
            event(TraceOp::Fail, 0, 3),
            event(TraceOp::Fail, 1, 9),
            event(TraceOp::Fail, 0, 4),
            event(TraceOp::Exit, 0, 1),
        ];
        assert_eq!(failure_location(&trace).map(|l| l.row), Some(4));
    }

    #[test]
    fn test_nested_failures_ignored() {
        let trace = vec![event(TraceOp::Enter, 0, 1), event(TraceOp::Fail, 1, 9), event(TraceOp::Exit, 0, 1)];
        assert_eq!(failure_location(&trace), None);
    }

    #[test]
    fn test_empty_trace() {
        assert_eq!(failure_location(&[]), None);
    }
}
