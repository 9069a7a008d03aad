//! Evaluation trace events.
//!
//! The evaluator reports each step to a [`Tracer`]. Tracing is opt-in: with [`NoopTracer`] no events are built.

use std::fmt;

use serde::Serialize;
use tenet_syntax::source::Location;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceOp {
    /// A rule definition is entered.
    Enter,
    /// A body expression is about to be evaluated.
    Eval,
    /// A body expression was false or undefined; the enclosing body stops here.
    Fail,
    /// A rule definition is left.
    Exit,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceEvent {
    pub op: TraceOp,
    /// 0 for the body under test, +1 per nested rule.
    pub depth: usize,
    pub node: String,
    pub location: Option<Location>,
}

impl fmt::Display for TraceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self.op {
            TraceOp::Enter => "Enter",
            TraceOp::Eval => "Eval",
            TraceOp::Fail => "Fail",
            TraceOp::Exit => "Exit",
        };
        write!(f, "{:indent$}{} {}", "", op, self.node, indent = self.depth * 2)
    }
}

/// Sink for trace events.
pub trait Tracer {
    /// Whether events should be built at all.
    fn enabled(&self) -> bool {
        true
    }

    fn trace(&mut self, event: TraceEvent);
}

/// Discards everything.
#[derive(Debug, Default)]
pub struct NoopTracer;

impl Tracer for NoopTracer {
    fn enabled(&self) -> bool {
        false
    }

    fn trace(&mut self, _event: TraceEvent) {}
}

/// Collects events in order.
#[derive(Debug, Default)]
pub struct BufferTracer {
    events: Vec<TraceEvent>,
}

impl BufferTracer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<TraceEvent> {
        self.events
    }
}

impl Tracer for BufferTracer {
    fn trace(&mut self, event: TraceEvent) {
        self.events.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_indents_by_depth() {
        let event = TraceEvent {
            op: TraceOp::Fail,
            depth: 2,
            node: "x == 1".into(),
            location: None,
        };
        assert_eq!(event.to_string(), "    Fail x == 1");
    }

    #[test]
    fn test_buffer_keeps_order() {
        let mut tracer = BufferTracer::new();
        for op in [TraceOp::Enter, TraceOp::Exit] {
            tracer.trace(TraceEvent {
                op,
                depth: 0,
                node: "r".into(),
                location: None,
            });
        }
        let ops: Vec<_> = tracer.into_events().into_iter().map(|e| e.op).collect();
        assert_eq!(ops, vec![TraceOp::Enter, TraceOp::Exit]);
    }
}
