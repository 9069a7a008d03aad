//! Policy evaluation engine.
//!
//! ## Modules
//!
//! - `compile` - Group parsed files into packages and reject ill-formed rules
//! - `evaluator` - Top-down evaluation with cancellation checkpoints and tracing
//! - `builtins` - Built-in function registry
//! - `store` - Read-only base documents
//! - `context` - Cancellation flag and deadline
//! - `trace` - Trace events and sinks
//! - `value` - Runtime values

pub mod builtins;
pub mod compile;
pub mod context;
mod error;
pub mod evaluator;
pub mod store;
pub mod trace;
pub mod value;

pub use builtins::Builtins;
pub use compile::{Compiled, CompiledRule, LocatedError, ParsedModule, compile};
pub use context::Context;
pub use error::EvalError;
pub use evaluator::Evaluator;
pub use store::{InMemoryStore, Store};
pub use trace::{BufferTracer, NoopTracer, TraceEvent, TraceOp, Tracer};
pub use value::Value;

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use tenet_syntax::parser;
    use tenet_syntax::source::SourceFile;

    use super::{Builtins, Compiled, ParsedModule, compile};

    pub fn modules(files: &[(&str, &str)]) -> BTreeMap<String, ParsedModule> {
        files
            .iter()
            .map(|(name, text)| {
                let module = parser::parse_source(text).unwrap();
                let parsed = ParsedModule {
                    source: Arc::new(SourceFile::new(*name, *text)),
                    module,
                };
                (name.to_string(), parsed)
            })
            .collect()
    }

    pub fn compile_one(text: &str, builtins: &Builtins) -> Compiled {
        compile(&modules(&[("p.tnt", text)]), builtins).unwrap()
    }
}
