//! Tern Eval - tree-walking evaluator for Tern programs.
//!
//! # Architecture
//!
//! - [`Environment`]: chain of lexical frames; closures keep theirs alive
//! - [`Interpreter`]: statement and expression evaluation over a
//!   [`SyntaxArena`](tern_ir::SyntaxArena)
//! - [`ControlAction`]: `break`, `continue` and `return` travel as values
//!   through the `Err` channel until a loop, switch or call consumes them
//! - method calls resolve through a [`tern_types::TypeUniverse`] shared by
//!   the interpreter's [`UniverseHandle`](tern_types::UniverseHandle)

mod diagnostics;
mod environment;
pub mod errors;
pub mod exec;
pub mod interpreter;
mod value;

use std::sync::Once;

pub use diagnostics::{CallFrame, CallStack};
pub use environment::{BindError, Environment, LocalScope, Mutability, ReservedNames, Scope};
pub use errors::{
    BacktraceFrame, ControlAction, EvalBacktrace, EvalError, EvalErrorKind, EvalNote, EvalResult,
};
pub use interpreter::{Interpreter, InterpreterBuilder, ScopedInterpreter};
pub use value::{BoundMethod, FunctionValue, StructValue, Value};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing output.
///
/// Does nothing unless `RUST_LOG` is set, e.g. `RUST_LOG=tern_types=debug`
/// to see descriptor creation and method slot synthesis. Safe to call more
/// than once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(EnvFilter::from_default_env())
                .init();
        }
    });
}

#[cfg(test)]
mod tests;
