//! Call frame tracking for the evaluator.
//!
//! `CallStack` replaces a bare depth counter: each interpreted call pushes a
//! frame, and an error leaving the innermost call captures the stack as an
//! [`EvalBacktrace`].

use tern_ir::{Name, Span, StringInterner};

use crate::errors::{stack_overflow, BacktraceFrame, EvalBacktrace, EvalError};

/// A single frame in the live call stack.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallFrame {
    /// Callee name, or the anonymous-function name for literals.
    pub name: Name,
    /// Where the call was made.
    pub call_span: Option<Span>,
}

/// Live call stack for the interpreter.
#[derive(Clone, Debug)]
pub struct CallStack {
    frames: Vec<CallFrame>,
    max_depth: Option<usize>,
}

impl CallStack {
    /// `max_depth` is `None` for unlimited: the host stack grows on demand.
    pub fn new(max_depth: Option<usize>) -> Self {
        Self {
            frames: Vec::new(),
            max_depth,
        }
    }

    /// Push a call frame, checking the depth limit.
    ///
    /// The frame is not pushed on overflow.
    pub fn push(&mut self, frame: CallFrame) -> Result<(), EvalError> {
        if let Some(max) = self.max_depth {
            if self.frames.len() >= max {
                return Err(stack_overflow(max));
            }
        }
        self.frames.push(frame);
        Ok(())
    }

    pub fn pop(&mut self) {
        debug_assert!(
            !self.frames.is_empty(),
            "CallStack::pop() called on empty stack"
        );
        self.frames.pop();
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    /// Snapshot of the stack, outermost call first.
    pub fn capture(&self, interner: &StringInterner) -> EvalBacktrace {
        EvalBacktrace::new(
            self.frames
                .iter()
                .map(|frame| BacktraceFrame {
                    name: interner.lookup(frame.name).to_string(),
                    span: frame.call_span,
                })
                .collect(),
        )
    }
}
