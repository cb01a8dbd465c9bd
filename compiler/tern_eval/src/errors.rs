//! Evaluation errors and control-transfer signals.
//!
//! Two things travel up the evaluator's `Err` channel:
//!
//! - [`EvalError`]: something went wrong. Ordinary errors (undefined
//!   identifier, non-boolean condition) are recoverable by the caller;
//!   [`EvalErrorKind::TypeSystem`] errors report an inconsistency in the
//!   type universe and are fatal.
//! - Non-local exits (`break`, `continue`, `return`): not errors, but
//!   transfers consumed by the matching loop, switch or call boundary.
//!
//! [`ControlAction`] carries either. Factory functions (e.g.
//! `undefined_identifier()`) populate both `kind` and `message`.

use std::fmt;

use tern_ir::{BinaryOp, Name, Span};
use tern_types::TypeError;

use crate::Value;

/// Result of statement and expression evaluation.
pub type EvalResult = Result<Value, ControlAction>;

/// Typed error category.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EvalErrorKind {
    // Names
    UndefinedIdentifier {
        name: String,
    },
    ReservedIdentifier {
        name: String,
    },
    ImmutableBinding {
        name: String,
    },
    UndefinedType {
        name: String,
    },

    // Types and operators
    InvalidConditionType {
        got: String,
    },
    TypeMismatch {
        expected: String,
        got: String,
    },
    InvalidBinaryOp {
        type_name: String,
        op: BinaryOp,
    },
    BinaryTypeMismatch {
        left: String,
        right: String,
    },
    DivisionByZero,

    // Assignment and calls
    AssignmentMismatch {
        names: usize,
        values: usize,
    },
    ArityMismatch {
        name: String,
        expected: usize,
        got: usize,
    },
    NotCallable {
        type_name: String,
    },
    UndefinedField {
        field: String,
        type_name: String,
    },
    UndefinedMethod {
        method: String,
        type_name: String,
    },
    StackOverflow {
        depth: usize,
    },

    // Control transfer that reached the top without a consumer
    BreakOutsideLoop,
    ContinueOutsideLoop,
    ReturnOutsideFunction,

    Unimplemented {
        construct: String,
    },

    /// Consistency failure reported by the type universe.
    TypeSystem(TypeError),

    Custom {
        message: String,
    },
}

impl fmt::Display for EvalErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UndefinedIdentifier { name } => write!(f, "undefined identifier: {name}"),
            Self::ReservedIdentifier { name } => {
                write!(f, "cannot declare {name}: reserved identifier")
            }
            Self::ImmutableBinding { name } => write!(f, "cannot assign to constant {name}"),
            Self::UndefinedType { name } => write!(f, "undefined type: {name}"),

            Self::InvalidConditionType { got } => {
                write!(f, "invalid condition type: expected bool, got {got}")
            }
            Self::TypeMismatch { expected, got } => {
                write!(f, "type mismatch: expected {expected}, got {got}")
            }
            Self::InvalidBinaryOp { type_name, op } => {
                write!(
                    f,
                    "operator `{}` cannot be applied to {type_name}",
                    op.as_symbol()
                )
            }
            Self::BinaryTypeMismatch { left, right } => {
                write!(f, "mismatched types {left} and {right}")
            }
            Self::DivisionByZero => write!(f, "division by zero"),

            Self::AssignmentMismatch { names, values } => {
                write!(
                    f,
                    "assignment mismatch: {names} variables but {values} values"
                )
            }
            Self::ArityMismatch {
                name,
                expected,
                got,
            } => {
                let arg_word = if *expected == 1 {
                    "argument"
                } else {
                    "arguments"
                };
                write!(f, "{name} expects {expected} {arg_word}, got {got}")
            }
            Self::NotCallable { type_name } => write!(f, "{type_name} is not callable"),
            Self::UndefinedField { field, type_name } => {
                write!(f, "{type_name} has no field or method {field}")
            }
            Self::UndefinedMethod { method, type_name } => {
                write!(f, "method {method} of {type_name} has no implementation")
            }
            Self::StackOverflow { depth } => {
                write!(f, "maximum call depth exceeded (limit: {depth})")
            }

            Self::BreakOutsideLoop => write!(f, "break outside for or switch"),
            Self::ContinueOutsideLoop => write!(f, "continue outside for"),
            Self::ReturnOutsideFunction => write!(f, "return outside function"),

            Self::Unimplemented { construct } => write!(f, "unimplemented: {construct}"),

            Self::TypeSystem(err) => write!(f, "{err}"),

            Self::Custom { message } => write!(f, "{message}"),
        }
    }
}

/// Additional context attached to an error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvalNote {
    pub message: String,
    pub span: Option<Span>,
}

impl EvalNote {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            span: None,
        }
    }

    pub fn with_span(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span: Some(span),
        }
    }
}

/// A single frame in an evaluation backtrace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BacktraceFrame {
    pub name: String,
    pub span: Option<Span>,
}

/// Snapshot of the call stack at an error site, innermost call last.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EvalBacktrace {
    frames: Vec<BacktraceFrame>,
}

impl EvalBacktrace {
    pub fn new(frames: Vec<BacktraceFrame>) -> Self {
        Self { frames }
    }

    pub fn frames(&self) -> &[BacktraceFrame] {
        &self.frames
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }
}

impl fmt::Display for EvalBacktrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.frames.is_empty() {
            return Ok(());
        }
        writeln!(f, "stack backtrace:")?;
        for (i, frame) in self.frames.iter().enumerate() {
            write!(f, "  {i}: {}", frame.name)?;
            if let Some(span) = frame.span {
                write!(f, " at {span}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Evaluation error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvalError {
    pub kind: EvalErrorKind,
    /// Human-readable message; equals `kind.to_string()` for factory-made errors.
    pub message: String,
    pub span: Option<Span>,
    /// Call stack at the error site, captured when the error leaves the
    /// innermost interpreted call.
    pub backtrace: Option<EvalBacktrace>,
    pub notes: Vec<EvalNote>,
}

impl EvalError {
    /// Create an error with just a message (`Custom` kind).
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            kind: EvalErrorKind::Custom {
                message: message.clone(),
            },
            message,
            span: None,
            backtrace: None,
            notes: Vec::new(),
        }
    }

    fn from_kind(kind: EvalErrorKind) -> Self {
        let message = kind.to_string();
        Self {
            kind,
            message,
            span: None,
            backtrace: None,
            notes: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    #[must_use]
    pub fn with_backtrace(mut self, backtrace: EvalBacktrace) -> Self {
        self.backtrace = Some(backtrace);
        self
    }

    #[must_use]
    pub fn with_note(mut self, note: EvalNote) -> Self {
        self.notes.push(note);
        self
    }

    /// Whether this error reports a type-universe inconsistency rather than
    /// a mistake in the interpreted program.
    pub fn is_fatal(&self) -> bool {
        matches!(self.kind, EvalErrorKind::TypeSystem(_))
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)?;
        if let Some(span) = self.span {
            write!(f, " at {span}")?;
        }
        Ok(())
    }
}

impl std::error::Error for EvalError {}

impl From<TypeError> for EvalError {
    #[cold]
    fn from(err: TypeError) -> Self {
        EvalError::from_kind(EvalErrorKind::TypeSystem(err))
    }
}

/// What travels up the `Err` channel of statement evaluation.
#[derive(Clone, Debug, PartialEq)]
pub enum ControlAction {
    Error(Box<EvalError>),
    /// `break`, with its label if any.
    Break(Option<Name>),
    /// `continue`, with its label if any.
    Continue(Option<Name>),
    /// `return`, with its evaluated results in order.
    Return(Vec<Value>),
}

impl ControlAction {
    #[inline]
    pub fn is_error(&self) -> bool {
        matches!(self, ControlAction::Error(_))
    }

    /// Convert into an error. Signals become "outside valid context" errors.
    pub fn into_eval_error(self) -> EvalError {
        match self {
            ControlAction::Error(e) => *e,
            ControlAction::Break(_) => break_outside_loop(),
            ControlAction::Continue(_) => continue_outside_loop(),
            ControlAction::Return(_) => return_outside_function(),
        }
    }

    /// Attach `span` to an error that has none. Signals pass unchanged.
    #[must_use]
    pub fn with_span_if_error(self, span: Span) -> Self {
        match self {
            ControlAction::Error(e) if e.span.is_none() => {
                ControlAction::Error(Box::new((*e).with_span(span)))
            }
            other => other,
        }
    }
}

impl From<EvalError> for ControlAction {
    #[inline]
    fn from(err: EvalError) -> Self {
        ControlAction::Error(Box::new(err))
    }
}

impl From<TypeError> for ControlAction {
    #[cold]
    fn from(err: TypeError) -> Self {
        ControlAction::Error(Box::new(err.into()))
    }
}

// Names

#[cold]
pub fn undefined_identifier(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UndefinedIdentifier {
        name: name.to_string(),
    })
}

#[cold]
pub fn reserved_identifier(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ReservedIdentifier {
        name: name.to_string(),
    })
}

#[cold]
pub fn cannot_assign_constant(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ImmutableBinding {
        name: name.to_string(),
    })
}

#[cold]
pub fn undefined_type(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UndefinedType {
        name: name.to_string(),
    })
}

// Types and operators

#[cold]
pub fn invalid_condition_type(got: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidConditionType {
        got: got.to_string(),
    })
}

#[cold]
pub fn type_mismatch(expected: &str, got: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::TypeMismatch {
        expected: expected.to_string(),
        got: got.to_string(),
    })
}

#[cold]
pub fn invalid_binary_op(type_name: &str, op: BinaryOp) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidBinaryOp {
        type_name: type_name.to_string(),
        op,
    })
}

#[cold]
pub fn binary_type_mismatch(left: &str, right: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::BinaryTypeMismatch {
        left: left.to_string(),
        right: right.to_string(),
    })
}

#[cold]
pub fn division_by_zero() -> EvalError {
    EvalError::from_kind(EvalErrorKind::DivisionByZero)
}

// Assignment and calls

#[cold]
pub fn assignment_mismatch(names: usize, values: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::AssignmentMismatch { names, values })
}

#[cold]
pub fn arity_mismatch(name: &str, expected: usize, got: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ArityMismatch {
        name: name.to_string(),
        expected,
        got,
    })
}

#[cold]
pub fn not_callable(type_name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotCallable {
        type_name: type_name.to_string(),
    })
}

#[cold]
pub fn undefined_field(field: &str, type_name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UndefinedField {
        field: field.to_string(),
        type_name: type_name.to_string(),
    })
}

#[cold]
pub fn undefined_method(method: &str, type_name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UndefinedMethod {
        method: method.to_string(),
        type_name: type_name.to_string(),
    })
}

#[cold]
pub fn stack_overflow(depth: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::StackOverflow { depth })
}

// Control transfer

#[cold]
pub fn break_outside_loop() -> EvalError {
    EvalError::from_kind(EvalErrorKind::BreakOutsideLoop)
}

#[cold]
pub fn continue_outside_loop() -> EvalError {
    EvalError::from_kind(EvalErrorKind::ContinueOutsideLoop)
}

#[cold]
pub fn return_outside_function() -> EvalError {
    EvalError::from_kind(EvalErrorKind::ReturnOutsideFunction)
}

#[cold]
pub fn unimplemented(construct: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::Unimplemented {
        construct: construct.to_string(),
    })
}
