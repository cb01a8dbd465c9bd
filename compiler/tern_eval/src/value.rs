//! Runtime values.

use std::fmt;

use tern_ir::{Name, StmtId};
use tern_types::{FuncRef, TypeId};

use crate::environment::{LocalScope, Scope};

/// A value produced by evaluation.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// Result of statements and of calls with no results.
    Void,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// Results of a call returning several values.
    Tuple(Vec<Value>),
    Func(FunctionValue),
    Struct(StructValue),
    /// A method selected on a receiver, `x.M`.
    BoundMethod(BoundMethod),
}

impl Value {
    #[inline]
    pub fn int(n: i64) -> Self {
        Value::Int(n)
    }

    pub fn string(s: impl Into<String>) -> Self {
        Value::Str(s.into())
    }

    /// Collapse a call's result list: none is `Void`, one is itself.
    pub fn from_results(mut results: Vec<Value>) -> Self {
        match results.len() {
            0 => Value::Void,
            1 => results.pop().unwrap_or(Value::Void),
            _ => Value::Tuple(results),
        }
    }

    /// Spread a value back into a result list.
    pub fn into_results(self) -> Vec<Value> {
        match self {
            Value::Void => Vec::new(),
            Value::Tuple(values) => values,
            other => vec![other],
        }
    }

    /// Short type name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Void => "void",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float64",
            Value::Str(_) => "string",
            Value::Tuple(_) => "tuple",
            Value::Func(_) => "func",
            Value::Struct(_) => "struct",
            Value::BoundMethod(_) => "method",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Void => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => f.write_str(s),
            Value::Tuple(values) => {
                f.write_str("(")?;
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{v}")?;
                }
                f.write_str(")")
            }
            Value::Func(_) => f.write_str("<func>"),
            Value::Struct(s) => {
                f.write_str("{")?;
                for (i, v) in s.fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{v}")?;
                }
                f.write_str("}")
            }
            Value::BoundMethod(_) => f.write_str("<method>"),
        }
    }
}

/// A closure: parameters, body and the frame it was created in.
#[derive(Clone, Debug)]
pub struct FunctionValue {
    pub params: Vec<Name>,
    pub body: StmtId,
    /// Captured by reference, so the closure sees later assignments.
    pub env: LocalScope<Scope>,
}

impl PartialEq for FunctionValue {
    fn eq(&self, other: &Self) -> bool {
        self.body == other.body && self.env.ptr_eq(&other.env)
    }
}

/// A value of a named struct type. Fields are positional.
#[derive(Clone, Debug, PartialEq)]
pub struct StructValue {
    pub ty: TypeId,
    pub fields: Vec<Value>,
}

/// A receiver paired with the callable of one of its methods.
#[derive(Clone, Debug, PartialEq)]
pub struct BoundMethod {
    pub recv: Box<Value>,
    pub func: FuncRef,
    pub name: Name,
}
