//! Identifier resolution.

use tern_ir::{Name, StringInterner};

use crate::environment::Environment;
use crate::errors::{undefined_identifier, EvalError};
use crate::Value;

/// Resolve `name` to its value.
///
/// `true` and `false` are constants. `iota` is the ordinal of the constant
/// spec being evaluated and is undefined outside constant declarations.
/// Everything else goes through the environment chain.
pub fn eval_ident(
    name: Name,
    env: &Environment,
    iota: Option<i64>,
    interner: &StringInterner,
) -> Result<Value, EvalError> {
    let reserved = env.reserved();
    if name == reserved.true_ {
        return Ok(Value::Bool(true));
    }
    if name == reserved.false_ {
        return Ok(Value::Bool(false));
    }
    if name == reserved.iota {
        return iota
            .map(Value::Int)
            .ok_or_else(|| undefined_identifier(interner.lookup(name)));
    }
    env.lookup(name)
        .ok_or_else(|| undefined_identifier(interner.lookup(name)))
}
