//! Binary and unary operators on runtime values.
//!
//! Operands must have the same dynamic kind; there are no implicit
//! conversions. Integer arithmetic wraps on overflow. `&&` and `||` are
//! short-circuited by the interpreter before reaching here.

use tern_ir::{BinaryOp, UnaryOp};

use crate::errors::{
    binary_type_mismatch, division_by_zero, invalid_binary_op, type_mismatch, EvalError,
};
use crate::Value;

/// Evaluate `left op right`.
pub fn evaluate_binary(left: &Value, right: &Value, op: BinaryOp) -> Result<Value, EvalError> {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => eval_int_binary(*a, *b, op),
        (Value::Float(a), Value::Float(b)) => eval_float_binary(*a, *b, op),
        (Value::Bool(a), Value::Bool(b)) => eval_bool_binary(*a, *b, op),
        (Value::Str(a), Value::Str(b)) => eval_string_binary(a, b, op),
        _ if left.type_name() != right.type_name() => {
            Err(binary_type_mismatch(left.type_name(), right.type_name()))
        }
        _ => match op {
            BinaryOp::Eq => Ok(Value::Bool(values_equal(left, right))),
            BinaryOp::NotEq => Ok(Value::Bool(!values_equal(left, right))),
            _ => Err(invalid_binary_op(left.type_name(), op)),
        },
    }
}

fn eval_int_binary(a: i64, b: i64, op: BinaryOp) -> Result<Value, EvalError> {
    let value = match op {
        BinaryOp::Add => Value::Int(a.wrapping_add(b)),
        BinaryOp::Sub => Value::Int(a.wrapping_sub(b)),
        BinaryOp::Mul => Value::Int(a.wrapping_mul(b)),
        BinaryOp::Div | BinaryOp::Rem if b == 0 => return Err(division_by_zero()),
        BinaryOp::Div => Value::Int(a.wrapping_div(b)),
        BinaryOp::Rem => Value::Int(a.wrapping_rem(b)),
        BinaryOp::Eq => Value::Bool(a == b),
        BinaryOp::NotEq => Value::Bool(a != b),
        BinaryOp::Lt => Value::Bool(a < b),
        BinaryOp::LtEq => Value::Bool(a <= b),
        BinaryOp::Gt => Value::Bool(a > b),
        BinaryOp::GtEq => Value::Bool(a >= b),
        BinaryOp::And | BinaryOp::Or => return Err(invalid_binary_op("int", op)),
    };
    Ok(value)
}

#[expect(
    clippy::float_cmp,
    reason = "== on float64 operands compares exactly"
)]
fn eval_float_binary(a: f64, b: f64, op: BinaryOp) -> Result<Value, EvalError> {
    let value = match op {
        BinaryOp::Add => Value::Float(a + b),
        BinaryOp::Sub => Value::Float(a - b),
        BinaryOp::Mul => Value::Float(a * b),
        BinaryOp::Div => Value::Float(a / b),
        BinaryOp::Eq => Value::Bool(a == b),
        BinaryOp::NotEq => Value::Bool(a != b),
        BinaryOp::Lt => Value::Bool(a < b),
        BinaryOp::LtEq => Value::Bool(a <= b),
        BinaryOp::Gt => Value::Bool(a > b),
        BinaryOp::GtEq => Value::Bool(a >= b),
        BinaryOp::Rem | BinaryOp::And | BinaryOp::Or => {
            return Err(invalid_binary_op("float64", op))
        }
    };
    Ok(value)
}

fn eval_bool_binary(a: bool, b: bool, op: BinaryOp) -> Result<Value, EvalError> {
    match op {
        BinaryOp::Eq => Ok(Value::Bool(a == b)),
        BinaryOp::NotEq => Ok(Value::Bool(a != b)),
        BinaryOp::And => Ok(Value::Bool(a && b)),
        BinaryOp::Or => Ok(Value::Bool(a || b)),
        _ => Err(invalid_binary_op("bool", op)),
    }
}

fn eval_string_binary(a: &str, b: &str, op: BinaryOp) -> Result<Value, EvalError> {
    let value = match op {
        BinaryOp::Add => Value::Str(format!("{a}{b}")),
        BinaryOp::Eq => Value::Bool(a == b),
        BinaryOp::NotEq => Value::Bool(a != b),
        BinaryOp::Lt => Value::Bool(a < b),
        BinaryOp::LtEq => Value::Bool(a <= b),
        BinaryOp::Gt => Value::Bool(a > b),
        BinaryOp::GtEq => Value::Bool(a >= b),
        _ => return Err(invalid_binary_op("string", op)),
    };
    Ok(value)
}

/// Equality used by `==` and by switch case matching.
///
/// Functions and bound methods compare by identity, structs field by field.
pub fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Struct(a), Value::Struct(b)) => {
            a.ty == b.ty
                && a.fields.len() == b.fields.len()
                && a.fields.iter().zip(&b.fields).all(|(x, y)| values_equal(x, y))
        }
        _ => left == right,
    }
}

/// Evaluate `op operand`.
pub fn evaluate_unary(operand: &Value, op: UnaryOp) -> Result<Value, EvalError> {
    match (operand, op) {
        (Value::Int(n), UnaryOp::Neg) => Ok(Value::Int(n.wrapping_neg())),
        (Value::Float(x), UnaryOp::Neg) => Ok(Value::Float(-x)),
        (Value::Bool(b), UnaryOp::Not) => Ok(Value::Bool(!b)),
        (_, UnaryOp::Neg) => Err(type_mismatch("number", operand.type_name())),
        (_, UnaryOp::Not) => Err(type_mismatch("bool", operand.type_name())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EvalErrorKind;
    use pretty_assertions::assert_eq;

    fn ok(result: Result<Value, EvalError>) -> Value {
        result.unwrap_or_else(|e| panic!("unexpected error: {e}"))
    }

    #[test]
    fn int_arithmetic() {
        assert_eq!(
            ok(evaluate_binary(&Value::int(7), &Value::int(2), BinaryOp::Div)),
            Value::int(3)
        );
        assert_eq!(
            ok(evaluate_binary(&Value::int(7), &Value::int(2), BinaryOp::Rem)),
            Value::int(1)
        );
        assert_eq!(
            ok(evaluate_binary(&Value::int(i64::MAX), &Value::int(1), BinaryOp::Add)),
            Value::int(i64::MIN)
        );
    }

    #[test]
    fn division_by_zero_is_error() {
        for op in [BinaryOp::Div, BinaryOp::Rem] {
            let err = evaluate_binary(&Value::int(1), &Value::int(0), op);
            assert!(matches!(
                err,
                Err(EvalError {
                    kind: EvalErrorKind::DivisionByZero,
                    ..
                })
            ));
        }
    }

    #[test]
    fn mismatched_operands() {
        let err = evaluate_binary(&Value::int(1), &Value::string("a"), BinaryOp::Add);
        assert_eq!(
            err.map_err(|e| e.message),
            Err("mismatched types int and string".to_string())
        );
    }

    #[test]
    fn strings_concatenate_and_compare() {
        assert_eq!(
            ok(evaluate_binary(
                &Value::string("go"),
                &Value::string("pher"),
                BinaryOp::Add
            )),
            Value::string("gopher")
        );
        assert_eq!(
            ok(evaluate_binary(&Value::string("a"), &Value::string("b"), BinaryOp::Lt)),
            Value::Bool(true)
        );
        assert!(evaluate_binary(&Value::string("a"), &Value::string("b"), BinaryOp::Mul).is_err());
    }

    #[test]
    fn unary_operators() {
        assert_eq!(ok(evaluate_unary(&Value::int(4), UnaryOp::Neg)), Value::int(-4));
        assert_eq!(
            ok(evaluate_unary(&Value::Bool(false), UnaryOp::Not)),
            Value::Bool(true)
        );
        assert!(evaluate_unary(&Value::int(1), UnaryOp::Not).is_err());
    }
}
