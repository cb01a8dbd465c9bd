//! Constant declarations and `iota`.
//!
//! `iota` is the zero-based index of the spec within its `const` block.
//! A spec without values repeats the previous spec's expressions, which are
//! evaluated again with the new `iota`.

use tern_ir::{ConstSpec, ExprId};

use super::Interpreter;
use crate::environment::Mutability;
use crate::errors::{assignment_mismatch, EvalResult};
use crate::Value;

impl Interpreter<'_> {
    pub(super) fn eval_const_decl(&mut self, specs: &[ConstSpec]) -> EvalResult {
        let saved = self.iota.take();
        let result = self.eval_const_specs(specs);
        self.iota = saved;
        result
    }

    fn eval_const_specs(&mut self, specs: &[ConstSpec]) -> EvalResult {
        let mut previous: &[ExprId] = &[];
        for (ordinal, spec) in specs.iter().enumerate() {
            if !spec.values.is_empty() {
                previous = &spec.values;
            }
            if previous.len() != spec.names.len() {
                return Err(assignment_mismatch(spec.names.len(), previous.len()).into());
            }
            self.iota = Some(i64::try_from(ordinal).unwrap_or(i64::MAX));
            for (&name, &expr) in spec.names.iter().zip(previous) {
                let value = self.eval_expr(expr)?;
                if name != self.names.blank {
                    self.bind(name, value, Mutability::Immutable)?;
                }
            }
        }
        Ok(Value::Void)
    }
}
