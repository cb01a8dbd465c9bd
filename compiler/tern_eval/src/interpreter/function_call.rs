//! Function and method calls.
//!
//! A call evaluates its body in an environment of its own: one fresh frame
//! for the parameters whose parent is the frame the closure captured. The
//! caller's frames are invisible to the callee. The call boundary consumes
//! `return`; a `break` or `continue` that escapes the body is an error.

use smallvec::SmallVec;
use tern_ir::{ExprId, ExprKind, Name, Span};

use super::Interpreter;
use crate::diagnostics::CallFrame;
use crate::environment::Mutability;
use crate::errors::{
    arity_mismatch, not_callable, undefined_method, ControlAction, EvalError, EvalResult,
};
use crate::{FunctionValue, Value};

/// Arguments of one call. Most calls take few.
pub(crate) type CallArgs = SmallVec<[Value; 4]>;

impl Interpreter<'_> {
    pub(super) fn eval_call(&mut self, func: ExprId, args: &[ExprId], span: Span) -> EvalResult {
        let callee = self.eval_expr(func)?;
        let mut values = CallArgs::with_capacity(args.len());
        for &arg in args {
            values.push(self.eval_expr(arg)?);
        }
        // f(g()) passes every result of g
        if let [Value::Tuple(_)] = values.as_slice() {
            if let Some(Value::Tuple(spread)) = values.pop() {
                values.extend(spread);
            }
        }
        let name = self.callee_name(func);
        self.call_value(callee, values, name, Some(span))
    }

    fn callee_name(&self, func: ExprId) -> Name {
        match &self.arena.expr(func).kind {
            ExprKind::Ident(name) | ExprKind::Selector { name, .. } => *name,
            _ => self.names.anonymous,
        }
    }

    /// Call a function or bound method value.
    pub fn call_value(
        &mut self,
        callee: Value,
        args: CallArgs,
        name: Name,
        call_span: Option<Span>,
    ) -> EvalResult {
        match callee {
            Value::Func(function) => self.call_function(&function, args, name, call_span),
            Value::BoundMethod(method) => {
                let Some(function) = self.functions.get(&method.func).cloned() else {
                    return Err(undefined_method(
                        self.interner.lookup(method.name),
                        method.recv.type_name(),
                    )
                    .into());
                };
                let mut full = CallArgs::with_capacity(args.len() + 1);
                full.push(*method.recv);
                full.extend(args);
                self.call_function(&function, full, method.name, call_span)
            }
            other => Err(not_callable(other.type_name()).into()),
        }
    }

    fn call_function(
        &mut self,
        function: &FunctionValue,
        args: CallArgs,
        name: Name,
        call_span: Option<Span>,
    ) -> EvalResult {
        if args.len() != function.params.len() {
            return Err(arity_mismatch(
                self.interner.lookup(name),
                function.params.len(),
                args.len(),
            )
            .into());
        }
        self.call_stack.push(CallFrame { name, call_span })?;

        let call_env = self.env.for_call(function.env.clone());
        let caller_env = std::mem::replace(&mut self.env, call_env);
        let caller_iota = self.iota.take();

        let outcome = match self.bind_params(&function.params, args) {
            Ok(()) => self.eval_stmt(function.body),
            Err(err) => Err(err.into()),
        };

        self.env = caller_env;
        self.iota = caller_iota;

        let result = match outcome {
            Ok(_) => Ok(Value::Void),
            Err(ControlAction::Return(values)) => Ok(Value::from_results(values)),
            Err(action) => Err(self.with_backtrace(action.into_eval_error()).into()),
        };
        self.call_stack.pop();
        result
    }

    fn bind_params(&mut self, params: &[Name], args: CallArgs) -> Result<(), EvalError> {
        for (&param, arg) in params.iter().zip(args) {
            if param != self.names.blank {
                self.bind(param, arg, Mutability::Mutable)?;
            }
        }
        Ok(())
    }

    /// Attach the live call stack to an error leaving its innermost call.
    fn with_backtrace(&self, err: EvalError) -> EvalError {
        if err.backtrace.is_some() {
            return err;
        }
        let backtrace = self.call_stack.capture(self.interner);
        err.with_backtrace(backtrace)
    }
}
