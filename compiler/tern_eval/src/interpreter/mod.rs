//! Tree-walking interpreter.
//!
//! Statements evaluate to `Result<Value, ControlAction>`. `break`,
//! `continue` and `return` leave a statement through the `Err` channel as
//! [`ControlAction`] signals and are consumed explicitly: loops and switches
//! through [`to_loop_action`] and [`to_switch_action`], call boundaries in
//! `function_call.rs`. A signal that nothing consumes becomes an
//! [`EvalError`] in [`Interpreter::run`].
//!
//! Blocks, `if`, `for` and `switch` each evaluate inside their own frame,
//! entered through the [`ScopedInterpreter`] guard.

mod builder;
mod consts;
mod function_call;
mod interned_names;
mod method_dispatch;
mod scope_guard;

pub use builder::InterpreterBuilder;
pub use scope_guard::ScopedInterpreter;

use rustc_hash::FxHashMap;
use tern_ir::{
    BinaryOp, BranchKind, CaseClause, ExprId, ExprKind, Name, SharedInterner, StmtId, StmtKind,
    StringInterner, SyntaxArena,
};
use tern_stack::ensure_sufficient_stack;
use tern_types::{FuncRef, UniverseHandle};

use crate::diagnostics::CallStack;
use crate::environment::{BindError, Environment, Mutability};
use crate::errors::{
    assignment_mismatch, cannot_assign_constant, invalid_condition_type, reserved_identifier,
    type_mismatch, undefined_identifier, unimplemented, ControlAction, EvalError, EvalResult,
};
use crate::exec::control::{to_loop_action, to_switch_action, LoopAction};
use crate::exec::ident::eval_ident;
use crate::exec::operators::{evaluate_binary, evaluate_unary, values_equal};
use crate::{FunctionValue, Value};

use interned_names::InternedNames;

/// Tree-walking interpreter over one syntax arena.
pub struct Interpreter<'a> {
    /// Interner the arena's names were produced by.
    pub interner: &'a StringInterner,
    pub arena: &'a SyntaxArena,
    pub env: Environment,
    /// Type universe shared with the caller; its interner must be `interner`.
    pub universe: UniverseHandle,
    /// Bodies of methods declared through [`Interpreter::declare_method`].
    pub(crate) functions: FxHashMap<FuncRef, FunctionValue>,
    pub(crate) call_stack: CallStack,
    pub(crate) names: InternedNames,
    /// Ordinal of the constant spec being evaluated, if any.
    pub(crate) iota: Option<i64>,
}

impl<'a> Interpreter<'a> {
    /// Interpreter with a fresh environment and a fresh single-threaded universe.
    pub fn new(interner: &'a SharedInterner, arena: &'a SyntaxArena) -> Self {
        InterpreterBuilder::new(interner, arena).build()
    }

    pub fn call_stack(&self) -> &CallStack {
        &self.call_stack
    }

    /// Evaluate a statement to completion.
    ///
    /// A `break`, `continue` or `return` that no construct consumed is
    /// reported as an error.
    pub fn run(&mut self, stmt: StmtId) -> Result<Value, EvalError> {
        self.eval_stmt(stmt).map_err(ControlAction::into_eval_error)
    }

    /// Evaluate top-level statements in the current frame, returning the
    /// value of the last one.
    pub fn run_program(&mut self, stmts: &[StmtId]) -> Result<Value, EvalError> {
        let mut last = Value::Void;
        for &stmt in stmts {
            last = self.run(stmt)?;
        }
        Ok(last)
    }

    /// Evaluate an expression to completion.
    pub fn eval(&mut self, expr: ExprId) -> Result<Value, EvalError> {
        self.eval_expr(expr).map_err(ControlAction::into_eval_error)
    }

    // Statements

    #[tracing::instrument(level = "trace", skip(self))]
    pub fn eval_stmt(&mut self, id: StmtId) -> EvalResult {
        self.eval_stmt_labeled(id, None)
    }

    fn eval_stmt_labeled(&mut self, id: StmtId, label: Option<Name>) -> EvalResult {
        ensure_sufficient_stack(|| self.exec_stmt(id, label))
    }

    fn exec_stmt(&mut self, id: StmtId, label: Option<Name>) -> EvalResult {
        let arena = self.arena;
        let stmt = arena.stmt(id);
        let result = match &stmt.kind {
            StmtKind::Empty => Ok(Value::Void),
            StmtKind::Expr(expr) => self.eval_expr(*expr),
            StmtKind::Define { names, values } => self.eval_define(names, values),
            StmtKind::Assign {
                targets,
                op,
                values,
            } => self.eval_assign(targets, *op, values),
            StmtKind::IncDec { target, increment } => self.eval_inc_dec(*target, *increment),
            StmtKind::Block(stmts) => self.with_env_scope(|scoped| scoped.eval_block(stmts)),
            StmtKind::If {
                init,
                cond,
                body,
                else_branch,
            } => self.eval_if(*init, *cond, *body, *else_branch),
            StmtKind::For {
                init,
                cond,
                post,
                body,
            } => self.eval_for(*init, *cond, *post, *body, label),
            StmtKind::Branch { kind, label } => match kind {
                BranchKind::Break => Err(ControlAction::Break(*label)),
                BranchKind::Continue => Err(ControlAction::Continue(*label)),
                BranchKind::Goto | BranchKind::Fallthrough => {
                    Err(unimplemented(kind.keyword()).into())
                }
            },
            StmtKind::Return(exprs) => {
                let values = self.eval_results(exprs)?;
                Err(ControlAction::Return(values))
            }
            StmtKind::Labeled { label, stmt } => self.eval_labeled(*label, *stmt),
            StmtKind::Switch { init, tag, clauses } => {
                self.eval_switch(*init, *tag, clauses, label)
            }
            StmtKind::ConstDecl(specs) => self.eval_const_decl(specs),
        };
        result.map_err(|action| action.with_span_if_error(stmt.span))
    }

    /// Evaluate statements in sequence. Signals propagate unchanged.
    pub(crate) fn eval_block(&mut self, stmts: &[StmtId]) -> EvalResult {
        for &stmt in stmts {
            self.eval_stmt(stmt)?;
        }
        Ok(Value::Void)
    }

    fn eval_if(
        &mut self,
        init: Option<StmtId>,
        cond: ExprId,
        body: StmtId,
        else_branch: Option<StmtId>,
    ) -> EvalResult {
        self.with_env_scope(|scoped| {
            if let Some(init) = init {
                scoped.eval_stmt(init)?;
            }
            if scoped.eval_condition(cond)? {
                scoped.eval_stmt(body)?;
            } else if let Some(else_branch) = else_branch {
                scoped.eval_stmt(else_branch)?;
            }
            Ok(Value::Void)
        })
    }

    fn eval_for(
        &mut self,
        init: Option<StmtId>,
        cond: Option<ExprId>,
        post: Option<StmtId>,
        body: StmtId,
        label: Option<Name>,
    ) -> EvalResult {
        self.with_env_scope(|scoped| {
            if let Some(init) = init {
                scoped.eval_stmt(init)?;
            }
            loop {
                if let Some(cond) = cond {
                    if !scoped.eval_condition(cond)? {
                        break;
                    }
                }
                if let Err(action) = scoped.eval_stmt(body) {
                    match to_loop_action(action, label) {
                        LoopAction::Continue => {}
                        LoopAction::Break => break,
                        LoopAction::Exit(action) => return Err(action),
                    }
                }
                if let Some(post) = post {
                    scoped.eval_stmt(post)?;
                }
            }
            Ok(Value::Void)
        })
    }

    fn eval_labeled(&mut self, label: Name, stmt: StmtId) -> EvalResult {
        match self.eval_stmt_labeled(stmt, Some(label)) {
            Err(ControlAction::Break(Some(target))) if target == label => Ok(Value::Void),
            other => other,
        }
    }

    fn eval_switch(
        &mut self,
        init: Option<StmtId>,
        tag: Option<ExprId>,
        clauses: &[CaseClause],
        label: Option<Name>,
    ) -> EvalResult {
        let outcome = self.with_env_scope(|scoped| {
            if let Some(init) = init {
                scoped.eval_stmt(init)?;
            }
            let tag_value = match tag {
                Some(tag) => scoped.eval_expr(tag)?,
                None => Value::Bool(true),
            };
            let mut chosen = None;
            'clauses: for clause in clauses {
                let Some(values) = &clause.values else {
                    continue;
                };
                for &expr in values {
                    let case = scoped.eval_expr(expr)?;
                    if tag.is_none() && !matches!(case, Value::Bool(_)) {
                        let span = scoped.arena.expr(expr).span;
                        return Err(invalid_condition_type(case.type_name())
                            .with_span(span)
                            .into());
                    }
                    if values_equal(&tag_value, &case) {
                        chosen = Some(clause);
                        break 'clauses;
                    }
                }
            }
            let chosen = chosen.or_else(|| clauses.iter().find(|c| c.values.is_none()));
            if let Some(clause) = chosen {
                scoped.with_env_scope(|body| body.eval_block(&clause.body))?;
            }
            Ok(Value::Void)
        });
        match outcome {
            Err(action) => to_switch_action(action, label).map_or(Ok(Value::Void), Err),
            ok => ok,
        }
    }

    /// Evaluate a condition, which must be a `bool`.
    fn eval_condition(&mut self, cond: ExprId) -> Result<bool, ControlAction> {
        match self.eval_expr(cond)? {
            Value::Bool(b) => Ok(b),
            other => {
                let span = self.arena.expr(cond).span;
                Err(invalid_condition_type(other.type_name())
                    .with_span(span)
                    .into())
            }
        }
    }

    // Bindings

    fn eval_define(&mut self, names: &[Name], values: &[ExprId]) -> EvalResult {
        let values = self.eval_values(names.len(), values)?;
        for (&name, value) in names.iter().zip(values) {
            if name != self.names.blank {
                self.bind(name, value, Mutability::Mutable)?;
            }
        }
        Ok(Value::Void)
    }

    fn eval_assign(
        &mut self,
        targets: &[Name],
        op: Option<BinaryOp>,
        values: &[ExprId],
    ) -> EvalResult {
        if let Some(op) = op {
            let (&[target], &[value]) = (targets, values) else {
                return Err(assignment_mismatch(targets.len(), values.len()).into());
            };
            let current = self.lookup(target)?;
            let rhs = self.eval_expr(value)?;
            let updated = evaluate_binary(&current, &rhs, op)?;
            self.store(target, updated)?;
            return Ok(Value::Void);
        }
        // every right-hand side is evaluated before any target is updated
        let values = self.eval_values(targets.len(), values)?;
        for (&target, value) in targets.iter().zip(values) {
            if target != self.names.blank {
                self.store(target, value)?;
            }
        }
        Ok(Value::Void)
    }

    fn eval_inc_dec(&mut self, target: Name, increment: bool) -> EvalResult {
        let delta: i8 = if increment { 1 } else { -1 };
        let updated = match self.lookup(target)? {
            Value::Int(n) => Value::Int(n.wrapping_add(i64::from(delta))),
            Value::Float(x) => Value::Float(x + f64::from(delta)),
            other => return Err(type_mismatch("number", other.type_name()).into()),
        };
        self.store(target, updated)?;
        Ok(Value::Void)
    }

    /// Evaluate the right-hand side of a definition or assignment with
    /// `expected` targets. A single expression may produce several values.
    fn eval_values(
        &mut self,
        expected: usize,
        exprs: &[ExprId],
    ) -> Result<Vec<Value>, ControlAction> {
        let values = if let &[single] = exprs {
            self.eval_expr(single)?.into_results()
        } else {
            let mut values = Vec::with_capacity(exprs.len());
            for &expr in exprs {
                values.push(self.eval_expr(expr)?);
            }
            values
        };
        if values.len() != expected {
            return Err(assignment_mismatch(expected, values.len()).into());
        }
        Ok(values)
    }

    /// Evaluate the operands of a `return`, spreading a single multi-value call.
    fn eval_results(&mut self, exprs: &[ExprId]) -> Result<Vec<Value>, ControlAction> {
        if let &[single] = exprs {
            return Ok(match self.eval_expr(single)? {
                Value::Tuple(values) => values,
                value => vec![value],
            });
        }
        let mut values = Vec::with_capacity(exprs.len());
        for &expr in exprs {
            values.push(self.eval_expr(expr)?);
        }
        Ok(values)
    }

    pub(crate) fn bind(
        &mut self,
        name: Name,
        value: Value,
        mutability: Mutability,
    ) -> Result<(), EvalError> {
        self.env
            .define(name, value, mutability)
            .map_err(|err| self.bind_error(err, name))
    }

    fn store(&mut self, name: Name, value: Value) -> Result<(), EvalError> {
        self.env
            .assign(name, value)
            .map_err(|err| self.bind_error(err, name))
    }

    fn lookup(&self, name: Name) -> Result<Value, EvalError> {
        eval_ident(name, &self.env, self.iota, self.interner)
    }

    #[cold]
    fn bind_error(&self, err: BindError, name: Name) -> EvalError {
        let name = self.interner.lookup(name);
        match err {
            BindError::Reserved => reserved_identifier(name),
            BindError::Immutable => cannot_assign_constant(name),
            BindError::Undefined => undefined_identifier(name),
        }
    }

    // Expressions

    #[tracing::instrument(level = "trace", skip(self))]
    pub fn eval_expr(&mut self, id: ExprId) -> EvalResult {
        ensure_sufficient_stack(|| self.exec_expr(id))
    }

    fn exec_expr(&mut self, id: ExprId) -> EvalResult {
        let arena = self.arena;
        let expr = arena.expr(id);
        let result = match &expr.kind {
            ExprKind::Int(n) => Ok(Value::Int(*n)),
            ExprKind::Float(bits) => Ok(Value::Float(f64::from_bits(*bits))),
            ExprKind::Str(name) => Ok(Value::string(self.interner.lookup(*name))),
            ExprKind::Ident(name) => self.lookup(*name).map_err(ControlAction::from),
            ExprKind::Binary { op, left, right } => self.eval_binary(*op, *left, *right),
            ExprKind::Unary { op, operand } => {
                let value = self.eval_expr(*operand)?;
                evaluate_unary(&value, *op).map_err(ControlAction::from)
            }
            ExprKind::Call { func, args } => self.eval_call(*func, args, expr.span),
            ExprKind::FuncLit { params, body } => Ok(Value::Func(FunctionValue {
                params: params.clone(),
                body: *body,
                env: self.env.current_scope(),
            })),
            ExprKind::Selector { base, name } => self.eval_selector(*base, *name),
            ExprKind::CompositeLit { type_name, fields } => {
                self.eval_composite(*type_name, fields)
            }
        };
        result.map_err(|action| action.with_span_if_error(expr.span))
    }

    fn eval_binary(&mut self, op: BinaryOp, left: ExprId, right: ExprId) -> EvalResult {
        let lhs = self.eval_expr(left)?;
        if matches!(op, BinaryOp::And | BinaryOp::Or) {
            let Value::Bool(l) = lhs else {
                return Err(type_mismatch("bool", lhs.type_name()).into());
            };
            // short-circuit
            if l == (op == BinaryOp::Or) {
                return Ok(Value::Bool(l));
            }
            return match self.eval_expr(right)? {
                Value::Bool(r) => Ok(Value::Bool(r)),
                other => Err(type_mismatch("bool", other.type_name()).into()),
            };
        }
        let rhs = self.eval_expr(right)?;
        evaluate_binary(&lhs, &rhs, op).map_err(ControlAction::from)
    }
}
