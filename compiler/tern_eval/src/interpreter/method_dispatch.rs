//! Struct values, field selection and method dispatch through the universe.
//!
//! A method declared by interpreted code is recorded twice: its static
//! declaration goes into the universe (so `NumMethod` and `Method(i)` see
//! it) and its body goes into the interpreter's function table under a
//! `FuncRef` the universe allocates. `x.M` resolves `M` with `find_method`,
//! then asks the universe for `Method(i)` of the declaring type and pairs
//! the resolved callable with the receiver.

use tern_ir::{ExprId, Name};
use tern_types::{FieldDecl, Kind, MethodDecl, TypeData, TypeError, TypeId};

use super::Interpreter;
use crate::errors::{
    arity_mismatch, assignment_mismatch, type_mismatch, undefined_field, undefined_method,
    undefined_type, EvalError, EvalResult,
};
use crate::{BoundMethod, FunctionValue, StructValue, Value};

impl Interpreter<'_> {
    /// Declare method `decl` on the named type `ty`, implemented by
    /// `function`, whose first parameter is the receiver.
    ///
    /// With `pointer_receiver` the method is declared on `*ty`. Returns the
    /// method's index in `ty`'s method table.
    pub fn declare_method(
        &mut self,
        ty: TypeId,
        mut decl: MethodDecl,
        function: FunctionValue,
        pointer_receiver: bool,
    ) -> Result<usize, EvalError> {
        let name = decl.name;
        let expected = decl.sig.params.len() + 1;
        if function.params.len() != expected {
            return Err(arity_mismatch(
                self.interner.lookup(name),
                expected,
                function.params.len(),
            ));
        }
        let (index, func) = self.universe.write(|u| -> Result<_, TypeError> {
            if pointer_receiver {
                decl.sig.recv = Some(u.pointer_to(ty));
            }
            let index = u.add_method(ty, decl)?;
            let func = u.alloc_func();
            u.bind_method(ty, name, func)?;
            Ok((index, func))
        })?;
        tracing::debug!(
            method = self.interner.lookup(name),
            index,
            ?func,
            "declared method"
        );
        self.functions.insert(func, function);
        Ok(index)
    }

    /// Fields of `ty`'s underlying struct, or `None` if it is not a struct.
    fn struct_fields(&self, ty: TypeId) -> Option<Vec<FieldDecl>> {
        self.universe.read(|u| match u.data(u.underlying(ty)) {
            TypeData::Struct(fields) => Some(fields.clone()),
            _ => None,
        })
    }

    fn type_name(&self, ty: TypeId) -> String {
        self.universe.read(|u| u.type_name(ty))
    }

    pub(super) fn eval_composite(&mut self, type_name: Name, fields: &[ExprId]) -> EvalResult {
        let Some(ty) = self.universe.read(|u| u.lookup_named(type_name)) else {
            return Err(undefined_type(self.interner.lookup(type_name)).into());
        };
        let Some(decls) = self.struct_fields(ty) else {
            let kind = self.universe.read(|u| u.kind_of(ty));
            return Err(type_mismatch(Kind::Struct.name(), kind.name()).into());
        };
        if decls.len() != fields.len() {
            return Err(assignment_mismatch(decls.len(), fields.len()).into());
        }
        let mut values = Vec::with_capacity(fields.len());
        for &field in fields {
            values.push(self.eval_expr(field)?);
        }
        Ok(Value::Struct(StructValue { ty, fields: values }))
    }

    /// `base.name`: a field (direct or promoted), else a method.
    pub(super) fn eval_selector(&mut self, base: ExprId, name: Name) -> EvalResult {
        let recv = self.eval_expr(base)?;
        let Value::Struct(value) = &recv else {
            return Err(undefined_field(self.interner.lookup(name), recv.type_name()).into());
        };
        if let Some(field) = self.field_value(value, name) {
            return Ok(field);
        }
        self.select_method(recv, name)
    }

    /// Look up a field by name, then through embedded struct fields in
    /// declaration order.
    fn field_value(&self, value: &StructValue, name: Name) -> Option<Value> {
        let decls = self.struct_fields(value.ty)?;
        if let Some(index) = decls.iter().position(|d| d.name == name) {
            return value.fields.get(index).cloned();
        }
        decls
            .iter()
            .zip(&value.fields)
            .filter(|(decl, _)| decl.embedded)
            .find_map(|(_, field)| match field {
                Value::Struct(inner) => self.field_value(inner, name),
                _ => None,
            })
    }

    fn select_method(&mut self, recv: Value, name: Name) -> EvalResult {
        let Value::Struct(value) = &recv else {
            return Err(undefined_field(self.interner.lookup(name), recv.type_name()).into());
        };
        let ty = value.ty;
        let Some(path) = self.universe.read(|u| u.find_method(ty, name)) else {
            return Err(undefined_field(self.interner.lookup(name), &self.type_name(ty)).into());
        };

        // the receiver is the embedded value the method was promoted from
        let mut target = recv;
        for &index in &path.fields {
            target = match target {
                Value::Struct(mut outer) if index < outer.fields.len() => {
                    outer.fields.swap_remove(index)
                }
                other => {
                    return Err(
                        undefined_field(self.interner.lookup(name), other.type_name()).into(),
                    )
                }
            };
        }

        let method = self.universe.method(path.owner, path.index)?;
        let Some(func) = method.func else {
            return Err(
                undefined_method(self.interner.lookup(name), &self.type_name(path.owner)).into(),
            );
        };
        Ok(Value::BoundMethod(BoundMethod {
            recv: Box::new(target),
            func,
            name,
        }))
    }
}
