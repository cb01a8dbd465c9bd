//! Method resolution: `Method(i)` for named types and interfaces.
//!
//! Resolution maps the i-th declared method of a type to its runtime half
//! and stores that in the type's descriptor, so the work happens at most
//! once per (type, index). Only explicitly declared methods are indexed;
//! promoted methods are found through [`TypeUniverse::find_method`].

use std::fmt;

use tern_ir::Name;

use crate::decl::{is_exported, MethodDecl, Signature, TypeData};
use crate::descriptor::MethodSlot;
use crate::repr::{add_receiver, FuncRepr, ReprKind, INTERFACE_SLOT_OFFSET};
use crate::{FuncRef, Kind, ReprId, TypeError, TypeId, TypeUniverse};

/// Both views of a method's type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodType {
    /// Declared signature; the receiver is kept apart in `recv`.
    pub signature: Signature,
    /// Runtime signature; the receiver is the first parameter.
    pub repr: FuncRepr,
}

/// Where a method's runtime slot lives.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MethodSlotRef {
    pub owner: TypeId,
    pub index: usize,
}

/// A resolved method.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Method {
    pub name: Name,
    pub pkg: Option<Name>,
    /// `None` for unexported methods of a native interface, and for
    /// unexported methods of named types not bound yet.
    pub ty: Option<MethodType>,
    /// Bound implementation; always `None` for interface methods.
    pub func: Option<FuncRef>,
    pub slot: MethodSlotRef,
    pub index: usize,
    pub decl: MethodDecl,
}

/// Outcome of synthesizing a slot: unresolved unexported methods of named
/// types are handed out but not cached, so a later binding is picked up.
struct Synthesized {
    slot: MethodSlot,
    cacheable: bool,
}

impl TypeUniverse {
    /// The i-th method of `ty`.
    ///
    /// Only named types and interfaces have methods. For interfaces `index`
    /// ranges over the complete method set ordered by name; for other named
    /// types it ranges over explicit methods in declaration order.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn method(&mut self, ty: TypeId, index: usize) -> Result<Method, TypeError> {
        self.check_method(ty, index)?;
        let decl = self.declared_method(ty, index)?;
        let count = self.num_method(ty);
        let repr = self.descriptor(ty)?.repr();

        let cached = match self.descriptors.get_mut(&ty) {
            Some(descriptor) => {
                descriptor.resize_slots(count);
                descriptor.slots[index].clone()
            }
            None => None,
        };
        if let Some(slot) = cached {
            tracing::trace!("method slot cache hit");
            return self.make_method(ty, index, decl, &slot);
        }

        let Synthesized { slot, cacheable } = self.synthesize_slot(ty, index, &decl, repr)?;
        let method = self.make_method(ty, index, decl, &slot)?;
        if cacheable {
            if let Some(descriptor) = self.descriptors.get_mut(&ty) {
                descriptor.slots[index] = Some(slot);
                self.stats.slots_synthesized += 1;
            }
            tracing::debug!(
                ty = %self.type_name(ty),
                index,
                method = self.interner().lookup(method.name),
                "synthesized method slot"
            );
        }
        Ok(method)
    }

    /// Read-only fast path: the i-th method if its slot is already cached.
    pub fn cached_method(&self, ty: TypeId, index: usize) -> Option<Result<Method, TypeError>> {
        let slot = self.peek_descriptor(ty)?.slot(index)?;
        let decl = match self.declared_method(ty, index) {
            Ok(decl) => decl,
            Err(e) => return Some(Err(e)),
        };
        Some(self.make_method(ty, index, decl, slot))
    }

    /// Position of the declared method `name` among `ty`'s indexed methods.
    pub fn method_index(&self, ty: TypeId, name: Name) -> Option<usize> {
        if let Some(iface) = self.interface_data(ty) {
            iface.all.iter().position(|m| m.name == name)
        } else if let TypeData::Named(named) = self.data(ty) {
            named.methods.iter().position(|m| m.name == name)
        } else {
            None
        }
    }

    /// `Name func(...)` using the runtime signature, receiver included.
    pub fn method_string(&self, method: &Method) -> String {
        let name = self.interner().lookup(method.name);
        match &method.ty {
            Some(ty) => format!("{name} {}", self.func_repr_string(&ty.repr)),
            None => format!("{name} <unresolved>"),
        }
    }

    fn check_method(&self, ty: TypeId, index: usize) -> Result<(), TypeError> {
        let kind = self.kind_of(ty);
        if kind == Kind::Ptr {
            return Err(TypeError::MethodOnPointer {
                ty: self.type_name(ty),
                kind,
                index,
            });
        }
        if !self.is_named(ty) && kind != Kind::Interface {
            return Err(TypeError::CannotHaveMethods {
                ty: self.type_name(ty),
                kind,
                index,
            });
        }
        let count = self.num_method(ty);
        if index >= count {
            return Err(TypeError::MethodIndexOutOfRange {
                ty: self.type_name(ty),
                index,
                count,
            });
        }
        Ok(())
    }

    pub(crate) fn declared_method(&self, ty: TypeId, index: usize) -> Result<MethodDecl, TypeError> {
        let found = if let Some(iface) = self.interface_data(ty) {
            iface.all.get(index)
        } else if let TypeData::Named(named) = self.data(ty) {
            named.methods.get(index)
        } else {
            None
        };
        found.cloned().ok_or_else(|| TypeError::MethodIndexOutOfRange {
            ty: self.type_name(ty),
            index,
            count: self.num_method(ty),
        })
    }

    fn synthesize_slot(
        &mut self,
        ty: TypeId,
        index: usize,
        decl: &MethodDecl,
        repr: ReprId,
    ) -> Result<Synthesized, TypeError> {
        let name = self.interner().lookup_static(decl.name);

        if self.interface_data(ty).is_some() {
            return self.interface_slot(ty, index, name, decl.name, repr);
        }

        let callable = match self.repr(repr).method_by_name(decl.name) {
            Some(callable) => Some(callable.clone()),
            None if !matches!(self.repr(repr).kind, ReprKind::Pointer(_)) => {
                let ptr = self.ptr_to_repr(repr);
                self.repr(ptr).method_by_name(decl.name).cloned()
            }
            None => None,
        };
        match callable {
            Some(callable) => Ok(Synthesized {
                slot: MethodSlot {
                    ty: Some(callable.ty),
                    func: Some(callable.func),
                },
                cacheable: true,
            }),
            None if is_exported(name) => Err(TypeError::MethodNotFound {
                ty: self.type_name(ty),
                method: name.to_owned(),
            }),
            None => {
                tracing::debug!(
                    ty = %self.type_name(ty),
                    method = name,
                    "unexported method has no runtime binding yet"
                );
                Ok(Synthesized {
                    slot: MethodSlot::default(),
                    cacheable: false,
                })
            }
        }
    }

    fn interface_slot(
        &self,
        ty: TypeId,
        index: usize,
        name: &str,
        method: Name,
        repr: ReprId,
    ) -> Result<Synthesized, TypeError> {
        let slot = |func: &FuncRepr| Synthesized {
            slot: MethodSlot {
                ty: Some(add_receiver(repr, func)),
                func: None,
            },
            cacheable: true,
        };

        if let Some(fields) = self.emulated_interface_fields(repr) {
            let field = fields.get(index + INTERFACE_SLOT_OFFSET);
            return match field.map(|f| &self.repr(f.repr).kind) {
                Some(ReprKind::Func(func)) => Ok(slot(func)),
                _ => Err(TypeError::InconsistentInterface {
                    ty: self.type_name(ty),
                    found: self.repr_name(repr),
                }),
            };
        }

        let kind = &self.repr(repr).kind;
        if !matches!(kind, ReprKind::Interface(_)) {
            return Err(TypeError::InconsistentInterface {
                ty: self.type_name(ty),
                found: self.repr_name(repr),
            });
        }
        if !is_exported(name) {
            // Native interfaces do not expose unexported methods.
            return Ok(Synthesized {
                slot: MethodSlot::default(),
                cacheable: true,
            });
        }
        let Some((runtime, func)) = kind.interface_method(method) else {
            return Err(TypeError::InterfaceMethodNotFound {
                ty: self.type_name(ty),
                method: name.to_owned(),
            });
        };
        if runtime != index {
            return Err(TypeError::InterfaceIndexMismatch {
                ty: self.type_name(ty),
                method: name.to_owned(),
                declared: index,
                runtime,
            });
        }
        Ok(slot(func))
    }

    /// Pair a declaration with its runtime slot, checking that the runtime
    /// signature has one parameter more than the declared one when the
    /// declaration has a receiver.
    fn make_method(
        &self,
        ty: TypeId,
        index: usize,
        decl: MethodDecl,
        slot: &MethodSlot,
    ) -> Result<Method, TypeError> {
        if let Some(runtime) = &slot.ty {
            let expected = decl.sig.runtime_arity();
            if runtime.num_in() != expected {
                let receiver = match decl.sig.recv {
                    Some(recv) => format!("receiver <{}>", self.type_name(recv)),
                    None => "no receiver".to_owned(),
                };
                return Err(TypeError::SignatureArityMismatch {
                    ty: self.type_name(ty),
                    index,
                    receiver,
                    declared: decl.sig.params.len(),
                    declared_sig: self.signature_string(&decl.sig),
                    runtime: runtime.num_in(),
                    runtime_sig: self.func_repr_string(runtime),
                });
            }
        }
        Ok(Method {
            name: decl.name,
            pkg: decl.pkg,
            ty: slot.ty.clone().map(|repr| MethodType {
                signature: decl.sig.clone(),
                repr,
            }),
            func: slot.func,
            slot: MethodSlotRef { owner: ty, index },
            index,
            decl,
        })
    }
}

impl fmt::Display for MethodSlotRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}[{}]", self.owner, self.index)
    }
}
