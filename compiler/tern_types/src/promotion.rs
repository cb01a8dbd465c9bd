//! Method lookup through embedded fields, and interface satisfaction.
//!
//! `Method(i)` only indexes explicitly declared methods. Selecting `x.M`
//! where `M` is promoted from an embedded field goes through
//! [`TypeUniverse::find_method`] instead, which walks embedding depth by
//! depth the way selector resolution does: the shallowest match wins. Two
//! matches at the same depth are ambiguous, and so is one type reached
//! through two embedding paths of the same length.

use rustc_hash::FxHashSet;
use tern_ir::Name;

use crate::decl::TypeData;
use crate::{TypeError, TypeId, TypeUniverse};

/// How to reach a method from the type it was selected on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodPath {
    /// Embedded field indices to follow, outermost first.
    pub fields: Vec<usize>,
    /// Type declaring the method.
    pub owner: TypeId,
    /// Index of the method in `owner`'s method table.
    pub index: usize,
    /// The owner was reached through a pointer, so pointer-receiver methods
    /// are in the selected type's method set.
    pub via_pointer: bool,
}

impl MethodPath {
    pub fn is_promoted(&self) -> bool {
        !self.fields.is_empty()
    }
}

/// One way of reaching a type while searching a depth level.
struct Candidate {
    ty: TypeId,
    fields: Vec<usize>,
    via_pointer: bool,
    /// The type is reached by more than one path at this depth, so any
    /// method found on it or below it is ambiguous.
    multiple: bool,
}

impl TypeUniverse {
    /// Find the method `name` on `ty` or, failing that, on its embedded
    /// fields. Returns `None` if there is no such method or if the shallowest
    /// depth holding one has more than one.
    pub fn find_method(&self, ty: TypeId, name: Name) -> Option<MethodPath> {
        let start = self.strip_pointer(ty);
        let mut level = vec![Candidate {
            ty: start,
            fields: Vec::new(),
            via_pointer: start != ty,
            multiple: false,
        }];
        // named types searched at a shallower depth
        let mut seen = FxHashSet::default();

        while !level.is_empty() {
            let mut found: Option<MethodPath> = None;
            let mut ambiguous = false;
            let mut next = Vec::new();
            let mut reached = Vec::new();

            for candidate in self.merge_repeats(level) {
                let t = candidate.ty;
                if seen.contains(&t) {
                    continue;
                }
                if self.is_named(t) {
                    reached.push(t);
                }
                if let Some(index) = self.method_index(t, name) {
                    if found.is_some() || candidate.multiple {
                        ambiguous = true;
                    } else {
                        found = Some(MethodPath {
                            fields: candidate.fields,
                            owner: t,
                            index,
                            via_pointer: candidate.via_pointer,
                        });
                    }
                    continue;
                }
                if let TypeData::Struct(fields) = self.data(self.underlying(t)) {
                    for (i, field) in fields.iter().enumerate().filter(|(_, f)| f.embedded) {
                        let mut path = candidate.fields.clone();
                        path.push(i);
                        let base = self.strip_pointer(field.ty);
                        next.push(Candidate {
                            ty: base,
                            fields: path,
                            via_pointer: base != field.ty,
                            multiple: candidate.multiple,
                        });
                    }
                }
            }

            if ambiguous {
                tracing::trace!(
                    ty = %self.type_name(ty),
                    name = self.interner().lookup(name),
                    "ambiguous promoted selector"
                );
                return None;
            }
            if found.is_some() {
                return found;
            }
            seen.extend(reached);
            level = next;
        }
        None
    }

    /// Fold candidates reaching the same named type into the first of them,
    /// marked as reached more than once.
    fn merge_repeats(&self, level: Vec<Candidate>) -> Vec<Candidate> {
        let mut merged: Vec<Candidate> = Vec::with_capacity(level.len());
        for candidate in level {
            if self.is_named(candidate.ty) {
                if let Some(first) = merged.iter_mut().find(|c| c.ty == candidate.ty) {
                    first.multiple = true;
                    continue;
                }
            }
            merged.push(candidate);
        }
        merged
    }

    /// Whether the method set of `ty` covers every method of `iface`, with
    /// matching parameter and result counts.
    ///
    /// Pointer-receiver methods only count when `ty` is a pointer or the
    /// method was promoted through an embedded pointer.
    pub fn implements(&self, ty: TypeId, iface: TypeId) -> Result<bool, TypeError> {
        let methods = &self
            .interface_data(iface)
            .ok_or_else(|| TypeError::NotInterface {
                ty: self.type_name(iface),
            })?
            .all;

        for wanted in methods {
            let Some(path) = self.find_method(ty, wanted.name) else {
                return Ok(false);
            };
            let have = self.declared_method(path.owner, path.index)?;
            let pointer_recv = have
                .sig
                .recv
                .is_some_and(|r| matches!(self.data(r), TypeData::Pointer(_)));
            if pointer_recv && !path.via_pointer {
                return Ok(false);
            }
            if have.sig.params.len() != wanted.sig.params.len()
                || have.sig.results.len() != wanted.sig.results.len()
                || have.sig.variadic != wanted.sig.variadic
            {
                return Ok(false);
            }
        }
        Ok(true)
    }
}
