//! The type universe: owner of every declaration, representation and descriptor.
//!
//! A universe belongs to an interpreter session (or to several, through
//! [`SharedUniverse`](crate::SharedUniverse)). It maps each static declaration
//! to its runtime representation and keeps one [`Descriptor`] per type that
//! has been asked for methods.
//!
//! # Design
//!
//! - Static declarations live in a flat `Vec` indexed by [`TypeId`]; pointer,
//!   slice and basic types are interned so `pointer_to(T)` is stable.
//! - Representations live in a second `Vec` indexed by [`ReprId`]; unnamed
//!   ones are interned structurally, named ones are always fresh.
//! - A named type's underlying type is never itself named, so unwrapping a
//!   name is a single step.

use rustc_hash::FxHashMap;
use tern_ir::{Name, SharedInterner, StringInterner};

use crate::decl::{
    is_exported, BasicKind, FieldDecl, InterfaceData, Kind, MethodDecl, NamedData, Signature,
    TypeData,
};
use crate::descriptor::Descriptor;
use crate::repr::{
    add_receiver, Callable, FuncRepr, InterfaceMethodRepr, ReprData, ReprField, ReprKind,
};
use crate::{FuncRef, ReprId, TypeError, TypeId};

/// Counters describing how much work the universe has done.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct UniverseStats {
    /// Descriptors created.
    pub descriptors: usize,
    /// Method slots synthesized and stored in a descriptor's table.
    pub slots_synthesized: usize,
}

/// Registry of all types known to an interpreter session.
pub struct TypeUniverse {
    interner: SharedInterner,
    pub(crate) types: Vec<TypeData>,
    basics: FxHashMap<BasicKind, TypeId>,
    pointers: FxHashMap<TypeId, TypeId>,
    slices: FxHashMap<TypeId, TypeId>,
    named: FxHashMap<Name, TypeId>,
    pub(crate) reprs: Vec<ReprData>,
    repr_intern: FxHashMap<ReprKind, ReprId>,
    repr_by_type: FxHashMap<TypeId, ReprId>,
    pub(crate) descriptors: FxHashMap<TypeId, Descriptor>,
    next_func: usize,
    pub(crate) stats: UniverseStats,
}

impl TypeUniverse {
    /// Create an empty universe resolving names through `interner`.
    pub fn new(interner: SharedInterner) -> Self {
        TypeUniverse {
            interner,
            types: Vec::new(),
            basics: FxHashMap::default(),
            pointers: FxHashMap::default(),
            slices: FxHashMap::default(),
            named: FxHashMap::default(),
            reprs: Vec::new(),
            repr_intern: FxHashMap::default(),
            repr_by_type: FxHashMap::default(),
            descriptors: FxHashMap::default(),
            next_func: 0,
            stats: UniverseStats::default(),
        }
    }

    pub fn interner(&self) -> &StringInterner {
        &self.interner
    }

    pub fn stats(&self) -> UniverseStats {
        self.stats
    }

    /// The static declaration of `ty`.
    #[inline]
    pub fn data(&self, ty: TypeId) -> &TypeData {
        &self.types[ty.index()]
    }

    /// The runtime representation data for `repr`.
    #[inline]
    pub fn repr(&self, repr: ReprId) -> &ReprData {
        &self.reprs[repr.index()]
    }

    /// Descriptor of `ty`, if one was already created.
    pub fn peek_descriptor(&self, ty: TypeId) -> Option<&Descriptor> {
        self.descriptors.get(&ty)
    }

    /// Allocate a fresh callable handle.
    pub fn alloc_func(&mut self) -> FuncRef {
        let func = FuncRef::from_index(self.next_func);
        self.next_func += 1;
        func
    }

    fn push_type(&mut self, data: TypeData) -> TypeId {
        let id = TypeId::from_index(self.types.len());
        self.types.push(data);
        id
    }

    // Constructors

    pub fn basic(&mut self, kind: BasicKind) -> TypeId {
        if let Some(&ty) = self.basics.get(&kind) {
            return ty;
        }
        let ty = self.push_type(TypeData::Basic(kind));
        self.basics.insert(kind, ty);
        ty
    }

    pub fn pointer_to(&mut self, elem: TypeId) -> TypeId {
        if let Some(&ty) = self.pointers.get(&elem) {
            return ty;
        }
        let ty = self.push_type(TypeData::Pointer(elem));
        self.pointers.insert(elem, ty);
        ty
    }

    pub fn slice_of(&mut self, elem: TypeId) -> TypeId {
        if let Some(&ty) = self.slices.get(&elem) {
            return ty;
        }
        let ty = self.push_type(TypeData::Slice(elem));
        self.slices.insert(elem, ty);
        ty
    }

    pub fn func_of(&mut self, sig: Signature) -> TypeId {
        self.push_type(TypeData::Func(sig))
    }

    pub fn struct_of(&mut self, fields: Vec<FieldDecl>) -> TypeId {
        self.push_type(TypeData::Struct(fields))
    }

    /// Declare an interface from its explicit methods and embedded interfaces.
    ///
    /// The complete method set is computed here, once: embedded interfaces
    /// must already be complete. Explicit methods get the new interface as
    /// their receiver.
    pub fn interface_of(
        &mut self,
        explicit: Vec<MethodDecl>,
        embedded: Vec<TypeId>,
    ) -> Result<TypeId, TypeError> {
        let id = TypeId::from_index(self.types.len());

        let mut explicit: Vec<MethodDecl> = explicit
            .into_iter()
            .map(|mut m| {
                m.sig.recv = Some(id);
                m
            })
            .collect();
        self.sort_by_name(&mut explicit);

        let mut all = explicit.clone();
        for &e in &embedded {
            let TypeData::Interface(inner) = self.data(self.underlying(e)) else {
                return Err(TypeError::EmbeddedNotInterface {
                    ty: self.describe_interface(&explicit),
                    embedded: self.type_name(e),
                });
            };
            for m in &inner.all {
                if !all.iter().any(|existing| existing.name == m.name) {
                    all.push(m.clone());
                }
            }
        }
        self.sort_by_name(&mut all);

        Ok(self.push_type(TypeData::Interface(InterfaceData {
            explicit,
            embedded,
            all,
        })))
    }

    fn sort_by_name(&self, methods: &mut [MethodDecl]) {
        methods.sort_by(|a, b| {
            self.interner
                .lookup(a.name)
                .cmp(self.interner.lookup(b.name))
        });
    }

    fn describe_interface(&self, explicit: &[MethodDecl]) -> String {
        let names: Vec<&str> = explicit
            .iter()
            .map(|m| self.interner.lookup(m.name))
            .collect();
        format!("interface{{{}}}", names.join("; "))
    }

    /// Declare a named type. Its underlying type is set separately so that
    /// recursive declarations can refer to the name first.
    pub fn declare_named(&mut self, name: Name, pkg: Option<Name>) -> Result<TypeId, TypeError> {
        if self.named.contains_key(&name) {
            return Err(TypeError::DuplicateType {
                name: self.interner.lookup(name).to_owned(),
            });
        }
        let ty = self.push_type(TypeData::Named(NamedData {
            name,
            pkg,
            underlying: None,
            methods: Vec::new(),
        }));
        self.named.insert(name, ty);
        Ok(ty)
    }

    /// Set the underlying type of a named type.
    ///
    /// A named `underlying` is unwrapped to its own underlying type, so the
    /// stored underlying type is never named.
    pub fn set_underlying(&mut self, named: TypeId, underlying: TypeId) -> Result<(), TypeError> {
        if named == underlying {
            return Err(TypeError::SelfUnderlying {
                ty: self.type_name(named),
            });
        }
        let resolved = match self.data(underlying) {
            TypeData::Named(inner) => inner.underlying.ok_or_else(|| TypeError::IncompleteType {
                ty: self.type_name(underlying),
            })?,
            _ => underlying,
        };
        let ty_name = self.type_name(named);
        match &mut self.types[named.index()] {
            TypeData::Named(data) if data.underlying.is_some() => {
                Err(TypeError::UnderlyingAlreadySet { ty: ty_name })
            }
            TypeData::Named(data) => {
                data.underlying = Some(resolved);
                Ok(())
            }
            _ => Err(TypeError::NotNamed { ty: ty_name }),
        }
    }

    /// Add an explicit method to a named type, returning its stable index.
    ///
    /// A declaration without a receiver gets the named type as value receiver.
    pub fn add_method(&mut self, named: TypeId, mut decl: MethodDecl) -> Result<usize, TypeError> {
        let TypeData::Named(data) = self.data(named) else {
            return Err(TypeError::NotNamed {
                ty: self.type_name(named),
            });
        };
        if let Some(u) = data.underlying {
            let kind = self.kind_of(u);
            if matches!(kind, Kind::Interface | Kind::Ptr) {
                return Err(TypeError::InvalidMethodOwner {
                    ty: self.type_name(named),
                    kind,
                });
            }
        }
        if data.methods.iter().any(|m| m.name == decl.name) {
            return Err(TypeError::DuplicateMethod {
                ty: self.type_name(named),
                method: self.interner.lookup(decl.name).to_owned(),
            });
        }
        let recv = *decl.sig.recv.get_or_insert(named);
        let valid_recv =
            recv == named || matches!(self.data(recv), TypeData::Pointer(elem) if *elem == named);
        if !valid_recv {
            return Err(TypeError::InvalidReceiver {
                ty: self.type_name(named),
                method: self.interner.lookup(decl.name).to_owned(),
                receiver: self.type_name(recv),
            });
        }

        let TypeData::Named(data) = &mut self.types[named.index()] else {
            unreachable!("checked above");
        };
        data.methods.push(decl);
        Ok(data.methods.len() - 1)
    }

    pub fn lookup_named(&self, name: Name) -> Option<TypeId> {
        self.named.get(&name).copied()
    }

    // Queries

    /// The underlying type: itself for unnamed types and incomplete named types.
    pub fn underlying(&self, ty: TypeId) -> TypeId {
        match self.data(ty) {
            TypeData::Named(named) => named.underlying.unwrap_or(ty),
            _ => ty,
        }
    }

    pub fn is_named(&self, ty: TypeId) -> bool {
        matches!(self.data(ty), TypeData::Named(_))
    }

    pub fn kind_of(&self, ty: TypeId) -> Kind {
        match self.data(self.underlying(ty)) {
            TypeData::Basic(basic) => Kind::from(*basic),
            TypeData::Pointer(_) => Kind::Ptr,
            TypeData::Slice(_) => Kind::Slice,
            TypeData::Func(_) => Kind::Func,
            TypeData::Struct(_) => Kind::Struct,
            TypeData::Interface(_) => Kind::Interface,
            TypeData::Named(_) => Kind::Invalid,
        }
    }

    pub(crate) fn interface_data(&self, ty: TypeId) -> Option<&InterfaceData> {
        match self.data(self.underlying(ty)) {
            TypeData::Interface(iface) => Some(iface),
            _ => None,
        }
    }

    /// For interfaces, the *total* number of methods including those of
    /// embedded interfaces. For other named types, the number of explicitly
    /// declared methods, ignoring methods promoted from embedded fields.
    /// Zero for other unnamed types.
    pub fn num_method(&self, ty: TypeId) -> usize {
        if let Some(iface) = self.interface_data(ty) {
            iface.all.len()
        } else if let TypeData::Named(named) = self.data(ty) {
            named.methods.len()
        } else {
            0
        }
    }

    /// The number of explicitly declared methods of a named type or
    /// interface. Methods of embedded fields or embedded interfaces are not
    /// counted.
    pub fn num_explicit_method(&self, ty: TypeId) -> usize {
        if let Some(iface) = self.interface_data(ty) {
            iface.explicit.len()
        } else if let TypeData::Named(named) = self.data(ty) {
            named.methods.len()
        } else {
            0
        }
    }

    /// The *total* number of methods reachable from `ty`, including methods
    /// promoted from embedded fields (recursively) and embedded interfaces.
    pub fn num_all_method(&self, ty: TypeId) -> usize {
        let mut expanding = Vec::new();
        self.count_all_methods(ty, &mut expanding)
    }

    fn count_all_methods(&self, ty: TypeId, expanding: &mut Vec<TypeId>) -> usize {
        match self.data(ty) {
            TypeData::Named(named) => {
                // `type S struct { *S }` is legal; count each name once per path.
                if expanding.contains(&ty) {
                    return 0;
                }
                expanding.push(ty);
                let mut count = named.methods.len();
                if let Some(u) = named.underlying.filter(|&u| u != ty) {
                    count += self.count_all_methods(u, expanding);
                }
                expanding.pop();
                count
            }
            TypeData::Interface(iface) => iface.all.len(),
            TypeData::Struct(fields) => fields
                .iter()
                .filter(|f| f.embedded)
                .map(|f| self.count_all_methods(self.strip_pointer(f.ty), expanding))
                .sum(),
            _ => 0,
        }
    }

    /// `T` for `*T`, otherwise `ty` itself.
    pub fn strip_pointer(&self, ty: TypeId) -> TypeId {
        match self.data(ty) {
            TypeData::Pointer(elem) => *elem,
            _ => ty,
        }
    }

    // Runtime representations

    fn push_repr(&mut self, data: ReprData) -> ReprId {
        let id = ReprId::from_index(self.reprs.len());
        self.reprs.push(data);
        id
    }

    fn intern_repr(&mut self, kind: ReprKind) -> ReprId {
        if let Some(&repr) = self.repr_intern.get(&kind) {
            return repr;
        }
        let repr = self.push_repr(ReprData::unnamed(kind.clone()));
        self.repr_intern.insert(kind, repr);
        repr
    }

    /// Pointer representation of `repr`.
    pub fn ptr_to_repr(&mut self, repr: ReprId) -> ReprId {
        self.intern_repr(ReprKind::Pointer(repr))
    }

    /// Runtime representation of `ty`, built on first request.
    pub fn repr_of(&mut self, ty: TypeId) -> Result<ReprId, TypeError> {
        if let Some(&repr) = self.repr_by_type.get(&ty) {
            return Ok(repr);
        }
        let repr = match self.data(ty).clone() {
            TypeData::Named(named) => return self.named_repr(ty, &named),
            TypeData::Basic(basic) => self.intern_repr(ReprKind::Basic(basic)),
            TypeData::Pointer(elem) => {
                let elem = self.repr_of(elem)?;
                self.intern_repr(ReprKind::Pointer(elem))
            }
            TypeData::Slice(elem) => {
                let elem = self.repr_of(elem)?;
                self.intern_repr(ReprKind::Slice(elem))
            }
            TypeData::Func(sig) => {
                let func = self.func_repr_of(&sig)?;
                self.intern_repr(ReprKind::Func(func))
            }
            TypeData::Struct(fields) => {
                let mut repr_fields = Vec::with_capacity(fields.len());
                for field in &fields {
                    repr_fields.push(ReprField {
                        name: field.name,
                        repr: self.repr_of(field.ty)?,
                        embedded: field.embedded,
                    });
                }
                self.intern_repr(ReprKind::Struct(repr_fields))
            }
            TypeData::Interface(iface) => self.emulate_interface(&iface)?,
        };
        self.repr_by_type.insert(ty, repr);
        Ok(repr)
    }

    fn named_repr(&mut self, ty: TypeId, named: &NamedData) -> Result<ReprId, TypeError> {
        let underlying = named.underlying.ok_or_else(|| TypeError::IncompleteType {
            ty: self.type_name(ty),
        })?;
        // Registered before the underlying type so self-references resolve.
        let repr = self.push_repr(ReprData {
            name: Some(self.type_name(ty)),
            kind: ReprKind::Invalid,
            methods: Vec::new(),
        });
        self.repr_by_type.insert(ty, repr);
        match self.repr_of(underlying) {
            Ok(u) => {
                self.reprs[repr.index()].kind = self.reprs[u.index()].kind.clone();
                Ok(repr)
            }
            Err(e) => {
                self.repr_by_type.remove(&ty);
                Err(e)
            }
        }
    }

    /// Build the emulated representation of an interface declared by
    /// interpreted code.
    fn emulate_interface(&mut self, iface: &InterfaceData) -> Result<ReprId, TypeError> {
        let header = self.intern_repr(ReprKind::InterfaceHeader);

        let mut markers = Vec::with_capacity(iface.embedded.len());
        for &e in &iface.embedded {
            let name = match self.data(e) {
                TypeData::Named(named) => named.name,
                _ => Name::EMPTY,
            };
            markers.push(ReprField {
                name,
                repr: self.repr_of(e)?,
                embedded: true,
            });
        }
        let markers = self.intern_repr(ReprKind::Struct(markers));
        let embeddeds = self.intern_repr(ReprKind::Array {
            len: 0,
            elem: markers,
        });

        let mut fields = vec![
            ReprField {
                name: self.interner.intern("Interface"),
                repr: header,
                embedded: false,
            },
            ReprField {
                name: self.interner.intern("Embeddeds"),
                repr: embeddeds,
                embedded: false,
            },
        ];
        for method in &iface.all {
            let func = self.func_repr_of(&method.sig)?;
            fields.push(ReprField {
                name: method.name,
                repr: self.intern_repr(ReprKind::Func(func)),
                embedded: false,
            });
        }
        let body = self.intern_repr(ReprKind::Struct(fields));
        Ok(self.intern_repr(ReprKind::Pointer(body)))
    }

    /// If `repr` is an emulated interface, the fields of its struct.
    pub(crate) fn emulated_interface_fields(&self, repr: ReprId) -> Option<&[ReprField]> {
        let ReprKind::Pointer(body) = &self.repr(repr).kind else {
            return None;
        };
        let ReprKind::Struct(fields) = &self.repr(*body).kind else {
            return None;
        };
        let first = fields.first()?;
        matches!(self.repr(first.repr).kind, ReprKind::InterfaceHeader).then_some(fields.as_slice())
    }

    /// Runtime view of a declared signature, without its receiver.
    pub fn func_repr_of(&mut self, sig: &Signature) -> Result<FuncRepr, TypeError> {
        let mut params = Vec::with_capacity(sig.params.len());
        for &p in &sig.params {
            params.push(self.repr_of(p)?);
        }
        let mut results = Vec::with_capacity(sig.results.len());
        for &r in &sig.results {
            results.push(self.repr_of(r)?);
        }
        Ok(FuncRepr {
            params,
            results,
            variadic: sig.variadic,
        })
    }

    /// Give an interface type a host-native representation built from its
    /// declaration: exported methods only, ordered by name.
    pub fn register_native_interface(&mut self, ty: TypeId) -> Result<ReprId, TypeError> {
        let iface = self
            .interface_data(ty)
            .cloned()
            .ok_or_else(|| TypeError::NotInterface {
                ty: self.type_name(ty),
            })?;
        let mut methods = Vec::with_capacity(iface.all.len());
        for m in &iface.all {
            if is_exported(self.interner.lookup(m.name)) {
                methods.push(InterfaceMethodRepr {
                    name: m.name,
                    ty: self.func_repr_of(&m.sig)?,
                });
            }
        }
        self.register_native_interface_with(ty, methods)
    }

    /// Give an interface type a host-native representation with exactly the
    /// given methods (sorted by name here).
    pub fn register_native_interface_with(
        &mut self,
        ty: TypeId,
        mut methods: Vec<InterfaceMethodRepr>,
    ) -> Result<ReprId, TypeError> {
        if self.interface_data(ty).is_none() {
            return Err(TypeError::NotInterface {
                ty: self.type_name(ty),
            });
        }
        if self.repr_by_type.contains_key(&ty) {
            return Err(TypeError::ReprAlreadyBuilt {
                ty: self.type_name(ty),
            });
        }
        methods.sort_by(|a, b| {
            self.interner
                .lookup(a.name)
                .cmp(self.interner.lookup(b.name))
        });
        let name = self.is_named(ty).then(|| self.type_name(ty));
        let repr = self.push_repr(ReprData {
            name,
            kind: ReprKind::Interface(methods),
            methods: Vec::new(),
        });
        self.repr_by_type.insert(ty, repr);
        tracing::debug!(ty = %self.type_name(ty), ?repr, "registered native interface");
        Ok(repr)
    }

    /// Attach the implementation of a declared method to the receiver's
    /// representation: the named type's for value receivers, its pointer's
    /// for pointer receivers.
    pub fn bind_method(
        &mut self,
        named: TypeId,
        name: Name,
        func: FuncRef,
    ) -> Result<Callable, TypeError> {
        let TypeData::Named(data) = self.data(named) else {
            return Err(TypeError::NotNamed {
                ty: self.type_name(named),
            });
        };
        let decl = data
            .methods
            .iter()
            .find(|m| m.name == name)
            .cloned()
            .ok_or_else(|| TypeError::UndeclaredMethod {
                ty: self.type_name(named),
                method: self.interner.lookup(name).to_owned(),
            })?;
        let recv = decl.sig.recv.unwrap_or(named);
        let recv_repr = self.repr_of(recv)?;
        let func_repr = self.func_repr_of(&decl.sig)?;
        let callable = Callable {
            ty: add_receiver(recv_repr, &func_repr),
            func,
        };
        self.bind_callable(recv_repr, name, callable.clone());
        Ok(callable)
    }

    /// Attach a callable to a representation's method set, replacing any
    /// callable already bound under `name`. Method slots already resolved to
    /// the replaced callable are dropped and resolve again on next use.
    pub fn bind_callable(&mut self, repr: ReprId, name: Name, callable: Callable) {
        let methods = &mut self.reprs[repr.index()].methods;
        if let Some(slot) = methods.iter_mut().find(|(n, _)| *n == name) {
            let replaced = std::mem::replace(&mut slot.1, callable);
            self.forget_slots(replaced.func);
        } else {
            methods.push((name, callable));
        }
    }

    fn forget_slots(&mut self, func: FuncRef) {
        for descriptor in self.descriptors.values_mut() {
            for slot in &mut descriptor.slots {
                if slot.as_ref().is_some_and(|s| s.func == Some(func)) {
                    tracing::debug!(?func, "dropped method slot of rebound callable");
                    *slot = None;
                }
            }
        }
    }

    // Descriptors

    /// Descriptor of `ty`, created on first request.
    pub fn descriptor(&mut self, ty: TypeId) -> Result<&Descriptor, TypeError> {
        if !self.descriptors.contains_key(&ty) {
            let kind = self.kind_of(ty);
            if kind == Kind::Invalid {
                return Err(TypeError::IncompleteType {
                    ty: self.type_name(ty),
                });
            }
            let repr = self.repr_of(ty)?;
            let named = self.is_named(ty);
            tracing::debug!(ty = %self.type_name(ty), %kind, ?repr, "created type descriptor");
            self.descriptors
                .insert(ty, Descriptor::new(ty, kind, named, repr));
            self.stats.descriptors += 1;
        }
        Ok(&self.descriptors[&ty])
    }
}

impl std::fmt::Debug for TypeUniverse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeUniverse")
            .field("types", &self.types.len())
            .field("reprs", &self.reprs.len())
            .field("descriptors", &self.descriptors.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests;
