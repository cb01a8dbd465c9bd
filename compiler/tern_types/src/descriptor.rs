//! Per-type runtime descriptors and their method tables.

use crate::repr::FuncRepr;
use crate::{FuncRef, Kind, ReprId, TypeId};

/// The cached runtime half of a resolved method.
///
/// `ty` is `None` for unexported methods of a host-native interface, which
/// have no runtime signature. `func` is `None` for interface methods: those
/// are dispatched through the dynamic value, not through a fixed callable.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MethodSlot {
    pub ty: Option<FuncRepr>,
    pub func: Option<FuncRef>,
}

/// Runtime type descriptor.
///
/// Created lazily by [`TypeUniverse::descriptor`](crate::TypeUniverse::descriptor)
/// and owned by the universe. The method table grows to `NumMethod()` on
/// first resolution; a filled slot is only cleared when its method is
/// rebound to another callable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Descriptor {
    ty: TypeId,
    kind: Kind,
    named: bool,
    repr: ReprId,
    pub(crate) slots: Vec<Option<MethodSlot>>,
}

impl Descriptor {
    pub(crate) fn new(ty: TypeId, kind: Kind, named: bool, repr: ReprId) -> Self {
        Descriptor {
            ty,
            kind,
            named,
            repr,
            slots: Vec::new(),
        }
    }

    pub fn ty(&self) -> TypeId {
        self.ty
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn is_named(&self) -> bool {
        self.named
    }

    pub fn repr(&self) -> ReprId {
        self.repr
    }

    /// Length of the method table.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Number of filled slots.
    pub fn cached_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn slot(&self, index: usize) -> Option<&MethodSlot> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Grow (or shrink) the method table to `count` entries. Filled slots
    /// below `count` are kept.
    pub(crate) fn resize_slots(&mut self, count: usize) {
        if self.slots.len() != count {
            self.slots.resize(count, None);
        }
    }
}
