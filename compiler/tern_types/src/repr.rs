//! Runtime representations.
//!
//! Every static type maps to a representation the evaluator can build and
//! call values through. Unnamed representations are interned structurally;
//! named types always get their own. Interfaces declared by interpreted code
//! have no host-native representation and are emulated as a pointer to a
//! struct laid out as:
//!
//! ```text
//! *struct {
//!     Interface  InterfaceHeader          // field 0
//!     Embeddeds  [0]struct { E1; E2 }     // field 1, markers only
//!     M0         func(params) results     // field 2 + i: method slot i
//!     ...
//! }
//! ```

use tern_ir::Name;

use crate::decl::BasicKind;
use crate::{FuncRef, ReprId};

/// Index of the first method slot in an emulated interface struct.
pub const INTERFACE_SLOT_OFFSET: usize = 2;

/// Runtime view of a function type: the receiver, if any, is `params[0]`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct FuncRepr {
    pub params: Vec<ReprId>,
    pub results: Vec<ReprId>,
    pub variadic: bool,
}

impl FuncRepr {
    pub fn num_in(&self) -> usize {
        self.params.len()
    }

    pub fn num_out(&self) -> usize {
        self.results.len()
    }
}

/// Insert `recv` as the first parameter of `func`.
pub fn add_receiver(recv: ReprId, func: &FuncRepr) -> FuncRepr {
    let mut params = Vec::with_capacity(func.params.len() + 1);
    params.push(recv);
    params.extend_from_slice(&func.params);
    FuncRepr {
        params,
        results: func.results.clone(),
        variadic: func.variadic,
    }
}

/// Remove the first parameter of `func`. A parameterless function is returned as is.
pub fn remove_receiver(func: &FuncRepr) -> FuncRepr {
    match func.params.split_first() {
        Some((_, rest)) => FuncRepr {
            params: rest.to_vec(),
            results: func.results.clone(),
            variadic: func.variadic,
        },
        None => func.clone(),
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ReprField {
    pub name: Name,
    pub repr: ReprId,
    pub embedded: bool,
}

/// A method of a host-native interface representation (no receiver).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct InterfaceMethodRepr {
    pub name: Name,
    pub ty: FuncRepr,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ReprKind {
    /// Placeholder while a named representation is being built.
    Invalid,
    Basic(BasicKind),
    /// Header field of an emulated interface.
    InterfaceHeader,
    Pointer(ReprId),
    Slice(ReprId),
    Array { len: usize, elem: ReprId },
    Func(FuncRepr),
    Struct(Vec<ReprField>),
    /// Host-native interface: exported methods ordered by name.
    Interface(Vec<InterfaceMethodRepr>),
}

/// A callable attached to a representation's method set.
///
/// `ty` is the runtime signature with the receiver as first parameter.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Callable {
    pub ty: FuncRepr,
    pub func: FuncRef,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReprData {
    /// Display name for named representations.
    pub name: Option<String>,
    pub kind: ReprKind,
    /// Bound methods, looked up by name.
    pub methods: Vec<(Name, Callable)>,
}

impl ReprData {
    pub(crate) fn unnamed(kind: ReprKind) -> Self {
        ReprData {
            name: None,
            kind,
            methods: Vec::new(),
        }
    }

    pub fn method_by_name(&self, name: Name) -> Option<&Callable> {
        self.methods
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, callable)| callable)
    }
}

impl ReprKind {
    /// For a native interface: the method named `name` and its position.
    pub fn interface_method(&self, name: Name) -> Option<(usize, &FuncRepr)> {
        match self {
            ReprKind::Interface(methods) => methods
                .iter()
                .enumerate()
                .find(|(_, m)| m.name == name)
                .map(|(i, m)| (i, &m.ty)),
            _ => None,
        }
    }
}
