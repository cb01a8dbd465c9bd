//! Static type declarations.
//!
//! This is the "declared" half of every type: what the program text says.
//! The runtime half lives in [`crate::repr`].

use tern_ir::Name;

use crate::TypeId;

/// Predeclared scalar types.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BasicKind {
    Bool,
    Int,
    Float64,
    String,
}

impl BasicKind {
    pub const fn name(self) -> &'static str {
        match self {
            BasicKind::Bool => "bool",
            BasicKind::Int => "int",
            BasicKind::Float64 => "float64",
            BasicKind::String => "string",
        }
    }
}

/// Coarse classification of a type, after unwrapping names.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    /// A named type whose underlying type has not been set yet.
    Invalid,
    Bool,
    Int,
    Float64,
    String,
    Ptr,
    Slice,
    Func,
    Struct,
    Interface,
}

impl Kind {
    pub const fn name(self) -> &'static str {
        match self {
            Kind::Invalid => "invalid",
            Kind::Bool => "bool",
            Kind::Int => "int",
            Kind::Float64 => "float64",
            Kind::String => "string",
            Kind::Ptr => "ptr",
            Kind::Slice => "slice",
            Kind::Func => "func",
            Kind::Struct => "struct",
            Kind::Interface => "interface",
        }
    }
}

impl From<BasicKind> for Kind {
    fn from(basic: BasicKind) -> Self {
        match basic {
            BasicKind::Bool => Kind::Bool,
            BasicKind::Int => Kind::Int,
            BasicKind::Float64 => Kind::Float64,
            BasicKind::String => Kind::String,
        }
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Declared signature of a function or method.
///
/// `recv` is kept apart from `params`: the runtime view of the same method
/// folds the receiver into the parameter list (see [`crate::add_receiver`]).
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Signature {
    pub recv: Option<TypeId>,
    pub params: Vec<TypeId>,
    pub results: Vec<TypeId>,
    pub variadic: bool,
}

impl Signature {
    pub fn new(params: Vec<TypeId>, results: Vec<TypeId>) -> Self {
        Signature {
            recv: None,
            params,
            results,
            variadic: false,
        }
    }

    #[must_use]
    pub fn with_recv(mut self, recv: TypeId) -> Self {
        self.recv = Some(recv);
        self
    }

    #[must_use]
    pub fn variadic(mut self) -> Self {
        self.variadic = true;
        self
    }

    /// Parameter count of the runtime view: declared params plus the receiver.
    pub fn runtime_arity(&self) -> usize {
        self.params.len() + usize::from(self.recv.is_some())
    }
}

/// A struct field.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FieldDecl {
    pub name: Name,
    pub ty: TypeId,
    /// Anonymous field; its methods are promoted to the enclosing struct.
    pub embedded: bool,
}

/// A declared method: either an interface method or a method of a named type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MethodDecl {
    pub name: Name,
    /// Declaring package, `None` for the session's main package.
    pub pkg: Option<Name>,
    pub sig: Signature,
}

impl MethodDecl {
    pub fn new(name: Name, sig: Signature) -> Self {
        MethodDecl {
            name,
            pkg: None,
            sig,
        }
    }
}

/// Interface declaration with its method sets computed at construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InterfaceData {
    /// Methods written in the interface body, ordered by name.
    pub explicit: Vec<MethodDecl>,
    /// Embedded interfaces, in declaration order.
    pub embedded: Vec<TypeId>,
    /// Explicit plus inherited methods, deduplicated and ordered by name.
    pub all: Vec<MethodDecl>,
}

/// A named (defined) type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NamedData {
    pub name: Name,
    pub pkg: Option<Name>,
    /// Never itself a named type; `None` until `set_underlying`.
    pub underlying: Option<TypeId>,
    /// Explicit methods in declaration order. Their positions are the
    /// method indices handed out by `Method(i)`.
    pub methods: Vec<MethodDecl>,
}

/// A static type declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeData {
    Basic(BasicKind),
    Pointer(TypeId),
    Slice(TypeId),
    Func(Signature),
    Struct(Vec<FieldDecl>),
    Interface(InterfaceData),
    Named(NamedData),
}

/// Whether a method name is visible outside its package.
pub fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}
