//! Runtime type universe for the Tern interpreter.
//!
//! Types are declared statically ([`TypeData`]) and mapped lazily to runtime
//! representations ([`ReprData`]). Method queries follow three counting
//! rules:
//!
//! - [`TypeUniverse::num_method`]: all methods of an interface, or the
//!   explicit methods of any other named type.
//! - [`TypeUniverse::num_explicit_method`]: explicit methods only.
//! - [`TypeUniverse::num_all_method`]: everything reachable, including
//!   methods promoted from embedded fields.
//!
//! [`TypeUniverse::method`] resolves the i-th method and caches its runtime
//! slot in the type's [`Descriptor`].

mod decl;
mod descriptor;
mod error;
mod format;
mod idx;
mod method;
mod promotion;
mod repr;
mod shared;
mod universe;

pub use decl::{
    is_exported, BasicKind, FieldDecl, InterfaceData, Kind, MethodDecl, NamedData, Signature,
    TypeData,
};
pub use descriptor::{Descriptor, MethodSlot};
pub use error::TypeError;
pub use idx::{FuncRef, ReprId, TypeId};
pub use method::{Method, MethodSlotRef, MethodType};
pub use promotion::MethodPath;
pub use repr::{
    add_receiver, remove_receiver, Callable, FuncRepr, InterfaceMethodRepr, ReprData, ReprField,
    ReprKind, INTERFACE_SLOT_OFFSET,
};
pub use shared::{LocalUniverse, SharedUniverse, UniverseConfig, UniverseHandle};
pub use universe::{TypeUniverse, UniverseStats};
