//! Structural errors of the type universe.
//!
//! These signal a defect in how a type was declared or how its runtime
//! representation was built, never a mistake in interpreted code that the
//! program could recover from. Every variant carries the type's display name
//! and enough detail to locate the inconsistency.

use crate::Kind;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TypeError {
    #[error("Method({index}) of {kind} type <{ty}>: invoke Method() on the pointed-to type instead")]
    MethodOnPointer { ty: String, kind: Kind, index: usize },

    #[error("Method({index}) of {kind} type <{ty}> that cannot have methods")]
    CannotHaveMethods { ty: String, kind: Kind, index: usize },

    #[error("type <{ty}>: method index {index} out of range, type has {count} methods")]
    MethodIndexOutOfRange {
        ty: String,
        index: usize,
        count: usize,
    },

    #[error("inconsistent interface type <{ty}>: expecting interface representation, found <{found}>")]
    InconsistentInterface { ty: String, found: String },

    #[error("interface type <{ty}>: runtime method {method:?} not found")]
    InterfaceMethodNotFound { ty: String, method: String },

    #[error(
        "inconsistent interface type <{ty}>: method {method:?} has declared index={declared} but runtime index={runtime}"
    )]
    InterfaceIndexMismatch {
        ty: String,
        method: String,
        declared: usize,
        runtime: usize,
    },

    #[error("type <{ty}>: runtime method {method:?} not found")]
    MethodNotFound { ty: String, method: String },

    #[error(
        "type <{ty}>: inconsistent {index}-th method signature:\n\tdeclared {receiver} and {declared} parameters: {declared_sig}\n\truntime has {runtime} parameters: {runtime_sig}"
    )]
    SignatureArityMismatch {
        ty: String,
        index: usize,
        /// "receiver <T>" or "no receiver".
        receiver: String,
        declared: usize,
        declared_sig: String,
        runtime: usize,
        runtime_sig: String,
    },

    #[error("type <{ty}> is incomplete: underlying type not set")]
    IncompleteType { ty: String },

    #[error("type <{ty}> is not a named type")]
    NotNamed { ty: String },

    #[error("type <{ty}> is not an interface")]
    NotInterface { ty: String },

    #[error("a type named {name:?} is already declared")]
    DuplicateType { name: String },

    #[error("underlying type of <{ty}> is already set")]
    UnderlyingAlreadySet { ty: String },

    #[error("<{ty}> cannot be its own underlying type")]
    SelfUnderlying { ty: String },

    #[error("cannot declare methods on <{ty}>: underlying type is {kind}")]
    InvalidMethodOwner { ty: String, kind: Kind },

    #[error("type <{ty}> already has a method named {method:?}")]
    DuplicateMethod { ty: String, method: String },

    #[error("type <{ty}> has no declared method named {method:?}")]
    UndeclaredMethod { ty: String, method: String },

    #[error("method {method:?} has receiver <{receiver}>, expecting <{ty}> or <*{ty}>")]
    InvalidReceiver {
        ty: String,
        method: String,
        receiver: String,
    },

    #[error("interface <{ty}> embeds non-interface type <{embedded}>")]
    EmbeddedNotInterface { ty: String, embedded: String },

    #[error("runtime representation of <{ty}> is already built")]
    ReprAlreadyBuilt { ty: String },
}
