//! Compact handles into the universe's tables.

use std::fmt;

macro_rules! define_idx {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u32);

        impl $name {
            #[inline]
            pub(crate) fn from_index(index: usize) -> Self {
                Self(u32::try_from(index).unwrap_or_else(|_| {
                    panic!(concat!($label, " table exceeded {} entries"), u32::MAX)
                }))
            }

            /// Position in the owning table.
            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($label, "#{}"), self.0)
            }
        }
    };
}

define_idx!(
    /// A static type declaration registered in a `TypeUniverse`.
    TypeId,
    "TypeId"
);

define_idx!(
    /// A runtime representation owned by a `TypeUniverse`.
    ReprId,
    "ReprId"
);

define_idx!(
    /// Opaque handle to a callable implementation.
    ///
    /// The universe only hands these out; whoever bound the callable (the
    /// evaluator's function table) maps it back to code.
    FuncRef,
    "FuncRef"
);
