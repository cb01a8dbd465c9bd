//! Names interned once per interpreter so hot paths compare `u32`s.

use tern_ir::{Name, StringInterner};

#[derive(Clone, Copy, Debug)]
pub(crate) struct InternedNames {
    /// `_`, which discards instead of binding.
    pub(crate) blank: Name,
    /// Call frame name for function literals.
    pub(crate) anonymous: Name,
}

impl InternedNames {
    pub(crate) fn new(interner: &StringInterner) -> Self {
        Self {
            blank: interner.intern("_"),
            anonymous: interner.intern("func"),
        }
    }
}
