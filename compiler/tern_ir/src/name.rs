//! `Name`: a handle to a string in the [`StringInterner`](crate::StringInterner).
//!
//! Identifiers, labels, type names and string literals all travel through
//! the evaluator as `Name`s, so comparing two of them is one integer compare.
//! The handle is only meaningful together with the interner that issued it.

use std::fmt;

const SHARD_BITS: u32 = 4;
const LOCAL_BITS: u32 = 32 - SHARD_BITS;

/// A 32-bit interned string handle: the interner shard in the high bits,
/// the position within that shard in the rest.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct Name(u32);

impl Name {
    /// The empty string, interned first in every interner.
    pub const EMPTY: Name = Name(0);

    /// Largest position a shard can hand out.
    pub const MAX_LOCAL: u32 = (1 << LOCAL_BITS) - 1;

    pub const NUM_SHARDS: usize = 1 << SHARD_BITS;

    #[inline]
    pub const fn new(shard: u32, local: u32) -> Self {
        debug_assert!((shard as usize) < Self::NUM_SHARDS);
        debug_assert!(local <= Self::MAX_LOCAL);
        Name((shard << LOCAL_BITS) | local)
    }

    #[inline]
    pub const fn shard(self) -> usize {
        (self.0 >> LOCAL_BITS) as usize
    }

    #[inline]
    pub const fn local(self) -> usize {
        (self.0 & Self::MAX_LOCAL) as usize
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({}:{})", self.shard(), self.local())
    }
}

impl Default for Name {
    fn default() -> Self {
        Self::EMPTY
    }
}
