//! Shared handles to a type universe.
//!
//! A universe used by a single interpreter sits behind `Rc<RefCell>`. One
//! shared between threads sits behind `Arc<RwLock>`, and method resolution
//! takes the read lock for cached slots and the write lock only to
//! synthesize a missing one.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use crate::{Method, TypeError, TypeId, TypeUniverse};

/// How a universe is shared.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct UniverseConfig {
    /// Guard the universe with a lock so it can be used from several threads.
    pub thread_safe: bool,
}

/// Thread-safe mutable universe wrapper.
pub struct SharedUniverse(Arc<parking_lot::RwLock<TypeUniverse>>);

impl SharedUniverse {
    pub fn new(universe: TypeUniverse) -> Self {
        SharedUniverse(Arc::new(parking_lot::RwLock::new(universe)))
    }

    pub fn read(&self) -> parking_lot::RwLockReadGuard<'_, TypeUniverse> {
        self.0.read()
    }

    pub fn write(&self) -> parking_lot::RwLockWriteGuard<'_, TypeUniverse> {
        self.0.write()
    }
}

impl Clone for SharedUniverse {
    fn clone(&self) -> Self {
        SharedUniverse(Arc::clone(&self.0))
    }
}

impl fmt::Debug for SharedUniverse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SharedUniverse({:?})", &*self.0.read())
    }
}

/// Single-threaded universe wrapper.
pub struct LocalUniverse(Rc<RefCell<TypeUniverse>>);

impl LocalUniverse {
    pub fn new(universe: TypeUniverse) -> Self {
        LocalUniverse(Rc::new(RefCell::new(universe)))
    }
}

impl Clone for LocalUniverse {
    fn clone(&self) -> Self {
        LocalUniverse(Rc::clone(&self.0))
    }
}

impl fmt::Debug for LocalUniverse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LocalUniverse({:?})", &*self.0.borrow())
    }
}

/// A universe handle chosen by [`UniverseConfig`].
#[derive(Clone, Debug)]
pub enum UniverseHandle {
    Local(LocalUniverse),
    Shared(SharedUniverse),
}

impl UniverseHandle {
    pub fn new(universe: TypeUniverse, config: UniverseConfig) -> Self {
        if config.thread_safe {
            UniverseHandle::Shared(SharedUniverse::new(universe))
        } else {
            UniverseHandle::Local(LocalUniverse::new(universe))
        }
    }

    pub fn is_thread_safe(&self) -> bool {
        matches!(self, UniverseHandle::Shared(_))
    }

    /// Run `f` with shared access to the universe.
    pub fn read<R>(&self, f: impl FnOnce(&TypeUniverse) -> R) -> R {
        match self {
            UniverseHandle::Local(local) => f(&local.0.borrow()),
            UniverseHandle::Shared(shared) => f(&shared.read()),
        }
    }

    /// Run `f` with exclusive access to the universe.
    pub fn write<R>(&self, f: impl FnOnce(&mut TypeUniverse) -> R) -> R {
        match self {
            UniverseHandle::Local(local) => f(&mut local.0.borrow_mut()),
            UniverseHandle::Shared(shared) => f(&mut shared.write()),
        }
    }

    /// `Method(i)` of `ty`, resolving under the write lock only on a cache miss.
    pub fn method(&self, ty: TypeId, index: usize) -> Result<Method, TypeError> {
        if let Some(cached) = self.read(|u| u.cached_method(ty, index)) {
            return cached;
        }
        // Another thread may have filled the slot between the two locks;
        // `method` checks the cache again under the write lock.
        self.write(|u| u.method(ty, index))
    }
}

#[cfg(test)]
mod tests;
