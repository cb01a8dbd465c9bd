//! Lexical environments for identifier resolution.
//!
//! A [`Scope`] is one frame of bindings with a link to its parent. Lookup
//! walks from the innermost frame outward and the first binding wins, so
//! inner declarations shadow outer ones.
//!
//! The [`Environment`] keeps a stack of frames for the statement being
//! evaluated. Frames are reference-counted: a closure keeps its defining
//! frame (and through it, every enclosing frame) alive after the stack has
//! popped it.

use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

use tern_ir::{Name, StringInterner};

use crate::Value;

/// Whether a binding can be reassigned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mutability {
    /// Declared with `:=` or as a parameter.
    Mutable,
    /// Declared in a `const` block.
    Immutable,
}

impl Mutability {
    #[inline]
    pub fn is_mutable(self) -> bool {
        matches!(self, Mutability::Mutable)
    }
}

/// Why a binding operation failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BindError {
    /// `true`, `false` and `iota` cannot be bound.
    Reserved,
    /// The binding is a constant.
    Immutable,
    /// No frame binds the name.
    Undefined,
}

/// A single-threaded shared frame handle.
///
/// Wraps `Rc<RefCell<T>>` so that every frame allocation goes through
/// [`LocalScope::new`].
#[repr(transparent)]
pub struct LocalScope<T>(Rc<RefCell<T>>);

impl<T> LocalScope<T> {
    #[inline]
    pub fn new(value: T) -> Self {
        LocalScope(Rc::new(RefCell::new(value)))
    }

    #[inline]
    pub fn borrow(&self) -> std::cell::Ref<'_, T> {
        self.0.borrow()
    }

    #[inline]
    pub fn borrow_mut(&self) -> std::cell::RefMut<'_, T> {
        self.0.borrow_mut()
    }

    /// Whether both handles refer to the same frame.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<T> Clone for LocalScope<T> {
    #[inline]
    fn clone(&self) -> Self {
        LocalScope(Rc::clone(&self.0))
    }
}

impl<T: fmt::Debug> fmt::Debug for LocalScope<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("LocalScope").field(&self.0).finish()
    }
}

impl<T: Default> Default for LocalScope<T> {
    fn default() -> Self {
        LocalScope::new(T::default())
    }
}

impl<T> Deref for LocalScope<T> {
    type Target = RefCell<T>;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// A single frame of bindings.
#[derive(Clone, Debug)]
pub struct Scope {
    bindings: FxHashMap<Name, Binding>,
    parent: Option<LocalScope<Scope>>,
}

#[derive(Clone, Debug)]
struct Binding {
    value: Value,
    mutability: Mutability,
}

impl Scope {
    pub fn new() -> Self {
        Scope {
            bindings: FxHashMap::default(),
            parent: None,
        }
    }

    pub fn with_parent(parent: LocalScope<Scope>) -> Self {
        Scope {
            bindings: FxHashMap::default(),
            parent: Some(parent),
        }
    }

    /// Bind `name` in this frame, replacing a binding of the same name here.
    #[inline]
    pub fn define(&mut self, name: Name, value: Value, mutability: Mutability) {
        self.bindings.insert(name, Binding { value, mutability });
    }

    /// Whether this frame itself binds `name`.
    pub fn binds(&self, name: Name) -> bool {
        self.bindings.contains_key(&name)
    }

    /// Look `name` up here, then in enclosing frames.
    #[inline]
    pub fn lookup(&self, name: Name) -> Option<Value> {
        if let Some(binding) = self.bindings.get(&name) {
            return Some(binding.value.clone());
        }
        if let Some(parent) = &self.parent {
            return parent.borrow().lookup(name);
        }
        None
    }

    /// Update the innermost binding of `name`.
    #[inline]
    pub fn assign(&mut self, name: Name, value: Value) -> Result<(), BindError> {
        if let Some(binding) = self.bindings.get_mut(&name) {
            if !binding.mutability.is_mutable() {
                return Err(BindError::Immutable);
            }
            binding.value = value;
            return Ok(());
        }
        if let Some(parent) = &self.parent {
            return parent.borrow_mut().assign(name, value);
        }
        Err(BindError::Undefined)
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

/// Identifiers resolved before any frame lookup and never bindable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReservedNames {
    pub true_: Name,
    pub false_: Name,
    pub iota: Name,
}

impl ReservedNames {
    pub fn new(interner: &StringInterner) -> Self {
        Self {
            true_: interner.intern("true"),
            false_: interner.intern("false"),
            iota: interner.intern("iota"),
        }
    }

    #[inline]
    pub fn contains(&self, name: Name) -> bool {
        name == self.true_ || name == self.false_ || name == self.iota
    }
}

/// The frame stack of the statement being evaluated.
pub struct Environment {
    /// Current frame on top.
    scopes: Vec<LocalScope<Scope>>,
    /// Package-level frame, shared by every call.
    global: LocalScope<Scope>,
    reserved: ReservedNames,
}

impl Environment {
    pub fn new(interner: &StringInterner) -> Self {
        let global = LocalScope::new(Scope::new());
        Environment {
            scopes: vec![global.clone()],
            global,
            reserved: ReservedNames::new(interner),
        }
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn reserved(&self) -> &ReservedNames {
        &self.reserved
    }

    /// Enter a nested frame.
    #[inline]
    pub fn push_scope(&mut self) {
        let parent = self.current_scope();
        self.scopes.push(LocalScope::new(Scope::with_parent(parent)));
    }

    /// Leave the current frame. The bottom frame is never popped.
    #[inline]
    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Handle to the current frame, for closures to capture.
    #[inline]
    pub fn current_scope(&self) -> LocalScope<Scope> {
        self.scopes.last().unwrap_or(&self.global).clone()
    }

    /// Bind `name` in the current frame.
    #[inline]
    pub fn define(
        &mut self,
        name: Name,
        value: Value,
        mutability: Mutability,
    ) -> Result<(), BindError> {
        if self.reserved.contains(name) {
            return Err(BindError::Reserved);
        }
        self.scopes
            .last()
            .unwrap_or(&self.global)
            .borrow_mut()
            .define(name, value, mutability);
        Ok(())
    }

    #[inline]
    pub fn lookup(&self, name: Name) -> Option<Value> {
        self.scopes
            .last()
            .unwrap_or(&self.global)
            .borrow()
            .lookup(name)
    }

    #[inline]
    pub fn assign(&mut self, name: Name, value: Value) -> Result<(), BindError> {
        if self.reserved.contains(name) {
            return Err(BindError::Reserved);
        }
        self.scopes
            .last()
            .unwrap_or(&self.global)
            .borrow_mut()
            .assign(name, value)
    }

    /// Define a package-level constant.
    pub fn define_global(&mut self, name: Name, value: Value) -> Result<(), BindError> {
        if self.reserved.contains(name) {
            return Err(BindError::Reserved);
        }
        self.global
            .borrow_mut()
            .define(name, value, Mutability::Immutable);
        Ok(())
    }

    /// Environment for a call to a closure that captured `captured`.
    ///
    /// The callee gets one fresh frame whose parent is the captured frame;
    /// the caller's frames are not visible.
    #[must_use]
    pub fn for_call(&self, captured: LocalScope<Scope>) -> Self {
        Environment {
            scopes: vec![LocalScope::new(Scope::with_parent(captured))],
            global: self.global.clone(),
            reserved: self.reserved,
        }
    }
}
