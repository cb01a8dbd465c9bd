//! RAII frame guard for the interpreter's environment.
//!
//! [`ScopedInterpreter`] pushes a frame when created and pops it when
//! dropped, including during unwinding and on early `?` returns. It holds
//! the whole `&mut Interpreter` and derefs to it, so code inside the frame
//! calls interpreter methods directly.
//!
//! ```text
//! interpreter.with_env_scope(|scoped| {
//!     scoped.bind(name, value, Mutability::Mutable)?;
//!     scoped.eval_stmt(body)
//! })
//! ```

use std::ops::{Deref, DerefMut};

use super::Interpreter;

/// Interpreter inside a nested frame. The frame is popped on drop.
pub struct ScopedInterpreter<'guard, 'interp> {
    interpreter: &'guard mut Interpreter<'interp>,
}

impl Drop for ScopedInterpreter<'_, '_> {
    fn drop(&mut self) {
        self.interpreter.env.pop_scope();
    }
}

impl<'interp> Deref for ScopedInterpreter<'_, 'interp> {
    type Target = Interpreter<'interp>;

    fn deref(&self) -> &Self::Target {
        self.interpreter
    }
}

impl DerefMut for ScopedInterpreter<'_, '_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.interpreter
    }
}

impl<'a> Interpreter<'a> {
    /// Enter a nested frame, left when the guard is dropped.
    pub fn scoped(&mut self) -> ScopedInterpreter<'_, 'a> {
        self.env.push_scope();
        ScopedInterpreter { interpreter: self }
    }

    /// Run `f` inside a nested frame.
    pub fn with_env_scope<T, F>(&mut self, f: F) -> T
    where
        F: FnOnce(&mut ScopedInterpreter<'_, 'a>) -> T,
    {
        let mut scoped = self.scoped();
        f(&mut scoped)
    }
}

#[cfg(test)]
mod tests {
    use crate::environment::Mutability;
    use crate::{Interpreter, Value};
    use pretty_assertions::assert_eq;
    use tern_ir::{SharedInterner, SyntaxArena};

    #[test]
    fn frame_popped_on_drop() {
        let interner = SharedInterner::default();
        let arena = SyntaxArena::new();
        let mut interp = Interpreter::new(&interner, &arena);
        let x = interner.intern("x");

        let depth = interp.env.depth();
        {
            let mut scoped = interp.scoped();
            assert!(scoped.env.define(x, Value::int(1), Mutability::Mutable).is_ok());
            assert_eq!(scoped.env.depth(), depth + 1);
        }
        assert_eq!(interp.env.depth(), depth);
        assert_eq!(interp.env.lookup(x), None);
    }

    #[test]
    fn frame_popped_on_early_error() {
        let interner = SharedInterner::default();
        let arena = SyntaxArena::new();
        let mut interp = Interpreter::new(&interner, &arena);
        let depth = interp.env.depth();

        let result: Result<(), &str> = interp.with_env_scope(|scoped| {
            scoped.with_env_scope(|_| Err::<(), _>("stop"))?;
            Ok(())
        });
        assert_eq!(result, Err("stop"));
        assert_eq!(interp.env.depth(), depth);
    }
}
