//! `InterpreterBuilder` for configuring an [`Interpreter`].

use rustc_hash::FxHashMap;
use tern_ir::{SharedInterner, SyntaxArena};
use tern_types::{TypeUniverse, UniverseConfig, UniverseHandle};

use super::interned_names::InternedNames;
use super::Interpreter;
use crate::diagnostics::CallStack;
use crate::environment::Environment;

/// Builder for [`Interpreter`] instances.
///
/// Defaults: a fresh environment, a fresh universe chosen by
/// [`UniverseConfig::default`] (single-threaded), unlimited call depth.
pub struct InterpreterBuilder<'a> {
    interner: &'a SharedInterner,
    arena: &'a SyntaxArena,
    env: Option<Environment>,
    universe: Option<UniverseHandle>,
    universe_config: UniverseConfig,
    max_call_depth: Option<usize>,
}

impl<'a> InterpreterBuilder<'a> {
    pub fn new(interner: &'a SharedInterner, arena: &'a SyntaxArena) -> Self {
        Self {
            interner,
            arena,
            env: None,
            universe: None,
            universe_config: UniverseConfig::default(),
            max_call_depth: None,
        }
    }

    /// Set the initial environment. It must use the builder's interner.
    #[must_use]
    pub fn env(mut self, env: Environment) -> Self {
        self.env = Some(env);
        self
    }

    /// Use an existing universe, e.g. one shared with other sessions.
    ///
    /// Overrides [`universe_config`](Self::universe_config).
    #[must_use]
    pub fn universe(mut self, universe: UniverseHandle) -> Self {
        self.universe = Some(universe);
        self
    }

    /// Concurrency policy for the universe created by `build`.
    #[must_use]
    pub fn universe_config(mut self, config: UniverseConfig) -> Self {
        self.universe_config = config;
        self
    }

    /// Limit interpreted call depth. `None` lets the host stack grow.
    #[must_use]
    pub fn max_call_depth(mut self, depth: Option<usize>) -> Self {
        self.max_call_depth = depth;
        self
    }

    pub fn build(self) -> Interpreter<'a> {
        let interner = self.interner;
        let universe = self.universe.unwrap_or_else(|| {
            UniverseHandle::new(TypeUniverse::new(interner.clone()), self.universe_config)
        });
        Interpreter {
            interner: &**interner,
            arena: self.arena,
            env: self.env.unwrap_or_else(|| Environment::new(interner)),
            universe,
            functions: FxHashMap::default(),
            call_stack: CallStack::new(self.max_call_depth),
            names: InternedNames::new(interner),
            iota: None,
        }
    }
}
