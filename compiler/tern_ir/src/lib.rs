//! Tern IR - names, spans and syntax nodes shared by the Tern crates.
//!
//! The parser produces a [`SyntaxArena`]; the evaluator walks it. Identifiers
//! are interned once into [`Name`]s so scope lookups compare `u32`s.

mod arena;
pub mod ast;
mod interner;
mod name;
mod span;

pub use arena::SyntaxArena;
pub use ast::{
    BinaryOp, BranchKind, CaseClause, ConstSpec, Expr, ExprId, ExprKind, Stmt, StmtId, StmtKind,
    UnaryOp,
};
pub use interner::{InternError, SharedInterner, StringInterner};
pub use name::Name;
pub use span::Span;
