//! Flat storage for syntax nodes.

use crate::ast::{Expr, ExprId, ExprKind, Stmt, StmtId, StmtKind};
use crate::Span;

/// Owns every expression and statement of a parsed program.
///
/// The parser allocates nodes here; the evaluator reads them back by id.
/// Ids are only meaningful for the arena that produced them.
#[derive(Clone, Debug, Default)]
pub struct SyntaxArena {
    exprs: Vec<Expr>,
    stmts: Vec<Stmt>,
}

impl SyntaxArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an expression node.
    pub fn alloc_expr(&mut self, kind: ExprKind, span: Span) -> ExprId {
        let id = ExprId(to_u32(self.exprs.len()));
        self.exprs.push(Expr { kind, span });
        id
    }

    /// Allocate a statement node.
    pub fn alloc_stmt(&mut self, kind: StmtKind, span: Span) -> StmtId {
        let id = StmtId(to_u32(self.stmts.len()));
        self.stmts.push(Stmt { kind, span });
        id
    }

    /// Get an expression by id.
    ///
    /// # Panics
    /// Panics if `id` was not produced by this arena.
    #[inline]
    pub fn expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id.index()]
    }

    /// Get a statement by id.
    ///
    /// # Panics
    /// Panics if `id` was not produced by this arena.
    #[inline]
    pub fn stmt(&self, id: StmtId) -> &Stmt {
        &self.stmts[id.index()]
    }

    pub fn expr_count(&self) -> usize {
        self.exprs.len()
    }

    pub fn stmt_count(&self) -> usize {
        self.stmts.len()
    }
}

fn to_u32(len: usize) -> u32 {
    u32::try_from(len).unwrap_or_else(|_| panic!("syntax arena exceeded {} nodes", u32::MAX))
}
