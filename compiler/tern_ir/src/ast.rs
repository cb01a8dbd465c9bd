//! Syntax node kinds produced by the parser and consumed by the evaluator.
//!
//! Nodes never own their children: they refer to them through [`ExprId`] and
//! [`StmtId`] handles into a [`SyntaxArena`](crate::SyntaxArena).

use std::fmt;

use crate::{Name, Span};

/// Handle to an expression node in a `SyntaxArena`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ExprId(pub(crate) u32);

/// Handle to a statement node in a `SyntaxArena`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct StmtId(pub(crate) u32);

impl ExprId {
    /// Raw index into the arena.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl StmtId {
    /// Raw index into the arena.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Binary operators.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
}

impl BinaryOp {
    /// Source spelling of the operator.
    pub const fn as_symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_symbol())
    }
}

/// Unary operators.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Neg,
    Not,
}

/// Token of a branch statement.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BranchKind {
    Break,
    Continue,
    Goto,
    Fallthrough,
}

impl BranchKind {
    pub const fn keyword(self) -> &'static str {
        match self {
            BranchKind::Break => "break",
            BranchKind::Continue => "continue",
            BranchKind::Goto => "goto",
            BranchKind::Fallthrough => "fallthrough",
        }
    }
}

/// An expression node.
#[derive(Clone, Debug, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

/// Expression variants.
#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    Int(i64),
    /// Float literal, stored as bits so the node stays `Eq`-friendly.
    Float(u64),
    Str(Name),
    /// Identifier reference. Reserved identifiers (`true`, `false`, `iota`)
    /// are ordinary identifiers at this level.
    Ident(Name),
    Binary {
        op: BinaryOp,
        left: ExprId,
        right: ExprId,
    },
    Unary {
        op: UnaryOp,
        operand: ExprId,
    },
    Call {
        func: ExprId,
        args: Vec<ExprId>,
    },
    /// `func(params) { body }`
    FuncLit {
        params: Vec<Name>,
        body: StmtId,
    },
    /// `base.name`, a field or a method.
    Selector {
        base: ExprId,
        name: Name,
    },
    /// `T{f0, f1, ...}` with positional fields.
    CompositeLit {
        type_name: Name,
        fields: Vec<ExprId>,
    },
}

/// A statement node.
#[derive(Clone, Debug, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

/// Statement variants.
#[derive(Clone, Debug, PartialEq)]
pub enum StmtKind {
    Empty,
    Expr(ExprId),
    /// `a, b := x, y`
    Define {
        names: Vec<Name>,
        values: Vec<ExprId>,
    },
    /// `a, b = x, y`, or `a op= x` when `op` is set.
    Assign {
        targets: Vec<Name>,
        op: Option<BinaryOp>,
        values: Vec<ExprId>,
    },
    /// `x++` / `x--`
    IncDec {
        target: Name,
        increment: bool,
    },
    Block(Vec<StmtId>),
    If {
        init: Option<StmtId>,
        cond: ExprId,
        body: StmtId,
        else_branch: Option<StmtId>,
    },
    For {
        init: Option<StmtId>,
        cond: Option<ExprId>,
        post: Option<StmtId>,
        body: StmtId,
    },
    Branch {
        kind: BranchKind,
        label: Option<Name>,
    },
    Return(Vec<ExprId>),
    Labeled {
        label: Name,
        stmt: StmtId,
    },
    Switch {
        init: Option<StmtId>,
        tag: Option<ExprId>,
        clauses: Vec<CaseClause>,
    },
    /// `const ( ... )` block.
    ConstDecl(Vec<ConstSpec>),
}

/// One `case` (or `default`) arm of a switch.
#[derive(Clone, Debug, PartialEq)]
pub struct CaseClause {
    /// `None` for the `default` clause.
    pub values: Option<Vec<ExprId>>,
    pub body: Vec<StmtId>,
}

/// One line of a constant block: `names = values`.
///
/// Empty `values` repeats the previous spec's expressions.
#[derive(Clone, Debug, PartialEq)]
pub struct ConstSpec {
    pub names: Vec<Name>,
    pub values: Vec<ExprId>,
}
