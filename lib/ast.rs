//! The shape of the AST this crate consumes.
//!
//! This stands in for the external C/C++ parser's node hierarchy (out of
//! scope for this crate). It models exactly the node classes the lowering
//! algorithm in `lowering` dispatches on: the statement classes of
//! `lowering::lower_stmt` and the expression classes of
//! `lowering::expression`. A real front-end adapter is responsible for
//! building these values and handing out `SourceRange`s a `SourceResolver`
//! can resolve.

use crate::source::SourceRange;

/// A top-level function definition.
#[derive(Serialize, Deserialize)]
pub struct FunctionDecl {
    pub name: String,
    pub params: Vec<ParamDecl>,
    pub body: Stmt,
}

/// A function parameter: a declared name and the range of its declarator.
#[derive(Serialize, Deserialize)]
pub struct ParamDecl {
    pub name: String,
    pub range: SourceRange,
}

/// A single declared variable within a `Stmt::Decl`.
#[derive(Serialize, Deserialize)]
pub struct VarDecl {
    pub name: String,
    pub range: SourceRange,
    pub init: Option<Expr>,
}

/// Binary operator classes, distinguished by assignment semantics.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum BinOp {
    /// Plain `=`.
    Assign,
    /// `+=`, `-=`, ... (read-modify-write).
    Compound,
    /// `+`, `-`, `==`, `&&`, ...
    Plain,
}

/// Unary operator classes.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum UnOp {
    /// `++x`, `x++`, `--x`, `x--`.
    IncDec,
    /// `-x`, `!x`, `~x`, `&x`, `*x`, ...
    Plain,
}

/// Literal classes. Carried only so `is_direct_use` and the def/use
/// analyzer can recognize them; their value is not otherwise interpreted.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Literal {
    Int,
    Float,
    Str,
    Char,
}

/// An expression node. Variants correspond directly to the rows of the
/// RHS-parse table in the lowering algorithm.
#[derive(Serialize, Deserialize)]
pub enum Expr {
    /// A reference to a declared identifier.
    Variable { name: String, range: SourceRange },
    /// A parse-error placeholder; its own snippet serves as its name.
    Recovery { range: SourceRange },
    /// `a[i]`.
    ArraySubscript {
        base: Box<Expr>,
        index: Box<Expr>,
        range: SourceRange,
    },
    /// Any binary operator, `lhs op rhs`.
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
        range: SourceRange,
    },
    /// Any unary operator over a single operand.
    Unary {
        op: UnOp,
        operand: Box<Expr>,
        range: SourceRange,
    },
    /// `callee(args...)`.
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
        range: SourceRange,
    },
    Literal { literal: Literal, range: SourceRange },
    /// Parentheses, stripped before analysis; kept here only so the AST
    /// shape matches what a real front-end hands over.
    Paren(Box<Expr>),
    /// An implicit conversion inserted by the front-end, stripped before
    /// analysis.
    ImplicitCast(Box<Expr>),
    /// Any node shape not covered above (e.g. the ternary or comma
    /// operator): def/use analysis recurses into its children and unions
    /// the results, per the lowering algorithm's fallback case.
    Other { children: Vec<Expr>, range: SourceRange },
}

impl Expr {
    pub fn range(&self) -> SourceRange {
        match self {
            Expr::Variable { range, .. }
            | Expr::Recovery { range }
            | Expr::ArraySubscript { range, .. }
            | Expr::Binary { range, .. }
            | Expr::Unary { range, .. }
            | Expr::Call { range, .. }
            | Expr::Literal { range, .. }
            | Expr::Other { range, .. } => *range,
            Expr::Paren(inner) | Expr::ImplicitCast(inner) => inner.range(),
        }
    }

    /// Strip parentheses and implicit conversions, as every LHS/RHS-parse
    /// entry point does before inspecting a node's shape.
    pub fn strip(&self) -> &Expr {
        match self {
            Expr::Paren(inner) | Expr::ImplicitCast(inner) => inner.strip(),
            other => other,
        }
    }
}

/// A statement node. Variants correspond to the per-class dispatch of
/// `lowering::FunctionLowerer::lower_stmt`.
#[derive(Serialize, Deserialize)]
pub enum Stmt {
    Compound(Vec<Stmt>),
    Decl(Vec<VarDecl>),
    Expr(Expr),
    Return { value: Option<Expr>, range: SourceRange },
    If {
        cond: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    While { cond: Expr, body: Box<Stmt> },
    DoWhile { body: Box<Stmt>, cond: Expr },
    For {
        init: Option<Box<Stmt>>,
        cond: Expr,
        inc: Option<Box<Stmt>>,
        body: Box<Stmt>,
    },
    Break,
    Continue,
    Label { name: String, body: Box<Stmt> },
    Goto { label: String },
    /// Acknowledged as unimplemented; see `lowering`'s handling.
    Switch { cond: Expr, body: Box<Stmt> },
}
