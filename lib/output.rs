//! Converts a completed `ir::Function` into the binary wire encoding
//! consumed by downstream tools.
//!
//! Grounded on `pb_printer.cc`'s protobuf adapter: a parallel tree of
//! plain serializable records mirroring the IR, with one load-bearing
//! difference from the IR itself — `ir::Block` successor/predecessor
//! lists are `BlockId`s, but the wire format carries normalized label
//! strings, resolved here through the owning `Function`'s block list.
//! Encoded with `postcard` rather than protobuf: this crate has no
//! external consumer to keep wire-compatible with, and postcard gives
//! the same "derive `Serialize`, get a compact binary form" shape the
//! original got from codegen.

use std::fs::File;
use std::io::Write as _;
use std::path::Path;

use crate::error::Result;
use crate::ir::{Block, Expression, Function, Statement, VariableRef};

#[derive(Serialize, Deserialize)]
pub struct WireFunction {
    pub func_id: String,
    pub args: Vec<WireVarExpr>,
    pub blocks: Vec<WireBlock>,
}

#[derive(Serialize, Deserialize)]
pub struct WireBlock {
    pub block_name: String,
    pub is_terminate: bool,
    pub exprs: Vec<WireExpr>,
    pub successors: Vec<String>,
    pub predecessors: Vec<String>,
}

#[derive(Serialize, Deserialize)]
pub struct WireVarExpr {
    pub var_name: String,
}

#[derive(Serialize, Deserialize)]
pub struct WireImplicitReturnVarExpr {
    pub var_name: String,
    pub func_id: String,
}

#[derive(Serialize, Deserialize)]
pub struct WireBasicExpr {
    pub is_direct_use: bool,
    pub defs: Vec<WireExpr>,
    pub uses: Vec<WireExpr>,
}

#[derive(Serialize, Deserialize)]
pub struct WireCallStmt {
    pub func_id: String,
    pub args: Vec<WireExpr>,
}

#[derive(Serialize, Deserialize)]
pub struct WireAssignStmt {
    pub target: Box<WireExpr>,
    pub value: Box<WireExpr>,
}

#[derive(Serialize, Deserialize)]
pub struct WireBranchStmt {
    pub successors: Vec<String>,
}

#[derive(Serialize, Deserialize)]
pub struct WireReturnStmt {
    pub ret_val: Box<WireExpr>,
}

#[derive(Serialize, Deserialize)]
pub enum WireExprKind {
    VarExpr(WireVarExpr),
    ImplicitReturnVarExpr(WireImplicitReturnVarExpr),
    BasicExpr(WireBasicExpr),
    CallStmt(WireCallStmt),
    AssignStmt(WireAssignStmt),
    BranchStmt(WireBranchStmt),
    ReturnStmt(WireReturnStmt),
}

/// One node in the wire tree: a tagged payload plus the source text
/// every IR node carries, attached uniformly at this level rather than
/// duplicated inside each `WireExprKind` variant.
#[derive(Serialize, Deserialize)]
pub struct WireExpr {
    pub kind: WireExprKind,
    pub src_text: String,
}

fn convert_variable(var: &VariableRef) -> WireExpr {
    let kind = match &var.callee {
        Some(callee) => WireExprKind::ImplicitReturnVarExpr(WireImplicitReturnVarExpr {
            var_name: var.name.clone(),
            func_id: callee.clone(),
        }),
        None => WireExprKind::VarExpr(WireVarExpr {
            var_name: var.name.clone(),
        }),
    };
    WireExpr {
        kind,
        src_text: var.text.clone(),
    }
}

fn convert_expression(expr: &Expression) -> WireExpr {
    let src_text = expr.text().to_string();
    let kind = match expr {
        Expression::Variable(var) => return convert_variable(var),
        Expression::Basic(basic) => WireExprKind::BasicExpr(WireBasicExpr {
            is_direct_use: basic.is_direct_use(),
            defs: basic.defines().iter().map(convert_variable).collect(),
            uses: basic.uses().iter().map(convert_variable).collect(),
        }),
        Expression::Call(call) => WireExprKind::CallStmt(WireCallStmt {
            func_id: call.callee_id().to_string(),
            args: call.args().iter().map(convert_expression).collect(),
        }),
    };
    WireExpr { kind, src_text }
}

/// An assignment is the single most basic statement kind, so its target
/// and value get a dedicated wire case (`WireAssignStmt`) like every
/// other statement kind, rather than serializing with no payload beyond
/// its source text.
fn convert_statement(stmt: &Statement) -> WireExpr {
    match stmt {
        Statement::Assignment(assign) => WireExpr {
            kind: WireExprKind::AssignStmt(WireAssignStmt {
                target: Box::new(convert_variable(assign.target())),
                value: Box::new(convert_expression(assign.value())),
            }),
            src_text: assign.text().to_string(),
        },
        Statement::Branch(branch) => WireExpr {
            kind: WireExprKind::BranchStmt(WireBranchStmt {
                successors: branch.successors().iter().map(|id| id.to_string()).collect(),
            }),
            src_text: branch.text().to_string(),
        },
        Statement::Return(ret) => WireExpr {
            kind: WireExprKind::ReturnStmt(WireReturnStmt {
                ret_val: Box::new(convert_expression(ret.value())),
            }),
            src_text: ret.text().to_string(),
        },
        Statement::Expression(expr) => convert_expression(expr),
    }
}

/// A block's `Branch::successors()` carries raw `BlockId`s; the wire
/// format resolves them to the owning function's normalized labels, same
/// as `Statement::Branch`'s `WireBranchStmt::successors` above, but for
/// the block-level successor/predecessor edges.
fn convert_block(function: &Function, block: &Block) -> WireBlock {
    WireBlock {
        block_name: block.label().to_string(),
        is_terminate: block.terminated(),
        exprs: block.statements().iter().map(convert_statement).collect(),
        successors: block
            .successors()
            .iter()
            .map(|&id| function.block(id).label().to_string())
            .collect(),
        predecessors: block
            .predecessors()
            .iter()
            .map(|&id| function.block(id).label().to_string())
            .collect(),
    }
}

pub fn to_wire(function: &Function) -> WireFunction {
    let args = function
        .parameters()
        .iter()
        .map(convert_variable)
        .map(|w| match w.kind {
            WireExprKind::VarExpr(v) => v,
            _ => unreachable!("a function parameter is never an implicit return"),
        })
        .collect();
    let blocks = function.blocks().iter().map(|b| convert_block(function, b)).collect();
    WireFunction {
        func_id: function.func_id().to_string(),
        args,
        blocks,
    }
}

/// Serialize `function` to `path` as a `postcard`-encoded `WireFunction`.
pub fn write_to_file(path: impl AsRef<Path>, function: &Function) -> Result<()> {
    let wire = to_wire(function);
    let bytes = postcard::to_allocvec(&wire)?;
    let mut file = File::create(path)?;
    file.write_all(&bytes)?;
    Ok(())
}
