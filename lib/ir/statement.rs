//! Statement variants: assignment, the two terminators (branch, return),
//! and bare expression statements. All carry `text`.

use crate::ir::block::BlockId;
use crate::ir::expression::Expression;
use crate::ir::variable::VariableRef;

/// `x = e`: a variable target and an expression source. When the LHS is a
/// complex l-value, callers fold its def/use into the RHS's `BasicExpr`
/// instead of producing an `Assignment` (see `lowering::expression`).
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    target: VariableRef,
    value: Expression,
    text: String,
}

impl Assignment {
    pub fn new(target: VariableRef, value: Expression, text: String) -> Assignment {
        Assignment {
            target,
            value,
            text,
        }
    }

    pub fn target(&self) -> &VariableRef {
        &self.target
    }

    pub fn value(&self) -> &Expression {
        &self.value
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// An unconditional or conditional transfer of control. Two successors
/// for a conditional branch, one for an unconditional branch.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    successors: Vec<BlockId>,
    text: String,
}

impl Branch {
    pub fn new(successors: Vec<BlockId>, text: String) -> Branch {
        Branch { successors, text }
    }

    pub fn successors(&self) -> &[BlockId] {
        &self.successors
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// A function return, carrying the return value's expression.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Return {
    value: Expression,
    text: String,
}

impl Return {
    pub fn new(value: Expression, text: String) -> Return {
        Return { value, text }
    }

    pub fn value(&self) -> &Expression {
        &self.value
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// A single entry in a block's statement list.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Statement {
    Assignment(Assignment),
    Branch(Branch),
    Return(Return),
    /// A bare expression whose side effects (if any) are recorded via its
    /// def/use sets, and every intermediate call expression spliced in
    /// ahead of the statement that consumes its implicit return.
    Expression(Expression),
}

impl Statement {
    pub fn is_terminator(&self) -> bool {
        matches!(self, Statement::Branch(_) | Statement::Return(_))
    }

    pub fn text(&self) -> &str {
        match self {
            Statement::Assignment(a) => a.text(),
            Statement::Branch(b) => b.text(),
            Statement::Return(r) => r.text(),
            Statement::Expression(e) => e.text(),
        }
    }
}
