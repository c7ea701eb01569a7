//! Basic blocks, addressed by arena index: a vector of owned blocks
//! indexed by handle, rather than a pointer graph, so predecessor/successor
//! links are plain indices instead of a cyclic pointer structure.

use std::fmt;

use crate::ir::statement::Statement;

/// An index into a `Function`'s block list. Successor/predecessor lists
/// are `BlockId`s: non-owning back-references, the function's block list
/// is the single source of truth for liveness.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct BlockId(pub usize);

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "bb{}", self.0)
    }
}

/// A basic block: a maximal straight-line sequence of statements, ending
/// (or not, if dead) in a single terminator.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Block {
    id: BlockId,
    label: String,
    statements: Vec<Statement>,
    successors: Vec<BlockId>,
    predecessors: Vec<BlockId>,
}

impl Block {
    pub(crate) fn new(id: BlockId, label: String) -> Block {
        Block {
            id,
            label,
            statements: Vec::new(),
            successors: Vec::new(),
            predecessors: Vec::new(),
        }
    }

    pub fn id(&self) -> BlockId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub(crate) fn set_label(&mut self, label: String) {
        self.label = label;
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    pub fn successors(&self) -> &[BlockId] {
        &self.successors
    }

    pub fn predecessors(&self) -> &[BlockId] {
        &self.predecessors
    }

    /// Invariant: if the block is terminated, the last entry is a
    /// `Branch` or `Return`, and no further entries may be appended.
    pub fn terminated(&self) -> bool {
        self.statements
            .last()
            .map(Statement::is_terminator)
            .unwrap_or(false)
    }

    pub(crate) fn push_statement(&mut self, statement: Statement) {
        self.statements.push(statement);
    }

    pub(crate) fn add_successor(&mut self, to: BlockId) {
        self.successors.push(to);
    }

    pub(crate) fn add_predecessor(&mut self, from: BlockId) {
        self.predecessors.push(from);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Expression, Return, VariableRef};

    #[test]
    fn empty_block_is_not_terminated() {
        let block = Block::new(BlockId(0), "entry".to_string());
        assert!(!block.terminated());
    }

    #[test]
    fn block_with_trailing_return_is_terminated() {
        let mut block = Block::new(BlockId(0), "entry".to_string());
        block.push_statement(Statement::Return(Return::new(
            Expression::Variable(VariableRef::new("a", "a")),
            "return a".to_string(),
        )));
        assert!(block.terminated());
    }
}
