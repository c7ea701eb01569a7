//! `Function`: a named parameter list plus the arena of blocks that make
//! up its control-flow graph. The function owns its blocks; block 0 is
//! always the entry.

use std::fmt;

use crate::error::{ErrorKind, Result};
use crate::ir::block::{Block, BlockId};
use crate::ir::statement::Statement;
use crate::ir::variable::VariableRef;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Function {
    func_id: String,
    parameters: Vec<VariableRef>,
    blocks: Vec<Block>,
}

impl Function {
    pub fn new(func_id: String, parameters: Vec<VariableRef>) -> Function {
        Function {
            func_id,
            parameters,
            blocks: Vec::new(),
        }
    }

    pub fn func_id(&self) -> &str {
        &self.func_id
    }

    pub fn parameters(&self) -> &[VariableRef] {
        &self.parameters
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn entry(&self) -> BlockId {
        BlockId(0)
    }

    pub fn block(&self, id: BlockId) -> &Block {
        &self.blocks[id.0]
    }

    pub(crate) fn block_mut(&mut self, id: BlockId) -> &mut Block {
        &mut self.blocks[id.0]
    }

    /// Append a new, empty block with the given raw (pre-normalization)
    /// label and return its id. Does not link it to anything; callers
    /// wire edges explicitly with `connect`.
    pub(crate) fn push_block(&mut self, label: impl Into<String>) -> BlockId {
        let id = BlockId(self.blocks.len());
        self.blocks.push(Block::new(id, label.into()));
        id
    }

    /// Append `statement` to `block`. Fatal if `block` is already
    /// terminated: no entries may follow a `Branch` or `Return`.
    pub(crate) fn push_statement(&mut self, block: BlockId, statement: Statement) -> Result<()> {
        if self.block(block).terminated() {
            bail!(ErrorKind::Fatal(format!(
                "attempted to append a statement to already-terminated block {}",
                self.block(block).label()
            )));
        }
        self.block_mut(block).push_statement(statement);
        Ok(())
    }

    /// Wire a non-owning successor/predecessor edge `from -> to`. Keeps
    /// P1 (edge consistency) true by construction: every caller that adds
    /// an edge goes through this one place.
    pub(crate) fn connect(&mut self, from: BlockId, to: BlockId) {
        self.block_mut(from).add_successor(to);
        self.block_mut(to).add_predecessor(from);
    }

    /// Rewrite every block's label to `bb:%<index>-<original>`, where
    /// `<index>` is the block's position in the block list. Run once,
    /// after lowering completes.
    pub fn normalize_labels(&mut self) {
        for (index, block) in self.blocks.iter_mut().enumerate() {
            let normalized = format!("bb:%{}-{}", index, block.label());
            block.set_label(normalized);
        }
    }

    /// Validate the testable properties of the data model (P1-P5) over a
    /// completed function. Intended for tests and defensive callers, not
    /// invoked automatically by lowering.
    pub fn validate(&self) -> Result<()> {
        for (index, block) in self.blocks.iter().enumerate() {
            if block.id().0 != index {
                bail!(ErrorKind::Fatal(format!(
                    "block at position {} has id {}",
                    index,
                    block.id()
                )));
            }
            for &succ in block.successors() {
                if !self.block(succ).predecessors().contains(&block.id()) {
                    bail!(ErrorKind::Fatal(format!(
                        "{} -> {} missing reverse predecessor edge",
                        block.id(),
                        succ
                    )));
                }
            }
            for &pred in block.predecessors() {
                if !self.block(pred).successors().contains(&block.id()) {
                    bail!(ErrorKind::Fatal(format!(
                        "{} -> {} missing reverse successor edge",
                        pred,
                        block.id()
                    )));
                }
            }
            for (pos, statement) in block.statements().iter().enumerate() {
                if statement.is_terminator() && pos + 1 != block.statements().len() {
                    bail!(ErrorKind::Fatal(format!(
                        "terminator is not the last statement in {}",
                        block.label()
                    )));
                }
            }
        }
        Ok(())
    }
}


impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "function {}", self.func_id)?;
        for block in &self.blocks {
            writeln!(f, "{}:", block.label())?;
            for statement in block.statements() {
                writeln!(f, "  {}", statement.text())?;
            }
            if !block.successors().is_empty() {
                let succs: Vec<String> = block.successors().iter().map(|s| s.to_string()).collect();
                writeln!(f, "  ; successors: {}", succs.join(", "))?;
            }
        }
        Ok(())
    }
}
