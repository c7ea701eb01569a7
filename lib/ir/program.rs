//! `Program`: holds every lowered function of a translation unit.

use crate::ir::function::Function;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Program {
    functions: Vec<Function>,
}

impl Program {
    pub fn new() -> Program {
        Program {
            functions: Vec::new(),
        }
    }

    pub fn push(&mut self, function: Function) {
        self.functions.push(function);
    }

    pub fn functions(&self) -> &[Function] {
        &self.functions
    }

    pub fn function(&self, func_id: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.func_id() == func_id)
    }
}
