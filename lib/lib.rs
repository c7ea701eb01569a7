//! Varflow: lowering of C function ASTs into a def/use-annotated CFG IR.
//!
//! # An Introduction
//!
//! A C/C++ front-end (out of scope for this crate) parses a translation
//! unit and hands this crate one `ast::FunctionDecl` per top-level
//! function definition. `lowering::lower_function` walks that AST and
//! produces an `ir::Function`: an ordered list of `ir::Block`s forming a
//! control-flow graph, where every statement has been normalized into a
//! relational form that exposes which variables it defines, which it
//! uses, and whether it is a "direct use" of a single variable.
//!
//! ## Position and Semantics
//!
//! As in the IL this crate's lowering algorithm was modeled after, split
//! components into two groups:
//!
//! * Components which provide program semantics: `ir::VariableRef`,
//!   `ir::Expression`, `ir::Statement`, `ir::Block`, `ir::Function`.
//! * Components which provide location/text within the original source:
//!   every IR node's `text` field, and the `ast`/`source` boundary that
//!   produced it.
//!
//! ## Components
//!
//! * `ast` — the shape of the input AST this crate consumes, and the
//!   `SourceResolver` trait used to recover original source text for a
//!   range. Both stand in for the external C/C++ parser.
//! * `ir` — the in-memory IR: variables, expressions, statements, blocks,
//!   functions, and a `Program` container for more than one function.
//! * `lowering` — the expression analyzer and function lowerer that
//!   build an `ir::Function` from an `ast::FunctionDecl`.
//! * `output` — converts a completed `ir::Function` into the binary wire
//!   encoding consumed by downstream tools.
//! * `error` — the crate-wide `Result`/`Error` types.
//!
//! Unless you are implementing a new front-end adapter, you should only
//! need `ast`, `lowering::lower_function`, and `output::write_to_file`.

#[macro_use]
extern crate error_chain;
#[macro_use]
extern crate serde_derive;
#[macro_use]
extern crate log;

pub mod ast;
pub mod error;
pub mod ir;
pub mod lowering;
pub mod output;
pub mod source;

#[cfg(test)]
mod test_support;

pub use error::{Error, ErrorKind, Result, ResultExt};
