//! Abstraction over the external parser's source-text retrieval.
//!
//! The core lowering algorithm never touches a file or a `SourceManager`
//! directly. Every AST node in `ast` carries a `SourceRange`, an opaque
//! handle into whatever the front-end used to track positions, and the
//! lowering code asks a `SourceResolver` to turn that handle into text.
//! Tests substitute a stub resolver with deterministic output, decoupling
//! the core from any real C/C++ parser.

use std::fmt;

/// A location within a source file, as reported by the front-end.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// An opaque range in the source, as produced by the front-end for some
/// AST node. This crate never interprets the range itself; it is only
/// ever handed back to a `SourceResolver`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct SourceRange {
    pub begin: u32,
    pub end: u32,
}

impl SourceRange {
    pub fn new(begin: u32, end: u32) -> SourceRange {
        SourceRange { begin, end }
    }
}

/// The result of resolving a `SourceRange`: the original text, plus the
/// begin/end file locations it came from.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ResolvedText {
    pub text: String,
    pub begin: SourceLocation,
    pub end: SourceLocation,
}

impl ResolvedText {
    pub fn into_text(self) -> String {
        self.text
    }
}

/// Given a source range from the AST, returns the original textual
/// snippet with its begin/end file locations.
///
/// Implemented by the front-end adapter (out of scope for this crate) in
/// production, and by a deterministic stub in tests.
pub trait SourceResolver {
    fn resolve(&self, range: SourceRange) -> ResolvedText;
}
