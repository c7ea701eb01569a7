//! Deterministic test doubles, shared across `#[cfg(test)]` modules.
//!
//! Real source-text retrieval belongs to the external parser (out of
//! scope for this crate); tests stand in with a resolver over a fixed
//! backing string, addressed by byte offset, so AST fixtures can be
//! built by hand without a real front-end.

use crate::source::{ResolvedText, SourceLocation, SourceRange};

pub struct StubResolver {
    pub src: &'static str,
}

impl StubResolver {
    pub fn new(src: &'static str) -> StubResolver {
        StubResolver { src }
    }

    /// Convenience for building fixtures: the byte range of `needle`'s
    /// first occurrence in `self.src`.
    pub fn range_of(&self, needle: &str) -> SourceRange {
        let begin = self
            .src
            .find(needle)
            .unwrap_or_else(|| panic!("`{}` not found in `{}`", needle, self.src));
        SourceRange::new(begin as u32, (begin + needle.len()) as u32)
    }
}

impl crate::source::SourceResolver for StubResolver {
    fn resolve(&self, range: SourceRange) -> ResolvedText {
        let text = self.src[range.begin as usize..range.end as usize].to_string();
        let loc = |offset: u32| SourceLocation {
            file: "test.c".to_string(),
            line: 1,
            column: offset + 1,
        };
        ResolvedText {
            text,
            begin: loc(range.begin),
            end: loc(range.end),
        }
    }
}
