//! Crate-wide error type.
//!
//! Lowering distinguishes benign parser artifacts (handled in place, never
//! surfaced as an `Error`) from fatal invariant violations (an internal bug
//! in the lowering algorithm, or malformed input that the algorithm cannot
//! make sense of) and I/O failures on the output sink. Only the latter two
//! reach this type.

error_chain! {
    foreign_links {
        Io(::std::io::Error);
        Postcard(::postcard::Error);
    }

    errors {
        /// A lowering invariant was violated: an empty break/continue
        /// stack at a `break`/`continue` statement, an attempt to append
        /// a statement to an already-terminated block, or a `goto`/label
        /// that could not be resolved to a block.
        Fatal(msg: String) {
            description("lowering invariant violated")
            display("lowering invariant violated: {}", msg)
        }
    }
}
