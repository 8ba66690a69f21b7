//! anemo-sem - Name resolution and type checking for Anemo.
//!
//! Runs in two passes over the parsed program: top-level collection
//! (procedure table, duplicate detection, entry-point validation), then
//! per-procedure checking under a fresh lexical scope stack. Every
//! expression gets its inferred type written back onto the AST node, so
//! later stages never re-derive types.
//!
//! The analyzer is fail-fast: the first violation aborts with a
//! position-qualified diagnostic and the pipeline stops.

mod analysis;
mod scope;

pub use analysis::check_program;
